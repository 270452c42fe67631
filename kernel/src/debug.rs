// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2024.

//! Kernel diagnostic output.
//!
//! `debug!` formats into whichever sink the platform registered at boot.
//! With no sink registered the macro is a no-op, so early code and unit
//! tests can run without a console. The sink is called from interrupt
//! context with interrupts disabled and must not block.

use core::fmt::Arguments;
use core::ptr;

/// A diagnostic sink.
pub trait DebugWriter: Sync {
    fn write(&self, args: Arguments);
}

static mut DEBUG_WRITER: Option<&'static dyn DebugWriter> = None;

/// Register the diagnostic sink.
///
/// # Safety
///
/// Must be called before secondary processors start and before interrupts
/// are enabled, since the sink cell is written without synchronization.
pub unsafe fn set_debug_writer(writer: &'static dyn DebugWriter) {
    unsafe {
        DEBUG_WRITER = Some(writer);
    }
}

#[doc(hidden)]
pub fn begin_debug_fmt(args: Arguments) {
    let writer = unsafe { *ptr::addr_of!(DEBUG_WRITER) };
    if let Some(writer) = writer {
        writer.write(args);
    }
}

/// In-kernel `println` for diagnostics.
#[macro_export]
macro_rules! debug {
    () => ({
        $crate::debug!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::begin_debug_fmt(::core::format_args!($msg))
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::begin_debug_fmt(::core::format_args!($fmt, $($arg)+))
    });
}
