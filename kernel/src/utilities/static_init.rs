// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2024.

//! Support for statically initializing objects in memory.
//!
//! Platform startup code builds the processor blocks, handler chains, and
//! interrupt tables as `'static` objects before secondary processors come
//! up; `static_init!` is the allocation-free way to do that.

/// Allocates a statically-sized global region of memory, initializes it
/// with the given expression, and returns a `&'static mut` reference to it.
///
/// # Safety
///
/// The expansion writes to a global region without any locking, so the
/// caller must ensure each use runs at most once. Running one twice would
/// overwrite the first value without dropping it, while its `&'static mut`
/// may still be live.
#[macro_export]
macro_rules! static_init {
    ($T:ty, $e:expr $(,)?) => {{
        static mut BUF: ::core::mem::MaybeUninit<$T> = ::core::mem::MaybeUninit::uninit();
        let buf = &mut *::core::ptr::addr_of_mut!(BUF);
        buf.write($e)
    }};
}

#[cfg(test)]
mod test {
    #[test]
    fn test_static_init_returns_static_reference() {
        let value: &'static mut u32 = unsafe { static_init!(u32, 40) };
        *value += 2;
        assert_eq!(*value, 42);
    }
}
