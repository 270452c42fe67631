// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2024.

//! Per-processor dispatch state.
//!
//! One [`ProcessorBlock`] exists per processor, pinned to it for the life
//! of the system. The block is plain interior-mutable state rather than a
//! locked singleton: only the owning processor mutates it, and it does so
//! with interrupts disabled. Remote readers of `run_level` tolerate
//! staleness.

use core::cell::Cell;

use crate::utilities::cells::OptionalCell;

use crate::controller::Controller;
use crate::handler::InterruptTable;
use crate::pending::PendingQueue;
use crate::platform::SignalTarget;
use crate::runlevel::RunLevel;

pub struct ProcessorBlock<'a> {
    number: usize,
    run_level: Cell<RunLevel>,
    pending_interrupts: PendingQueue<'a>,
    pending_dispatch_interrupt: Cell<bool>,
    interrupt_table: &'a InterruptTable<'a>,
    controller: Controller<'a>,
    running_thread: OptionalCell<&'a dyn SignalTarget>,
}

impl<'a> ProcessorBlock<'a> {
    /// Create the block for processor `number`, wired to the interrupt
    /// controller that delivers to that processor.
    pub fn new(
        number: usize,
        interrupt_table: &'a InterruptTable<'a>,
        controller: Controller<'a>,
    ) -> ProcessorBlock<'a> {
        ProcessorBlock {
            number,
            run_level: Cell::new(RunLevel::Low),
            pending_interrupts: PendingQueue::new(),
            pending_dispatch_interrupt: Cell::new(false),
            interrupt_table,
            controller,
            running_thread: OptionalCell::empty(),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    /// The processor's current nominal run level. Lock-free; a remote
    /// reader may observe a stale value.
    pub fn run_level(&self) -> RunLevel {
        self.run_level.get()
    }

    /// Number of masked arrivals waiting to be replayed.
    pub fn pending_interrupt_count(&self) -> usize {
        self.pending_interrupts.len()
    }

    /// Whether a dispatch-level software pass has been requested and not
    /// yet serviced.
    pub fn dispatch_interrupt_pending(&self) -> bool {
        self.pending_dispatch_interrupt.get()
    }

    /// Request a dispatch-level software pass on this processor. Producers
    /// must be local to this processor; the flag is cleared only by the
    /// dispatcher when it services the request.
    pub fn request_software_dispatch(&self) {
        self.pending_dispatch_interrupt.set(true);
    }

    /// Publish the thread now running on this processor, for signal
    /// delivery on the way back to user mode.
    pub fn set_running_thread(&self, thread: &'a dyn SignalTarget) {
        self.running_thread.set(thread);
    }

    pub(crate) fn set_run_level(&self, level: RunLevel) {
        self.run_level.set(level);
    }

    pub(crate) fn pending_interrupts(&self) -> &PendingQueue<'a> {
        &self.pending_interrupts
    }

    pub(crate) fn clear_dispatch_interrupt(&self) {
        self.pending_dispatch_interrupt.set(false);
    }

    pub(crate) fn interrupt_table(&self) -> &'a InterruptTable<'a> {
        self.interrupt_table
    }

    pub(crate) fn controller(&self) -> Controller<'a> {
        self.controller
    }

    pub(crate) fn running_thread(&self) -> Option<&'a dyn SignalTarget> {
        self.running_thread.get()
    }
}
