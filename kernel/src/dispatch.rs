// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2024.

//! Interrupt entry and exit, and run-level management.
//!
//! [`RunLevelManager`] owns every transition of the per-processor run
//! level. A hardware trap enters through [`dispatch_interrupt`]; critical
//! sections raise and lower around their work; lowering is where all
//! deferred activity drains, in priority order: masked hardware interrupts
//! first, then the dispatch-level software pass, then the final drop to
//! the caller's target level.
//!
//! The manager is reentrant on a single processor. A strictly higher
//! priority interrupt may preempt the walker or a replay whenever
//! interrupts are enabled, entering `dispatch_interrupt` again on the same
//! processor; recursion depth is bounded by the number of run levels above
//! the preempted one. All scratch state lives on the stack or in the
//! processor block.
//!
//! [`dispatch_interrupt`]: RunLevelManager::dispatch_interrupt

use crate::config::CONFIG;
use crate::controller::InterruptCause;
use crate::handler::{InterruptStatus, TriggerMode, STORM_COUNT_MASK, STORM_DELTA_SECONDS};
use crate::pending::PendingInterrupt;
use crate::platform::{Cpu, SoftwareDispatch, Timebase, TrapFrame};
use crate::processor::ProcessorBlock;
use crate::runlevel::{RunLevel, VectorMap};

pub struct RunLevelManager<'a, C: Cpu, T: Timebase> {
    cpu: &'a C,
    timebase: &'a T,
    processors: &'a [ProcessorBlock<'a>],
    vector_map: VectorMap,
    software_dispatch: &'a dyn SoftwareDispatch,
}

impl<'a, C: Cpu, T: Timebase> RunLevelManager<'a, C, T> {
    pub fn new(
        cpu: &'a C,
        timebase: &'a T,
        processors: &'a [ProcessorBlock<'a>],
        vector_map: VectorMap,
        software_dispatch: &'a dyn SoftwareDispatch,
    ) -> RunLevelManager<'a, C, T> {
        RunLevelManager {
            cpu,
            timebase,
            processors,
            vector_map,
            software_dispatch,
        }
    }

    /// The executing processor's block. Valid until the next point at
    /// which the scheduler could migrate this thread, which is why the
    /// software-dispatch flush below re-resolves it.
    fn current_processor(&self) -> &'a ProcessorBlock<'a> {
        &self.processors[self.cpu.current_index()]
    }

    /// The executing processor's current run level. Lock-free.
    pub fn get_run_level(&self) -> RunLevel {
        self.current_processor().run_level()
    }

    /// Request a dispatch-level software pass on the executing processor.
    pub fn request_software_dispatch(&self) {
        let enabled = self.cpu.disable_interrupts();
        self.current_processor().request_software_dispatch();
        if enabled {
            unsafe { self.cpu.enable_interrupts() };
        }
    }

    /// Determine the source of a hardware interrupt and run its service
    /// routines, or defer it if the processor is already at or above its
    /// level. Must be called with interrupts disabled and returns with
    /// interrupts disabled.
    pub fn dispatch_interrupt(&self, vector: u32, trap_frame: &dyn TrapFrame) {
        debug_assert!(!self.cpu.interrupts_enabled());

        let processor = self.current_processor();
        let thread = processor.running_thread();
        let controller = processor.controller();

        let mut vector = vector;
        let magic_candy = match controller.acknowledge(&mut vector) {
            InterruptCause::LineFired(magic_candy) => magic_candy,
            InterruptCause::SpuriousInterrupt | InterruptCause::NoLine => return,
        };

        let interrupt_run_level = self.vector_map.run_level(vector);
        let old_run_level = processor.run_level();

        // The controller should not have delivered this line while the
        // processor was at or above its level. Park it for replay; the
        // end-of-interrupt is owed only once it actually runs.
        if old_run_level >= interrupt_run_level {
            processor.pending_interrupts().push(PendingInterrupt {
                vector,
                run_level: interrupt_run_level,
                magic_candy,
                controller,
            });
            return;
        }

        if CONFIG.trace_dispatch {
            crate::debug!(
                "dispatch: vector {:#x} {:?} -> {:?} on {}",
                vector,
                old_run_level,
                interrupt_run_level,
                processor.number()
            );
        }

        processor.set_run_level(interrupt_run_level);

        // With hardware priority enforcement in place, strictly higher
        // vectors may preempt from here on. Without it, everything stays
        // masked at the core until the end-of-interrupt below.
        if controller.enforces_priority() {
            unsafe { self.cpu.enable_interrupts() };
        }

        self.run_isr(Some(trap_frame), processor, vector);

        self.cpu.disable_interrupts();
        controller.complete(magic_candy);

        self.lower_run_level_internal(old_run_level, Some(trap_frame));

        // Pending signals are the user-mode equivalent of an interrupt.
        if old_run_level == RunLevel::Low && !trap_frame.from_privileged_mode() {
            if let Some(thread) = thread {
                unsafe { self.cpu.enable_interrupts() };
                thread.dispatch_pending_signals(trap_frame);
                self.cpu.disable_interrupts();
            }
        }
    }

    /// Raise the executing processor's run level. `new` must be greater
    /// than or equal to the current level. Returns the previous level.
    pub fn raise_run_level(&self, new: RunLevel) -> RunLevel {
        let enabled = self.cpu.disable_interrupts();
        let processor = self.current_processor();
        let old = processor.run_level();

        debug_assert!(new >= old);

        if old < new {
            processor.set_run_level(new);
        }
        if enabled {
            unsafe { self.cpu.enable_interrupts() };
        }
        old
    }

    /// Lower the executing processor's run level, replaying any deferred
    /// interrupts and software-dispatch work that the old level masked.
    /// `new` must be less than or equal to the current level.
    pub fn lower_run_level(&self, new: RunLevel) {
        self.lower_run_level_internal(new, None);
    }

    fn lower_run_level_internal(&self, new: RunLevel, trap_frame: Option<&dyn TrapFrame>) {
        // Disabling interrupts both keeps the pending queue consistent and
        // pins this thread to the processor while lowering from below
        // dispatch level.
        let enabled = self.cpu.disable_interrupts();
        let mut processor = self.current_processor();

        debug_assert!(new <= processor.run_level());

        if processor.run_level() <= new {
            if enabled {
                unsafe { self.cpu.enable_interrupts() };
            }
            return;
        }

        // Replay everything the new level no longer masks, highest
        // priority first.
        while let Some(entry) = processor.pending_interrupts().peek() {
            if entry.run_level <= new {
                break;
            }
            processor.pending_interrupts().pop();
            processor.set_run_level(entry.run_level);
            self.replay_interrupt(processor, entry);
        }

        // Flush dispatch-level software work when dropping below dispatch.
        // The scheduler lowers with interrupts disabled from exactly
        // dispatch level to suppress this; honoring that here is what
        // keeps the scheduler from re-entering itself. Coming down from a
        // real interrupt level still flushes.
        if processor.dispatch_interrupt_pending()
            && new < RunLevel::Dispatch
            && (processor.run_level() > RunLevel::Dispatch || enabled)
        {
            processor.set_run_level(RunLevel::Dispatch);
            while processor.dispatch_interrupt_pending() {
                processor.clear_dispatch_interrupt();
                unsafe { self.cpu.enable_interrupts() };
                self.software_dispatch.dispatch(RunLevel::Dispatch, trap_frame);
                self.cpu.disable_interrupts();
            }

            // The software pass may have invoked the scheduler and moved
            // this thread to another processor. Re-resolve the block so
            // the final write lands on the right one.
            processor = self.current_processor();
        }

        processor.set_run_level(new);

        if enabled {
            unsafe { self.cpu.enable_interrupts() };
        }
    }

    /// Replay a previously deferred interrupt. The caller has already set
    /// the run level to the vector's level; this runs the service routines
    /// and issues the end-of-interrupt, leaving the run level for the
    /// caller to restore.
    fn replay_interrupt(&self, processor: &'a ProcessorBlock<'a>, entry: PendingInterrupt<'a>) {
        debug_assert!(!self.cpu.interrupts_enabled());
        debug_assert_eq!(processor.run_level(), entry.run_level);

        if CONFIG.trace_replay {
            crate::debug!(
                "replay: vector {:#x} at {:?} on {}",
                entry.vector,
                entry.run_level,
                processor.number()
            );
        }

        if entry.controller.enforces_priority() {
            unsafe { self.cpu.enable_interrupts() };
        }

        self.run_isr(None, processor, entry.vector);

        self.cpu.disable_interrupts();
        entry.controller.complete(entry.magic_candy);
    }

    /// Walk the handler chain for `vector`, in registration order.
    fn run_isr(
        &self,
        trap_frame: Option<&dyn TrapFrame>,
        processor: &'a ProcessorBlock<'a>,
        vector: u32,
    ) {
        let table = processor.interrupt_table();

        debug_assert!(vector >= table.first_vector());

        let mut serviced_any = false;
        for handler in table.chain(vector) {
            serviced_any = true;

            debug_assert_eq!(handler.run_level(), self.vector_map.run_level(vector));
            debug_assert_eq!(handler.run_level(), processor.run_level());

            // Every so often, check the rate this handler is firing at.
            // The count and timestamp are racy against other processors
            // sharing the handler; a lost sample costs a diagnostic, not
            // correctness.
            let count = handler.count_invocation();
            if (count & STORM_COUNT_MASK) == 0 && handler.run_level() <= RunLevel::Clock {
                let last_timestamp = handler.last_timestamp();
                let time_counter = self.timebase.recent_ticks();
                let seconds =
                    time_counter.wrapping_sub(last_timestamp) / self.timebase.frequency();
                if last_timestamp != 0
                    && handler.last_timestamp() == last_timestamp
                    && seconds < STORM_DELTA_SECONDS
                {
                    crate::debug!(
                        "possible interrupt storm on vector {:#x}, handler {:p}",
                        vector,
                        handler
                    );
                }
                handler.set_last_timestamp(time_counter);
            }

            let status = handler.service(trap_frame);

            // A claimed level-triggered line is already deasserted, so the
            // rest of the chain would run for nothing. Edge-triggered
            // chains always walk to the end.
            if status == InterruptStatus::Claimed && handler.mode() == TriggerMode::Level {
                break;
            }
        }

        if !serviced_any {
            crate::debug!(
                "unexpected interrupt on vector {:#x}, processor {}",
                vector,
                processor.number()
            );
            debug_assert!(false, "unexpected interrupt on vector {:#x}", vector);
        }
    }
}
