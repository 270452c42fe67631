// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2024.

//! Registered interrupt handlers and the per-vector handler chains.
//!
//! A subsystem that owns a device registers an [`InterruptHandler`] for the
//! device's vector. Handlers bound to the same vector form a chain, walked
//! in registration order each time the vector fires. The handler node is
//! intrusive: the registering subsystem owns the storage, and publication
//! into the chain is a single pointer store.

use core::cell::Cell;

use crate::collections::list::{List, ListIterator, ListLink, ListNode};
use crate::platform::TrapFrame;
use crate::runlevel::RunLevel;

/// Sampling period for storm detection, as a mask over the low bits of the
/// per-handler interrupt count.
pub const STORM_COUNT_MASK: u64 = 0x3ff;

/// Window, in seconds, under which a full sampling period of interrupts is
/// considered a possible storm.
pub const STORM_DELTA_SECONDS: u64 = 10;

/// What a service routine did with the interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptStatus {
    /// The device was interrupting and has been serviced.
    Claimed,
    /// The device was not interrupting.
    NotClaimed,
}

/// How the line the handler is bound to is triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    Edge,
    Level,
}

/// A service routine bound to a vector.
///
/// The implementor's `self` is the registration context. The trap frame of
/// the original interrupt is supplied when there is one; replayed
/// interrupts have none.
pub trait InterruptClient {
    fn service_interrupt(&self, trap_frame: Option<&dyn TrapFrame>) -> InterruptStatus;
}

/// One registered handler: a node in a vector's handler chain.
pub struct InterruptHandler<'a> {
    vector: u32,
    run_level: RunLevel,
    mode: TriggerMode,
    client: &'a dyn InterruptClient,
    interrupt_count: Cell<u64>,
    last_timestamp: Cell<u64>,
    next: ListLink<'a, InterruptHandler<'a>>,
}

impl<'a> InterruptHandler<'a> {
    /// Create a handler for `vector`. The declared `run_level` must be the
    /// level `vector` fires at; the walker checks the two agree.
    pub const fn new(
        vector: u32,
        run_level: RunLevel,
        mode: TriggerMode,
        client: &'a dyn InterruptClient,
    ) -> InterruptHandler<'a> {
        InterruptHandler {
            vector,
            run_level,
            mode,
            client,
            interrupt_count: Cell::new(0),
            last_timestamp: Cell::new(0),
            next: ListLink::empty(),
        }
    }

    pub fn vector(&self) -> u32 {
        self.vector
    }

    pub fn run_level(&self) -> RunLevel {
        self.run_level
    }

    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    /// How many times this handler has been invoked.
    pub fn interrupt_count(&self) -> u64 {
        self.interrupt_count.get()
    }

    /// The time-counter reading at the last storm-detection sample.
    pub fn last_timestamp(&self) -> u64 {
        self.last_timestamp.get()
    }

    pub(crate) fn count_invocation(&self) -> u64 {
        let count = self.interrupt_count.get() + 1;
        self.interrupt_count.set(count);
        count
    }

    pub(crate) fn set_last_timestamp(&self, ticks: u64) {
        self.last_timestamp.set(ticks);
    }

    pub(crate) fn service(&self, trap_frame: Option<&dyn TrapFrame>) -> InterruptStatus {
        self.client.service_interrupt(trap_frame)
    }
}

impl<'a> ListNode<'a, InterruptHandler<'a>> for InterruptHandler<'a> {
    fn next(&'a self) -> &'a ListLink<'a, InterruptHandler<'a>> {
        &self.next
    }
}

/// Handler chains for the configurable vector range, one chain per vector.
///
/// The chain storage is supplied by the platform so the table itself stays
/// a plain borrow on the processor block. Registration publishes into a
/// chain with a single aligned head store; the dispatcher requires only
/// that a chain stay well-formed for the duration of one walk. Excluding
/// dispatch on the target processor during an update (by raising the run
/// level above the vector's) is the registrant's concern.
pub struct InterruptTable<'a> {
    chains: &'a [List<'a, InterruptHandler<'a>>],
    first_vector: u32,
}

impl<'a> InterruptTable<'a> {
    pub const fn new(
        first_vector: u32,
        chains: &'a [List<'a, InterruptHandler<'a>>],
    ) -> InterruptTable<'a> {
        InterruptTable {
            chains,
            first_vector,
        }
    }

    pub fn first_vector(&self) -> u32 {
        self.first_vector
    }

    /// Append `handler` to its vector's chain.
    pub fn register(&self, handler: &'a InterruptHandler<'a>) {
        let index = (handler.vector() - self.first_vector) as usize;
        self.chains[index].push_tail(handler);
    }

    /// Iterate the chain registered for `vector`, head first. An empty
    /// iterator means no handler is registered.
    pub fn chain(&self, vector: u32) -> ListIterator<'a, InterruptHandler<'a>> {
        let index = (vector - self.first_vector) as usize;
        self.chains[index].iter()
    }
}
