// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2024.

//! Core Tern kernel hardware layer.
//!
//! This crate implements interrupt entry and exit and run-level management
//! for the Tern kernel: the state machine that keeps each processor's
//! software priority, its pending-interrupt queue, and the hardware
//! interrupt-enable flag mutually consistent. Controller drivers, device
//! handlers, the scheduler, and the signal dispatcher plug in through the
//! traits in [`controller`], [`handler`], and [`platform`].
//!
//! Most `unsafe` code in the interrupt path is in this crate.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod collections;
mod config;
#[macro_use]
pub mod debug;
pub mod platform;
pub mod utilities;

mod controller;
mod dispatch;
mod handler;
mod pending;
mod processor;
mod runlevel;

pub use crate::controller::{Controller, InterruptCause, InterruptController, MagicCandy};
pub use crate::dispatch::RunLevelManager;
pub use crate::handler::{
    InterruptClient, InterruptHandler, InterruptStatus, InterruptTable, TriggerMode,
    STORM_COUNT_MASK, STORM_DELTA_SECONDS,
};
pub use crate::pending::{PendingInterrupt, PendingQueue, MAX_PENDING_INTERRUPTS};
pub use crate::platform::{Cpu, SignalTarget, SoftwareDispatch, Timebase, TrapFrame};
pub use crate::processor::ProcessorBlock;
pub use crate::runlevel::{RunLevel, VectorMap, RUN_LEVEL_COUNT};
