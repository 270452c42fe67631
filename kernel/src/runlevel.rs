// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2024.

//! Software interrupt priority model.
//!
//! Every processor runs at a nominal *run level* at all times. The run level
//! gates which interrupt vectors may preempt the current execution context:
//! a vector whose run level is less than or equal to the processor's current
//! run level is not serviced until the processor lowers back below it.
//!
//! Each hardware vector maps to exactly one run level through a [`VectorMap`]
//! fixed at boot. The dispatcher treats that mapping as an oracle.

/// Software priority class of an execution context.
///
/// Levels are totally ordered. `Low` is normal thread execution, `Dispatch`
/// is the scheduler's software interrupt level, `Device0` through `Device9`
/// are hardware device levels, and `Clock` and above are reserved for the
/// system timer, inter-processor interrupts, profiling, and machine-critical
/// work.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunLevel {
    Low = 0,
    Dispatch = 1,
    Device0 = 2,
    Device1 = 3,
    Device2 = 4,
    Device3 = 5,
    Device4 = 6,
    Device5 = 7,
    Device6 = 8,
    Device7 = 9,
    Device8 = 10,
    Device9 = 11,
    Clock = 12,
    Ipi = 13,
    Profile = 14,
    High = 15,
}

/// Number of distinct run levels.
pub const RUN_LEVEL_COUNT: usize = 16;

impl RunLevel {
    /// Convert a raw priority number into a run level.
    pub fn from_u8(val: u8) -> Option<RunLevel> {
        match val {
            0 => Some(RunLevel::Low),
            1 => Some(RunLevel::Dispatch),
            2 => Some(RunLevel::Device0),
            3 => Some(RunLevel::Device1),
            4 => Some(RunLevel::Device2),
            5 => Some(RunLevel::Device3),
            6 => Some(RunLevel::Device4),
            7 => Some(RunLevel::Device5),
            8 => Some(RunLevel::Device6),
            9 => Some(RunLevel::Device7),
            10 => Some(RunLevel::Device8),
            11 => Some(RunLevel::Device9),
            12 => Some(RunLevel::Clock),
            13 => Some(RunLevel::Ipi),
            14 => Some(RunLevel::Profile),
            15 => Some(RunLevel::High),
            _ => None,
        }
    }

    /// Whether this is one of the device interrupt levels.
    pub fn is_device(self) -> bool {
        self >= RunLevel::Device0 && self <= RunLevel::Device9
    }
}

/// Boot-time mapping from interrupt vector numbers to run levels.
///
/// Vectors below `first_vector` belong to the architecture (exceptions,
/// reserved entries) and never reach the dispatcher. The table covers the
/// configurable vectors from `first_vector` upward, one level per vector.
#[derive(Clone, Copy)]
pub struct VectorMap {
    first_vector: u32,
    levels: &'static [RunLevel],
}

impl VectorMap {
    pub const fn new(first_vector: u32, levels: &'static [RunLevel]) -> VectorMap {
        VectorMap {
            first_vector,
            levels,
        }
    }

    /// The lowest configurable vector number.
    pub fn first_vector(&self) -> u32 {
        self.first_vector
    }

    /// The run level a vector fires at.
    ///
    /// Panics when handed a vector outside the configurable range; such a
    /// vector reaching the dispatcher is a configuration error.
    pub fn run_level(&self, vector: u32) -> RunLevel {
        debug_assert!(vector >= self.first_vector);
        self.levels[(vector - self.first_vector) as usize]
    }

    /// Whether `vector` is covered by this map.
    pub fn contains(&self, vector: u32) -> bool {
        vector >= self.first_vector
            && ((vector - self.first_vector) as usize) < self.levels.len()
    }
}
