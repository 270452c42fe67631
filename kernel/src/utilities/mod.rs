// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2024.

//! Helper types and re-exports used across the kernel.

pub mod cells;
#[macro_use]
pub mod static_init;
