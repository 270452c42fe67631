// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2023.

//! Tern cell types.

#![no_std]

pub mod numeric_cell_ext;
pub mod optional_cell;
