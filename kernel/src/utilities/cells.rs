// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tern Contributors 2024.

//! Re-export the cell library so kernel users have one canonical path.

pub use tern_cells::numeric_cell_ext::NumericCellExt;
pub use tern_cells::optional_cell::OptionalCell;
