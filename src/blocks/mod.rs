// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block window calculations.

pub mod range;

// Re-export public API
pub use range::BlockRangeResolver;
