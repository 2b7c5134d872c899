// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for type safety across deltascan.
//!
//! This module provides:
//! - Blocks and transactions decoded from the upstream wire format
//! - Exact native-currency amounts with unit conversion
//! - Configuration values (window size, concurrency limit)

pub mod block;
pub mod config;
pub mod wei;

// Note: Public types are re-exported from lib.rs, not here
