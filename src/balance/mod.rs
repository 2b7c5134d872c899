// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Net balance changes over a set of blocks
//!
//! - [`BalanceLedger`]: signed per-address deltas in first-seen order
//! - [`BalanceChangeAggregator`]: folds blocks into a ledger and picks the
//!   address whose balance moved the most

pub mod aggregator;
pub mod ledger;

pub use aggregator::{BalanceChangeAggregator, BalanceDirection, LargestBalanceChange};
pub use ledger::BalanceLedger;
