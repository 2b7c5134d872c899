// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Reduction of fetched blocks to the single largest balance change

use std::fmt;

use alloy_primitives::Address;
use bigdecimal::BigDecimal;
use serde::Serialize;
use tracing::debug;

use super::ledger::BalanceLedger;
use crate::types::{block::Block, wei::NativeAmount};

/// Sign of a net balance change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceDirection {
    /// The address received more than it sent
    Increase,
    /// The address sent more than it received
    Decrease,
    /// No change, e.g. nothing was aggregated
    None,
}

impl BalanceDirection {
    fn of(change: &BigDecimal) -> Self {
        let zero = BigDecimal::from(0u64);
        if *change > zero {
            BalanceDirection::Increase
        } else if *change < zero {
            BalanceDirection::Decrease
        } else {
            BalanceDirection::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceDirection::Increase => "increase",
            BalanceDirection::Decrease => "decrease",
            BalanceDirection::None => "none",
        }
    }
}

impl fmt::Display for BalanceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The address whose balance moved the most, and by how much
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargestBalanceChange {
    /// `None` when nothing moved
    pub address: Option<Address>,
    /// Magnitude of the net change
    pub change: NativeAmount,
    pub direction: BalanceDirection,
}

impl LargestBalanceChange {
    /// The result for a window in which no balance changed
    pub fn empty() -> Self {
        Self {
            address: None,
            change: NativeAmount::zero(),
            direction: BalanceDirection::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_none()
    }

    /// Address as lower-case `0x` hex, or `""` when empty
    pub fn address_hex(&self) -> String {
        self.address
            .map(|address| format!("{address:#x}"))
            .unwrap_or_default()
    }
}

impl Default for LargestBalanceChange {
    fn default() -> Self {
        Self::empty()
    }
}

/// Folds blocks into a [`BalanceLedger`] and reduces it to a
/// [`LargestBalanceChange`]
///
/// Every call starts from a fresh ledger. Blocks are applied in the order
/// given and transactions in block order; the order only matters for ties,
/// where the address touched first wins.
///
/// # Examples
///
/// ```rust
/// use alloy_primitives::{address, U256};
/// use deltascan::{BalanceChangeAggregator, BalanceDirection, Block, Transaction};
///
/// let x = address!("1111111111111111111111111111111111111111");
/// let y = address!("2222222222222222222222222222222222222222");
/// let blocks = vec![Block::new(
///     7,
///     vec![Transaction::new(Some(x), Some(y), U256::from(100u64))],
/// )];
///
/// let largest = BalanceChangeAggregator::aggregate(&blocks);
/// assert_eq!(largest.address, Some(x));
/// assert_eq!(largest.change.wei(), "100");
/// assert_eq!(largest.direction, BalanceDirection::Decrease);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceChangeAggregator;

impl BalanceChangeAggregator {
    /// Net balance change of every address touched by `blocks`.
    pub fn build_ledger<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> BalanceLedger {
        let mut ledger = BalanceLedger::new();
        for block in blocks {
            for tx in &block.transactions {
                ledger.apply(tx);
            }
        }
        ledger
    }

    /// The largest absolute net balance change across `blocks`.
    pub fn aggregate<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> LargestBalanceChange {
        let ledger = Self::build_ledger(blocks);
        let largest = Self::reduce(&ledger);
        debug!(
            addresses = ledger.len(),
            address = %largest.address_hex(),
            change_wei = %largest.change.wei(),
            "Aggregated balance changes"
        );
        largest
    }

    /// Pick the largest absolute entry of `ledger`.
    pub fn reduce(ledger: &BalanceLedger) -> LargestBalanceChange {
        match ledger.largest_change() {
            Some((address, change)) => LargestBalanceChange {
                address: Some(*address),
                change: NativeAmount::from_magnitude(change),
                direction: BalanceDirection::of(change),
            },
            None => LargestBalanceChange::empty(),
        }
    }
}
