// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Signed per-address balance deltas
//!
//! Values are exact integers in wei held as [`BigDecimal`], so no sum of
//! `U256` transfers can overflow or lose precision. Entries keep the order in
//! which their address was first touched; that order decides ties in
//! [`BalanceLedger::largest_change`].

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;

use crate::types::{block::Transaction, wei::u256_to_bigdecimal};

/// Net balance change per address, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    entries: Vec<(Address, BigDecimal)>,
    index: HashMap<Address, usize>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subtract `value` from `address`'s net change.
    pub fn debit(&mut self, address: Address, value: U256) {
        let value = u256_to_bigdecimal(value);
        let entry = self.entry(address);
        *entry = &*entry - &value;
    }

    /// Add `value` to `address`'s net change.
    pub fn credit(&mut self, address: Address, value: U256) {
        let value = u256_to_bigdecimal(value);
        let entry = self.entry(address);
        *entry = &*entry + &value;
    }

    /// Apply one transaction: debit the sender, then credit the recipient.
    ///
    /// Either side is skipped when absent. A self-transfer touches the
    /// address twice and nets to zero, but still creates its entry.
    pub fn apply(&mut self, tx: &Transaction) {
        if let Some(from) = tx.from {
            self.debit(from, tx.value);
        }
        if let Some(to) = tx.to {
            self.credit(to, tx.value);
        }
    }

    /// Net change of `address`, if it was touched at all.
    pub fn net_change(&self, address: &Address) -> Option<&BigDecimal> {
        self.index.get(address).map(|&slot| &self.entries[slot].1)
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &BigDecimal)> {
        self.entries.iter().map(|(address, change)| (address, change))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry with the largest absolute net change.
    ///
    /// The first entry wins ties. `None` when the ledger is empty or every
    /// entry is zero.
    pub fn largest_change(&self) -> Option<(&Address, &BigDecimal)> {
        let mut best: Option<(&Address, &BigDecimal)> = None;
        let mut best_magnitude = BigDecimal::from(0u64);

        for (address, change) in self.iter() {
            let magnitude = change.abs();
            if magnitude > best_magnitude {
                best_magnitude = magnitude;
                best = Some((address, change));
            }
        }

        best
    }

    fn entry(&mut self, address: Address) -> &mut BigDecimal {
        let slot = match self.index.get(&address) {
            Some(&slot) => slot,
            None => {
                self.entries.push((address, BigDecimal::from(0u64)));
                let slot = self.entries.len() - 1;
                self.index.insert(address, slot);
                slot
            }
        };
        &mut self.entries[slot].1
    }
}
