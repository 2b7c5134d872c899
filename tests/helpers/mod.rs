// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for deltascan integration tests
//!
//! Provides a scripted [`BlockSource`] so scans can be tested without a real
//! upstream API.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use alloy_primitives::{Address, BlockNumber, U256};
use async_trait::async_trait;
use deltascan::{Block, BlockSource, ProviderError, Transaction};

/// Mock BlockSource with scripted blocks and failures
///
/// Tracks how many block requests are in flight at once, so tests can check
/// concurrency bounds.
///
/// # Example
///
/// ```rust,ignore
/// let source = MockBlockSource::new(105)
///     .with_block(block(105, vec![transfer(x, y, 70)]))
///     .with_failure(103, ProviderError::http_status(503))
///     .with_latency(Duration::from_millis(20));
/// ```
pub struct MockBlockSource {
    latest: Result<BlockNumber, fn() -> ProviderError>,
    blocks: HashMap<BlockNumber, Block>,
    failures: HashMap<BlockNumber, fn() -> ProviderError>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<BlockNumber>>,
}

impl MockBlockSource {
    /// Create a source whose tip is `latest` and whose blocks are all empty
    pub fn new(latest: BlockNumber) -> Self {
        Self {
            latest: Ok(latest),
            blocks: HashMap::new(),
            failures: HashMap::new(),
            latency: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make the chain tip request fail
    pub fn with_failing_tip(mut self, error: fn() -> ProviderError) -> Self {
        self.latest = Err(error);
        self
    }

    /// Serve `block` for its number
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.insert(block.number, block);
        self
    }

    /// Fail every request for `number` with the error built by `error`
    pub fn with_failure(mut self, number: BlockNumber, error: fn() -> ProviderError) -> Self {
        self.failures.insert(number, error);
        self
    }

    /// Delay every block response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Highest number of block requests observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Block numbers requested so far, in request order
    pub fn calls(&self) -> Vec<BlockNumber> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlockSource for MockBlockSource {
    async fn latest_block_number(&self) -> Result<BlockNumber, ProviderError> {
        self.latest.map_err(|error| error())
    }

    async fn block_by_number(&self, number: BlockNumber) -> Result<Block, ProviderError> {
        self.calls.lock().unwrap().push(number);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.failures.get(&number) {
            return Err(error());
        }
        Ok(self
            .blocks
            .get(&number)
            .cloned()
            .unwrap_or_else(|| Block::new(number, Vec::new())))
    }
}

/// Build a block
pub fn block(number: BlockNumber, transactions: Vec<Transaction>) -> Block {
    Block::new(number, transactions)
}

/// Build a plain transfer of `value` wei
pub fn transfer(from: Address, to: Address, value: u64) -> Transaction {
    Transaction::new(Some(from), Some(to), U256::from(value))
}

/// Deterministic test address from a single byte
pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// An error that survived every retry attempt
pub fn exhausted() -> ProviderError {
    ProviderError::retries_exhausted(3, ProviderError::http_status(503))
}
