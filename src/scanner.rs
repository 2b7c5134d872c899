// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end largest-balance-change scan
//!
//! [`BalanceChangeScanner`] wires the three stages together:
//!
//! 1. fetch the chain tip and resolve the window below it
//! 2. fetch every block of the window with bounded concurrency
//! 3. fold the fetched blocks into a ledger and reduce it
//!
//! Only a failure to read the chain tip aborts a scan. Blocks that cannot be
//! fetched are logged, left out of the ledger and listed in the report.

use std::sync::Arc;

use alloy_primitives::BlockNumber;
use tracing::{info, warn, Instrument};

use crate::balance::{BalanceChangeAggregator, LargestBalanceChange};
use crate::blocks::BlockRangeResolver;
use crate::config::DeltascanConfig;
use crate::errors::{ProviderError, ScanError};
use crate::fetch::BlockFetcher;
use crate::provider::{BlockSource, EtherscanClient};
use crate::tracing::spans;
use crate::types::{
    block::Block,
    config::{MaxConcurrency, WindowSize},
};

/// A block of the window that could not be fetched
#[derive(Debug)]
pub struct BlockFetchFailure {
    pub block_number: BlockNumber,
    pub error: ProviderError,
}

/// Outcome of a scan: the largest change plus what the window actually covered
#[derive(Debug)]
pub struct BalanceChangeReport {
    /// Chain tip the window was resolved against
    pub latest_block: BlockNumber,
    /// Block numbers of the window, tip first
    pub requested: Vec<BlockNumber>,
    /// Number of blocks that made it into the ledger
    pub aggregated_blocks: usize,
    /// Blocks left out of the ledger, in window order
    pub failures: Vec<BlockFetchFailure>,
    pub largest: LargestBalanceChange,
}

impl BalanceChangeReport {
    /// Whether every block of the window was aggregated
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Finds the address with the largest net balance change over the most
/// recent blocks
///
/// Scans share nothing: one scanner can serve concurrent callers.
///
/// # Examples
///
/// ```rust,no_run
/// use deltascan::{BalanceChangeScanner, DeltascanConfig};
///
/// # async fn example() -> Result<(), deltascan::ScanError> {
/// let scanner = BalanceChangeScanner::from_config(&DeltascanConfig::default());
/// let report = scanner.find_address_with_largest_balance_change().await?;
///
/// println!(
///     "{} moved {} ETH over {} blocks",
///     report.largest.address_hex(),
///     report.largest.change.ether(),
///     report.aggregated_blocks,
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BalanceChangeScanner {
    fetcher: BlockFetcher,
    window_size: WindowSize,
}

impl BalanceChangeScanner {
    pub fn new(
        source: Arc<dyn BlockSource>,
        window_size: WindowSize,
        max_concurrency: MaxConcurrency,
    ) -> Self {
        Self {
            fetcher: BlockFetcher::new(source, max_concurrency),
            window_size,
        }
    }

    /// Scanner over the upstream API described by `config`
    pub fn from_config(config: &DeltascanConfig) -> Self {
        Self::new(
            Arc::new(EtherscanClient::from_config(config)),
            config.window_size,
            config.max_concurrency,
        )
    }

    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    /// Scan the most recent window of blocks.
    ///
    /// # Errors
    ///
    /// [`ScanError::LatestBlockNumber`] when the chain tip cannot be read.
    /// Individual block failures are not errors; see
    /// [`BalanceChangeReport::failures`].
    pub async fn find_address_with_largest_balance_change(
        &self,
    ) -> Result<BalanceChangeReport, ScanError> {
        let span = spans::find_largest_balance_change(
            self.window_size.as_u64(),
            self.fetcher.max_concurrency().get(),
        );

        async move {
            let latest_block = self
                .fetcher
                .fetch_latest_block_number()
                .await
                .map_err(ScanError::latest_block_number)?;
            tracing::Span::current().record("latest_block", latest_block);

            let requested = BlockRangeResolver::resolve(latest_block, self.window_size);
            let (blocks, failures) = self.fetch_window(&requested).await;

            for failure in &failures {
                warn!(
                    block_number = failure.block_number,
                    attempts = failure.error.attempts(),
                    error = %failure.error,
                    "Skipping block that could not be fetched"
                );
            }

            let largest = {
                let _guard = spans::aggregate_blocks(blocks.len()).entered();
                BalanceChangeAggregator::aggregate(&blocks)
            };

            info!(
                latest_block = latest_block,
                blocks_requested = requested.len(),
                blocks_aggregated = blocks.len(),
                blocks_failed = failures.len(),
                address = %largest.address_hex(),
                change_wei = %largest.change.wei(),
                direction = %largest.direction,
                "Found largest balance change"
            );

            Ok(BalanceChangeReport {
                latest_block,
                aggregated_blocks: blocks.len(),
                requested,
                failures,
                largest,
            })
        }
        .instrument(span)
        .await
    }

    /// Fetch `requested` and split the outcomes into blocks and failures,
    /// both in window order.
    async fn fetch_window(
        &self,
        requested: &[BlockNumber],
    ) -> (Vec<Block>, Vec<BlockFetchFailure>) {
        let mut outcomes = self.fetcher.fetch_blocks(requested).await;
        // Window order is descending, so the tip comes first.
        outcomes.sort_unstable_by(|a, b| b.number.cmp(&a.number));

        let mut blocks = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(block) => blocks.push(block),
                Err(error) => failures.push(BlockFetchFailure {
                    block_number: outcome.number,
                    error,
                }),
            }
        }
        (blocks, failures)
    }
}
