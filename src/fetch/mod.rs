// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Concurrent block fetching with per-block failure isolation
//!
//! [`BlockFetcher`] turns a window of block numbers into one
//! [`BlockFetchOutcome`] per number. A fixed pool of workers drains a shared
//! queue, so the number of outstanding upstream requests never exceeds the
//! configured [`MaxConcurrency`]. A failed block is reported, never raised:
//! siblings keep going and the caller decides what a partial window means.
//!
//! Retries and per-attempt timeouts are not handled here; they belong to the
//! [`BlockSource`]'s transport stack.

use std::{collections::VecDeque, sync::Arc};

use alloy_primitives::BlockNumber;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, Instrument};

use crate::errors::ProviderError;
use crate::provider::BlockSource;
use crate::tracing::spans;
use crate::types::{block::Block, config::MaxConcurrency};

/// Result of fetching one block of a window
#[derive(Debug)]
pub struct BlockFetchOutcome {
    /// The requested block number
    pub number: BlockNumber,
    /// The block, or why it could not be fetched after all retries
    pub result: Result<Block, ProviderError>,
}

impl BlockFetchOutcome {
    /// Whether the block was fetched
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fetches blocks from a [`BlockSource`] with bounded concurrency
///
/// # Examples
///
/// ```rust,ignore
/// use deltascan::{BlockFetcher, MaxConcurrency};
/// use std::sync::Arc;
///
/// let fetcher = BlockFetcher::new(Arc::new(client), MaxConcurrency::new(5));
/// let tip = fetcher.fetch_latest_block_number().await?;
/// let outcomes = fetcher.fetch_blocks(&[tip, tip - 1, tip - 2]).await;
/// assert_eq!(outcomes.len(), 3);
/// ```
#[derive(Clone)]
pub struct BlockFetcher {
    source: Arc<dyn BlockSource>,
    max_concurrency: MaxConcurrency,
}

impl BlockFetcher {
    pub fn new(source: Arc<dyn BlockSource>, max_concurrency: MaxConcurrency) -> Self {
        Self {
            source,
            max_concurrency,
        }
    }

    pub fn max_concurrency(&self) -> MaxConcurrency {
        self.max_concurrency
    }

    /// Current chain tip
    pub async fn fetch_latest_block_number(&self) -> Result<BlockNumber, ProviderError> {
        let latest = self.source.latest_block_number().await?;
        debug!(latest_block = latest, "Fetched latest block number");
        Ok(latest)
    }

    /// Fetch every block in `numbers`, at most `max_concurrency` at a time.
    ///
    /// Returns exactly one outcome per input number, in completion order.
    /// Dropping the returned future stops workers from starting new requests;
    /// requests already in flight run to completion in the background.
    pub async fn fetch_blocks(&self, numbers: &[BlockNumber]) -> Vec<BlockFetchOutcome> {
        if numbers.is_empty() {
            return Vec::new();
        }

        let workers = self.max_concurrency.workers_for(numbers.len());
        let span = spans::fetch_blocks(numbers.len(), workers);

        async move {
            let queue = Arc::new(Mutex::new(numbers.iter().copied().collect::<VecDeque<_>>()));
            let (tx, mut rx) = mpsc::channel(numbers.len());

            for worker in 0..workers {
                let queue = queue.clone();
                let tx = tx.clone();
                let source = self.source.clone();
                tokio::spawn(
                    async move { run_worker(worker, source, queue, tx).await }
                        .in_current_span(),
                );
            }
            // Workers hold the only senders; the channel closes when the last one exits.
            drop(tx);

            let mut outcomes = Vec::with_capacity(numbers.len());
            while let Some(outcome) = rx.recv().await {
                outcomes.push(outcome);
            }

            let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
            debug!(
                fetched = outcomes.len() - failed,
                failed = failed,
                "Finished fetching blocks"
            );
            outcomes
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for BlockFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockFetcher")
            .field("max_concurrency", &self.max_concurrency)
            .finish_non_exhaustive()
    }
}

/// Take block numbers off the shared queue until it is empty or the receiver
/// is gone, sending one outcome per fetched number.
async fn run_worker(
    worker: usize,
    source: Arc<dyn BlockSource>,
    queue: Arc<Mutex<VecDeque<BlockNumber>>>,
    tx: mpsc::Sender<BlockFetchOutcome>,
) {
    loop {
        if tx.is_closed() {
            debug!(worker = worker, "Fetch abandoned, worker stopping");
            return;
        }

        let Some(number) = queue.lock().await.pop_front() else {
            return;
        };

        let result = source
            .block_by_number(number)
            .instrument(spans::fetch_block(number))
            .await;

        if tx.send(BlockFetchOutcome { number, result }).await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns empty blocks, failing the numbers divisible by `fail_every`.
    struct EmptyBlocks {
        fail_every: u64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BlockSource for EmptyBlocks {
        async fn latest_block_number(&self) -> Result<BlockNumber, ProviderError> {
            Ok(42)
        }

        async fn block_by_number(&self, number: BlockNumber) -> Result<Block, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if number % self.fail_every == 0 {
                Err(ProviderError::block_not_found(number))
            } else {
                Ok(Block::new(number, Vec::new()))
            }
        }
    }

    fn fetcher(fail_every: u64, limit: usize) -> (BlockFetcher, Arc<EmptyBlocks>) {
        let source = Arc::new(EmptyBlocks {
            fail_every,
            calls: AtomicUsize::new(0),
        });
        (
            BlockFetcher::new(source.clone(), MaxConcurrency::new(limit)),
            source,
        )
    }

    #[tokio::test]
    async fn one_outcome_per_number() {
        let (fetcher, source) = fetcher(u64::MAX, 3);
        let numbers: Vec<_> = (1..=10).rev().collect();

        let outcomes = fetcher.fetch_blocks(&numbers).await;

        let mut fetched: Vec<_> = outcomes.iter().map(|outcome| outcome.number).collect();
        fetched.sort_unstable();
        assert_eq!(fetched, (1..=10).collect::<Vec<_>>());
        assert!(outcomes.iter().all(BlockFetchOutcome::is_ok));
        assert_eq!(source.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn failures_do_not_abort_siblings() {
        let (fetcher, _) = fetcher(4, 2);
        let outcomes = fetcher.fetch_blocks(&[8, 7, 6, 5, 4, 3]).await;

        assert_eq!(outcomes.len(), 6);
        let mut failed: Vec<_> = outcomes
            .iter()
            .filter(|outcome| !outcome.is_ok())
            .map(|outcome| outcome.number)
            .collect();
        failed.sort_unstable();
        assert_eq!(failed, vec![4, 8]);
    }

    #[tokio::test]
    async fn empty_window_makes_no_requests() {
        let (fetcher, source) = fetcher(u64::MAX, 5);
        assert!(fetcher.fetch_blocks(&[]).await.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn latest_block_number_passes_through() {
        let (fetcher, _) = fetcher(u64::MAX, 5);
        assert_eq!(fetcher.fetch_latest_block_number().await.unwrap(), 42);
    }
}
