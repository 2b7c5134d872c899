//! Span creation helpers for deltascan operations.
//!
//! Telemetry concerns are kept out of the business logic: instead of
//! `#[instrument]` attributes, each instrumented operation has a span helper
//! here, attached to the async work with [`tracing::Instrument`].
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(spans::my_operation(param))
//!     .await
//! }
//! ```

use alloy_primitives::BlockNumber;
use tracing::{Level, Span};

/// Create span for a whole largest-balance-change scan.
///
/// Parent: None (root span for this operation)
/// Children: fetch_blocks, aggregate_blocks
#[inline]
pub(crate) fn find_largest_balance_change(window_size: u64, max_concurrency: usize) -> Span {
    tracing::span!(
        Level::INFO,
        "deltascan.find_largest_balance_change",
        window_size = window_size,
        max_concurrency = max_concurrency,
        latest_block = tracing::field::Empty,
    )
}

/// Create span for fetching a window of blocks through the worker pool.
///
/// Parent: find_largest_balance_change span
/// Children: fetch_block spans (one per block number)
#[inline]
pub(crate) fn fetch_blocks(block_count: usize, workers: usize) -> Span {
    tracing::debug_span!(
        "deltascan.fetch_blocks",
        block_count = block_count,
        workers = workers,
    )
}

/// Create span for fetching a single block.
///
/// Parent: fetch_blocks span
/// Children: upstream_call spans from the transport logging layer
#[inline]
pub(crate) fn fetch_block(block_number: BlockNumber) -> Span {
    tracing::trace_span!("deltascan.fetch_block", block_number = block_number)
}

/// Create span for folding fetched blocks into the balance ledger.
///
/// Parent: find_largest_balance_change span
/// Children: None
#[inline]
pub(crate) fn aggregate_blocks(block_count: usize) -> Span {
    tracing::debug_span!("deltascan.aggregate_blocks", block_count = block_count)
}
