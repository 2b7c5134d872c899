// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Fatal errors of a balance-change scan.
//!
//! Failures fetching individual blocks are not represented here: they are
//! recovered by the fetcher and reported in
//! [`BalanceChangeReport::failures`](crate::BalanceChangeReport::failures).

use super::ProviderError;

/// Errors that abort a whole balance-change scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The chain tip could not be determined, so there is no window to scan.
    #[error("Failed to get latest block number")]
    LatestBlockNumber {
        /// The underlying provider error
        #[source]
        source: ProviderError,
    },
}

impl ScanError {
    /// Create a `LatestBlockNumber` error.
    pub fn latest_block_number(source: ProviderError) -> Self {
        ScanError::LatestBlockNumber { source }
    }
}
