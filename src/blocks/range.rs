// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Resolving the window of block numbers below the chain tip
//!
//! A window is the contiguous, descending run of block numbers starting at the
//! chain tip. Block 0 is the genesis floor and is never part of a window, so a
//! window near genesis is simply shorter than requested.

use alloy_primitives::BlockNumber;

use crate::types::config::WindowSize;

/// Computes which block numbers make up a scan window
///
/// # Examples
///
/// ```rust
/// use deltascan::{BlockRangeResolver, WindowSize};
///
/// let blocks = BlockRangeResolver::resolve(1_000, WindowSize::new(3));
/// assert_eq!(blocks, vec![1_000, 999, 998]);
///
/// // Stops at the genesis floor instead of wrapping
/// let blocks = BlockRangeResolver::resolve(2, WindowSize::new(5));
/// assert_eq!(blocks, vec![2, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRangeResolver;

impl BlockRangeResolver {
    /// Lowest block number that can be part of a window
    pub const FLOOR: BlockNumber = 1;

    /// Returns at most `window` block numbers, descending from `latest`
    ///
    /// The result is empty when `window` is zero or `latest` is below
    /// [`Self::FLOOR`].
    pub fn resolve(latest: BlockNumber, window: WindowSize) -> Vec<BlockNumber> {
        if latest < Self::FLOOR {
            return Vec::new();
        }

        let available = latest - Self::FLOOR + 1;
        let count = window.as_u64().min(available);
        (0..count).map(|offset| latest - offset).collect()
    }
}
