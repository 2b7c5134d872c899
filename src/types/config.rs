// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for configuration values
//!
//! These types keep window sizes and concurrency limits from being confused
//! with blockchain values such as block numbers.

use serde::{Deserialize, Serialize};

/// Number of most recent blocks considered by one scan
///
/// # Examples
///
/// ```
/// use deltascan::WindowSize;
///
/// assert_eq!(WindowSize::DEFAULT.as_u64(), 100);
/// assert_eq!(WindowSize::new(10).as_u64(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowSize(u64);

impl WindowSize {
    /// Default window of 100 blocks
    pub const DEFAULT: Self = Self(100);

    /// Create a new window size
    pub const fn new(blocks: u64) -> Self {
        Self(blocks)
    }

    /// Get the inner u64 value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Check whether the window is empty
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u64> for WindowSize {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} blocks", self.0)
    }
}

/// Maximum number of upstream requests in flight at the same time
///
/// Always at least 1: a limit of zero would never make progress.
///
/// # Examples
///
/// ```
/// use deltascan::MaxConcurrency;
///
/// assert_eq!(MaxConcurrency::DEFAULT.get(), 5);
/// assert_eq!(MaxConcurrency::new(0).get(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxConcurrency(usize);

impl MaxConcurrency {
    /// Default of 5 concurrent requests
    pub const DEFAULT: Self = Self(5);

    /// Create a new limit, clamped to at least 1
    pub const fn new(limit: usize) -> Self {
        if limit == 0 {
            Self(1)
        } else {
            Self(limit)
        }
    }

    /// Get the inner value
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Number of workers needed for `jobs` queued requests
    ///
    /// ```
    /// use deltascan::MaxConcurrency;
    ///
    /// let limit = MaxConcurrency::new(5);
    /// assert_eq!(limit.workers_for(3), 3);
    /// assert_eq!(limit.workers_for(100), 5);
    /// assert_eq!(limit.workers_for(0), 0);
    /// ```
    pub fn workers_for(&self, jobs: usize) -> usize {
        self.0.min(jobs)
    }
}

impl Default for MaxConcurrency {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<usize> for MaxConcurrency {
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for MaxConcurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} concurrent requests", self.0)
    }
}
