//! Error types for the deltascan library.
//!
//! Each layer has its own error type:
//!
//! - [`ProviderError`] - a single upstream request failed (transient or not)
//! - [`ScanError`] - the whole scan had to be aborted
//! - [`ConfigError`] - configuration could not be loaded
//!
//! Block-level provider failures inside a window are *not* fatal. They are
//! collected into the scan report instead of being propagated.
//!
//! # Examples
//!
//! ```rust,ignore
//! use deltascan::{BalanceChangeScanner, ScanError};
//!
//! async fn example(scanner: &BalanceChangeScanner) {
//!     match scanner.find_address_with_largest_balance_change().await {
//!         Ok(report) => println!("{:?}", report.largest.address),
//!         Err(ScanError::LatestBlockNumber { source }) => {
//!             eprintln!("Chain tip unavailable: {source}");
//!         }
//!     }
//! }
//! ```

mod config;
mod provider;
mod scan;

pub use config::ConfigError;
pub use provider::ProviderError;
pub use scan::ScanError;
