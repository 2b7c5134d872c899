// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # deltascan
//!
//! Finds the address whose native-currency balance changed the most, in
//! absolute terms, over the most recent blocks of an EVM chain.
//!
//! A scan reads the chain tip from an Etherscan-style `proxy` API, resolves a
//! window of block numbers below it, fetches those blocks with bounded
//! concurrency and retries, and folds every transaction's `value` into a
//! per-address ledger of exact integer deltas.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deltascan::{BalanceChangeScanner, DeltascanConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = DeltascanConfig::from_env()?;
//! let scanner = BalanceChangeScanner::from_config(&config);
//!
//! let report = scanner.find_address_with_largest_balance_change().await?;
//! println!(
//!     "{} ({}) {} ETH",
//!     report.largest.address_hex(),
//!     report.largest.direction,
//!     report.largest.change.ether()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`transport`]: HTTP transport and Tower middleware (logging, retry, rate limiting)
//! - [`BlockSource`] / [`EtherscanClient`]: typed access to the chain tip and blocks
//! - [`BlockFetcher`]: bounded-concurrency window fetching with per-block failures
//! - [`BalanceChangeAggregator`]: exact ledger and largest-change reduction
//! - [`BalanceChangeScanner`]: the end-to-end scan
//! - [`api`]: the HTTP server

pub mod api;
mod balance;
mod blocks;
pub mod bootstrap;
mod config;
mod errors;
mod fetch;
mod provider;
mod scanner;
mod tracing;
pub mod transport;
mod types;

pub use balance::{BalanceChangeAggregator, BalanceDirection, BalanceLedger, LargestBalanceChange};
pub use blocks::BlockRangeResolver;
pub use config::{constants, DeltascanConfig, DeltascanConfigBuilder};
pub use errors::{ConfigError, ProviderError, ScanError};
pub use fetch::{BlockFetchOutcome, BlockFetcher};
pub use provider::{BlockSource, EtherscanClient};
pub use scanner::{BalanceChangeReport, BalanceChangeScanner, BlockFetchFailure};
pub use types::block::{parse_hex_u256, parse_hex_u64, Block, RawBlock, RawTransaction, Transaction};
pub use types::config::{MaxConcurrency, WindowSize};
pub use types::wei::{u256_to_bigdecimal, NativeAmount, ETHER_DECIMALS, GWEI_DECIMALS};
