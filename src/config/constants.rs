//! Default values and environment variable names
//!
//! This module centralizes the configuration constants used throughout the
//! deltascan crate.

/// Default upstream API endpoint (Etherscan mainnet)
pub const DEFAULT_API_URL: &str = "https://api.etherscan.io/api";

/// Default port of the HTTP server
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Environment variables read by [`DeltascanConfig::from_env`](super::DeltascanConfig::from_env)
pub mod env {
    /// Base URL of the upstream API
    pub const API_URL: &str = "ETHERSCAN_API_URL";
    /// API key sent with every upstream request
    pub const API_KEY: &str = "ETHERSCAN_API_KEY";
    /// Chain selector for multichain endpoints
    pub const CHAIN_ID: &str = "CHAIN_ID";
    /// Number of blocks below the tip to scan
    pub const NUMBER_OF_BLOCKS: &str = "NUMBER_OF_BLOCKS";
    /// Maximum number of block requests in flight
    pub const MAX_CONCURRENCY: &str = "MAX_CONCURRENCY";
    pub const RETRY_MAX_ATTEMPTS: &str = "RETRY_MAX_ATTEMPTS";
    pub const RETRY_BASE_DELAY_MS: &str = "RETRY_BASE_DELAY_MS";
    pub const RETRY_MAX_DELAY_MS: &str = "RETRY_MAX_DELAY_MS";
    /// Timeout of a single upstream attempt
    pub const REQUEST_TIMEOUT_MS: &str = "REQUEST_TIMEOUT_MS";
    /// Client-side request quota; unset means unlimited
    pub const RATE_LIMIT_PER_SECOND: &str = "RATE_LIMIT_PER_SECOND";
    pub const HTTP_PORT: &str = "HTTP_PORT";
}
