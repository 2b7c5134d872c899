//! Configuration for deltascan
//!
//! Every component receives its settings through its constructor; only the
//! binary reads the environment, via [`DeltascanConfig::from_env`].
//!
//! # Example: Using defaults
//!
//! ```rust
//! use deltascan::DeltascanConfig;
//!
//! // 100 blocks, 5 concurrent requests, Etherscan mainnet endpoint
//! let config = DeltascanConfig::default();
//! assert_eq!(config.window_size.as_u64(), 100);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use deltascan::DeltascanConfigBuilder;
//! use std::time::Duration;
//!
//! let config = DeltascanConfigBuilder::new()
//!     .api_key("YOUR_KEY")
//!     .window_size(250)
//!     .max_concurrency(3)
//!     .request_timeout(Duration::from_secs(5))
//!     .rate_limit_per_second(5)
//!     .build();
//! ```

use std::str::FromStr;
use std::time::Duration;

use alloy_chains::Chain;
use tracing::warn;
use url::Url;

use crate::errors::ConfigError;
use crate::transport::RetryConfig;
use crate::types::config::{MaxConcurrency, WindowSize};

pub mod constants;

use constants::env;

/// Configuration for a deltascan deployment
///
/// Use [`DeltascanConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct DeltascanConfig {
    /// Base URL of the upstream `proxy` API
    /// Default: `https://api.etherscan.io/api`
    pub api_url: Url,

    /// API key sent as `apikey`
    /// Default: None (requests are anonymous and heavily throttled)
    pub api_key: Option<String>,

    /// Chain sent as `chainid`, for multichain endpoints
    /// Default: None
    pub chain: Option<Chain>,

    /// Number of blocks to scan, counting down from the tip
    /// Default: 100
    pub window_size: WindowSize,

    /// Maximum number of block requests in flight
    /// Default: 5
    pub max_concurrency: MaxConcurrency,

    /// Retry policy and per-attempt timeout for upstream requests
    pub retry: RetryConfig,

    /// Client-side request quota
    /// Default: None (unlimited)
    pub rate_limit_per_second: Option<u32>,

    /// Port of the HTTP server
    /// Default: 3000
    pub http_port: u16,
}

impl Default for DeltascanConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            chain: None,
            window_size: WindowSize::default(),
            max_concurrency: MaxConcurrency::default(),
            retry: RetryConfig::default(),
            rate_limit_per_second: None,
            http_port: constants::DEFAULT_HTTP_PORT,
        }
    }
}

impl DeltascanConfig {
    pub fn builder() -> DeltascanConfigBuilder {
        DeltascanConfigBuilder::new()
    }

    /// Read configuration from the process environment and a `.env` file.
    ///
    /// Unset or empty variables take their defaults; set but unparsable
    /// variables are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Read configuration from an arbitrary key-value source.
    ///
    /// # Example
    ///
    /// ```rust
    /// use deltascan::DeltascanConfig;
    ///
    /// let config = DeltascanConfig::from_lookup(|key| match key {
    ///     "NUMBER_OF_BLOCKS" => Some("10".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(config.window_size.as_u64(), 10);
    ///
    /// assert!(DeltascanConfig::from_lookup(|key| match key {
    ///     "MAX_CONCURRENCY" => Some("0".to_string()),
    ///     _ => None,
    /// })
    /// .is_err());
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(env::API_URL) {
            config.api_url = Url::parse(value.trim())
                .map_err(|e| ConfigError::invalid_value(env::API_URL, &value, e.to_string()))?;
        }

        config.api_key = get(env::API_KEY);
        if config.api_key.is_none() {
            warn!(
                variable = env::API_KEY,
                "No API key configured, upstream requests will be heavily rate limited"
            );
        }

        if let Some(id) = parse_var::<u64>(&get, env::CHAIN_ID)? {
            config.chain = Some(Chain::from_id(id));
        }

        if let Some(blocks) = parse_var::<u64>(&get, env::NUMBER_OF_BLOCKS)? {
            config.window_size = WindowSize::new(blocks);
        }

        if let Some(limit) = parse_var::<usize>(&get, env::MAX_CONCURRENCY)? {
            if limit == 0 {
                return Err(ConfigError::invalid_value(
                    env::MAX_CONCURRENCY,
                    "0",
                    "must be at least 1",
                ));
            }
            config.max_concurrency = MaxConcurrency::new(limit);
        }

        if let Some(attempts) = parse_var::<u32>(&get, env::RETRY_MAX_ATTEMPTS)? {
            if attempts == 0 {
                return Err(ConfigError::invalid_value(
                    env::RETRY_MAX_ATTEMPTS,
                    "0",
                    "must be at least 1",
                ));
            }
            config.retry.max_attempts = attempts;
        }

        if let Some(ms) = parse_var::<u64>(&get, env::RETRY_BASE_DELAY_MS)? {
            config.retry.base_delay = Duration::from_millis(ms);
        }

        if let Some(ms) = parse_var::<u64>(&get, env::RETRY_MAX_DELAY_MS)? {
            config.retry.max_delay = Duration::from_millis(ms);
        }

        if let Some(ms) = parse_var::<u64>(&get, env::REQUEST_TIMEOUT_MS)? {
            if ms == 0 {
                return Err(ConfigError::invalid_value(
                    env::REQUEST_TIMEOUT_MS,
                    "0",
                    "must be positive",
                ));
            }
            config.retry.attempt_timeout = Duration::from_millis(ms);
        }

        config.rate_limit_per_second =
            parse_var::<u32>(&get, env::RATE_LIMIT_PER_SECOND)?.filter(|&rps| rps > 0);

        if let Some(port) = parse_var::<u16>(&get, env::HTTP_PORT)? {
            config.http_port = port;
        }

        Ok(config)
    }
}

/// Parse an optional variable, naming it in the error.
fn parse_var<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::invalid_value(key, &value, e.to_string()))
        })
        .transpose()
}

fn default_api_url() -> Url {
    Url::parse(constants::DEFAULT_API_URL).expect("DEFAULT_API_URL should be a valid URL")
}

/// Builder for [`DeltascanConfig`] with a fluent API
///
/// # Example
///
/// ```rust
/// use deltascan::DeltascanConfigBuilder;
/// use alloy_chains::NamedChain;
///
/// let config = DeltascanConfigBuilder::new()
///     .api_url("https://api.etherscan.io/v2/api".parse().unwrap())
///     .chain(NamedChain::Mainnet.into())
///     .window_size(50)
///     .build();
/// assert_eq!(config.chain.map(|chain| chain.id()), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeltascanConfigBuilder {
    config: DeltascanConfig,
}

impl DeltascanConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_url(mut self, url: Url) -> Self {
        self.config.api_url = url;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn chain(mut self, chain: Chain) -> Self {
        self.config.chain = Some(chain);
        self
    }

    /// Set the number of blocks to scan
    pub fn window_size(mut self, blocks: u64) -> Self {
        self.config.window_size = WindowSize::new(blocks);
        self
    }

    /// Set the maximum number of block requests in flight (zero is raised to one)
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.config.max_concurrency = MaxConcurrency::new(limit);
        self
    }

    /// Replace the whole retry policy
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the timeout of a single upstream attempt
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.retry.attempt_timeout = timeout;
        self
    }

    /// Limit upstream requests per second (zero means unlimited)
    pub fn rate_limit_per_second(mut self, requests: u32) -> Self {
        self.config.rate_limit_per_second = Some(requests).filter(|&rps| rps > 0);
        self
    }

    pub fn http_port(mut self, port: u16) -> Self {
        self.config.http_port = port;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> DeltascanConfig {
        self.config
    }
}
