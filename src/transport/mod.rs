// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layer for the upstream block-data provider.
//!
//! The upstream is an Etherscan-style `proxy` API: plain HTTP GET requests
//! whose query selects a JSON-RPC method. [`EtherscanHttpService`] is a Tower
//! `Service<ProxyRequest>` returning the `result` field of the response
//! envelope, and the remaining modules are Tower middleware stacked on top of
//! it:
//!
//! - [`LoggingLayer`] records each request with its duration
//! - [`RetryLayer`] retries transient failures with exponential backoff and a
//!   per-attempt timeout
//! - [`RateLimitLayer`] keeps the request rate under the API key's quota
//!
//! ## Usage
//!
//! ```rust,ignore
//! use deltascan::transport::{EtherscanHttpService, LoggingLayer, RateLimitLayer, RetryLayer};
//! use tower::Layer;
//!
//! let http = EtherscanHttpService::new(api_url, Some(api_key), None);
//! let service = LoggingLayer::new().layer(
//!     RetryLayer::new().layer(RateLimitLayer::per_second(5).layer(http)),
//! );
//! ```

use std::fmt;

use alloy_primitives::BlockNumber;

mod http;
mod logging;
mod rate_limit;
mod retry;

pub use http::{decode_envelope, EtherscanHttpService};
pub use logging::{LoggingLayer, LoggingService};
pub use rate_limit::{RateLimitLayer, RateLimitService};
pub use retry::{RetryConfig, RetryLayer, RetryLayerBuilder, RetryService};

/// The full middleware stack used by [`EtherscanClient`](crate::EtherscanClient)
/// in production.
pub type EtherscanStack = LoggingService<RetryService<RateLimitService<EtherscanHttpService>>>;

/// A single request to the upstream `proxy` module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyRequest {
    /// `eth_blockNumber`: the current chain tip
    BlockNumber,
    /// `eth_getBlockByNumber` with full transaction objects
    BlockByNumber(BlockNumber),
}

impl ProxyRequest {
    /// The `action` query parameter for this request
    pub fn action(&self) -> &'static str {
        match self {
            ProxyRequest::BlockNumber => "eth_blockNumber",
            ProxyRequest::BlockByNumber(_) => "eth_getBlockByNumber",
        }
    }

    /// Request-specific query parameters (credentials are added by the HTTP service)
    ///
    /// ```
    /// use deltascan::transport::ProxyRequest;
    ///
    /// let query = ProxyRequest::BlockByNumber(436).query();
    /// assert!(query.contains(&("tag", "0x1b4".to_string())));
    /// assert!(query.contains(&("boolean", "true".to_string())));
    /// ```
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("module", "proxy".to_string()),
            ("action", self.action().to_string()),
        ];
        if let ProxyRequest::BlockByNumber(number) = self {
            query.push(("tag", format!("{number:#x}")));
            query.push(("boolean", "true".to_string()));
        }
        query
    }
}

impl fmt::Display for ProxyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyRequest::BlockNumber => f.write_str(self.action()),
            ProxyRequest::BlockByNumber(number) => write!(f, "{}({number:#x})", self.action()),
        }
    }
}
