// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while talking to the upstream block-data provider.
//!
//! Every variant is classified as transient or not by
//! [`ProviderError::is_transient`]. The retry layer only retries transient
//! failures; everything else is surfaced after the first attempt.

use std::time::Duration;

use alloy_primitives::BlockNumber;

/// Errors that can occur during a single upstream provider request.
///
/// # Examples
///
/// ```rust
/// use deltascan::ProviderError;
///
/// let error = ProviderError::http_status(503);
/// assert!(error.is_transient());
///
/// let error = ProviderError::malformed_response("result is not a hex string");
/// assert!(!error.is_transient());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response (DNS, connect, reset, ...).
    #[error("Network failure during {operation}")]
    Network {
        /// Description of the request that failed
        operation: String,
        /// The underlying transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A single attempt did not complete within the per-attempt timeout.
    #[error("Request timed out after {}ms", .after.as_millis())]
    Timeout {
        /// The timeout that elapsed
        after: Duration,
    },

    /// The upstream answered with a non-success HTTP status.
    #[error("Upstream returned HTTP status {status}")]
    HttpStatus {
        /// The HTTP status code
        status: u16,
    },

    /// The upstream signalled that the API key exceeded its request quota.
    #[error("Upstream rate limit reached: {message}")]
    RateLimited {
        /// Message reported by the upstream
        message: String,
    },

    /// The upstream envelope reported a failure (`status: "0"`).
    #[error("Upstream reported an error: {message}")]
    Upstream {
        /// Message reported by the upstream
        message: String,
    },

    /// The proxied node returned a JSON-RPC error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },

    /// The response body is missing expected fields or holds unparsable values.
    #[error("Malformed upstream response: {details}")]
    MalformedResponse {
        /// What was wrong with the response
        details: String,
    },

    /// The upstream has no block at the requested height (`result: null`).
    #[error("Block not found: {block_number}")]
    BlockNotFound {
        /// The block number that wasn't found
        block_number: BlockNumber,
    },

    /// A transient failure persisted through every allowed attempt.
    #[error("Gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made, including the first one
        attempts: u32,
        /// The error returned by the last attempt
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Helper to create a `Network` error from any error type.
    pub fn network(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ProviderError::Network {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create a `Timeout` error.
    pub fn timeout(after: Duration) -> Self {
        ProviderError::Timeout { after }
    }

    /// Create an `HttpStatus` error.
    pub fn http_status(status: u16) -> Self {
        ProviderError::HttpStatus { status }
    }

    /// Create a `RateLimited` error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        ProviderError::RateLimited {
            message: message.into(),
        }
    }

    /// Create an `Upstream` error.
    pub fn upstream(message: impl Into<String>) -> Self {
        ProviderError::Upstream {
            message: message.into(),
        }
    }

    /// Create an `Rpc` error.
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        ProviderError::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Create a `MalformedResponse` error with details.
    pub fn malformed_response(details: impl Into<String>) -> Self {
        ProviderError::MalformedResponse {
            details: details.into(),
        }
    }

    /// Helper for a response envelope without a `result` field.
    pub fn missing_result() -> Self {
        Self::malformed_response("missing result field")
    }

    /// Create a `BlockNotFound` error.
    pub fn block_not_found(block_number: BlockNumber) -> Self {
        ProviderError::BlockNotFound { block_number }
    }

    /// Wrap the last error of a retry loop.
    pub fn retries_exhausted(attempts: u32, last: ProviderError) -> Self {
        ProviderError::RetriesExhausted {
            attempts,
            source: Box::new(last),
        }
    }

    /// Whether a fresh attempt of the same request may succeed.
    ///
    /// Network failures, timeouts, HTTP 5xx/429 and upstream rate-limit
    /// notices are transient. Malformed bodies, JSON-RPC errors, missing
    /// blocks and exhausted retries are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Network { .. }
            | ProviderError::Timeout { .. }
            | ProviderError::RateLimited { .. } => true,
            ProviderError::HttpStatus { status } => *status == 429 || (500..600).contains(status),
            ProviderError::Upstream { .. }
            | ProviderError::Rpc { .. }
            | ProviderError::MalformedResponse { .. }
            | ProviderError::BlockNotFound { .. }
            | ProviderError::RetriesExhausted { .. } => false,
        }
    }

    /// Number of attempts behind this error (1 unless retries were exhausted).
    pub fn attempts(&self) -> u32 {
        match self {
            ProviderError::RetriesExhausted { attempts, .. } => *attempts,
            _ => 1,
        }
    }
}
