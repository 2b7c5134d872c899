// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based retry layer with exponential backoff for upstream requests.
//!
//! This module implements a retry layer that automatically retries failed
//! requests with configurable exponential backoff. Every attempt is bounded by
//! its own timeout, so a hung connection costs at most one attempt.

use std::{
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use futures::future::BoxFuture;
use tower::{Layer, ServiceExt};
use tracing::{debug, warn};

use crate::errors::ProviderError;

/// Default maximum number of attempts, including the first request.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default base delay for exponential backoff (200ms).
const DEFAULT_BASE_DELAY_MS: u64 = 200;
/// Default maximum delay between retries (5 seconds).
const DEFAULT_MAX_DELAY_MS: u64 = 5_000;
/// Default timeout for a single attempt (10 seconds).
const DEFAULT_ATTEMPT_TIMEOUT_MS: u64 = 10_000;

/// A Tower layer that adds retry logic with exponential backoff to requests.
///
/// Only errors for which [`ProviderError::is_transient`] holds are retried.
/// The backoff before retry `n` (starting at 0) is:
///
/// ```text
/// delay = min(base_delay * 2^n, max_delay)
/// ```
///
/// When every attempt fails, the last error is wrapped in
/// [`ProviderError::RetriesExhausted`] together with the attempt count.
///
/// # Example
///
/// ```rust
/// use deltascan::transport::RetryLayer;
/// use std::time::Duration;
///
/// // Three attempts with exponential backoff
/// let layer = RetryLayer::new();
///
/// // Or with custom configuration
/// let layer = RetryLayer::builder()
///     .max_attempts(5)
///     .base_delay(Duration::from_millis(100))
///     .max_delay(Duration::from_secs(2))
///     .attempt_timeout(Duration::from_secs(5))
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct RetryLayer {
    config: Arc<RetryConfig>,
}

/// Configuration for retry behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the initial request.
    pub max_attempts: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Timeout applied to each individual attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            attempt_timeout: Duration::from_millis(DEFAULT_ATTEMPT_TIMEOUT_MS),
        }
    }
}

impl RetryLayer {
    /// Creates a new retry layer with default settings.
    ///
    /// Default settings:
    /// - 3 attempts
    /// - 200ms base delay
    /// - 5s maximum delay
    /// - 10s per-attempt timeout
    pub fn new() -> Self {
        Self::from_config(RetryConfig::default())
    }

    /// Creates a retry layer from an existing configuration.
    pub fn from_config(config: RetryConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a builder for customizing retry configuration.
    pub fn builder() -> RetryLayerBuilder {
        RetryLayerBuilder::new()
    }

    /// The configuration this layer applies.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl Default for RetryLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RetryService {
            service,
            config: self.config.clone(),
        }
    }
}

/// Builder for configuring a [`RetryLayer`].
#[derive(Clone, Debug, Default)]
pub struct RetryLayerBuilder {
    config: RetryConfig,
}

impl RetryLayerBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of attempts, including the initial request.
    ///
    /// Zero is treated as one: the request is always sent at least once.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Sets the base delay for exponential backoff.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    /// Sets the timeout of each individual attempt.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.config.attempt_timeout = timeout;
        self
    }

    /// Builds the configured [`RetryLayer`].
    pub fn build(self) -> RetryLayer {
        RetryLayer::from_config(self.config)
    }
}

/// A Tower service that adds retry logic with exponential backoff.
#[derive(Clone, Debug)]
pub struct RetryService<S> {
    service: S,
    config: Arc<RetryConfig>,
}

impl<S, Request> tower::Service<Request> for RetryService<S>
where
    S: tower::Service<Request, Error = ProviderError> + Clone + Send + 'static,
    S::Future: Send,
    S::Response: Send + 'static,
    Request: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = ProviderError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let max_attempts = config.max_attempts.max(1);
            let mut attempt = 1u32;
            loop {
                let mut service = service.clone();
                let attempt_request = request.clone();
                let pending = async move { service.ready().await?.call(attempt_request).await };

                let result = match tokio::time::timeout(config.attempt_timeout, pending).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::timeout(config.attempt_timeout)),
                };

                match result {
                    Ok(response) => {
                        if attempt > 1 {
                            debug!(attempt = attempt, "Request succeeded after retry");
                        }
                        return Ok(response);
                    }
                    Err(error) => {
                        if !error.is_transient() {
                            debug!(error = %error, "Non-retryable error, not retrying");
                            return Err(error);
                        }

                        if attempt >= max_attempts {
                            warn!(error = %error, attempts = attempt, "Max attempts exceeded");
                            return Err(ProviderError::retries_exhausted(attempt, error));
                        }

                        let delay = calculate_backoff(attempt - 1, &config);
                        warn!(
                            error = %error,
                            attempt = attempt,
                            max_attempts = max_attempts,
                            delay_ms = delay.as_millis(),
                            "Retryable error, backing off"
                        );

                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        })
    }
}

/// Calculates the backoff duration before retry number `retry` (0-based).
///
/// Uses exponential backoff: `min(base_delay * 2^retry, max_delay)`
fn calculate_backoff(retry: u32, config: &RetryConfig) -> Duration {
    let multiplier = 2u64.saturating_pow(retry);
    let delay_ms = config
        .base_delay
        .as_millis()
        .saturating_mul(multiplier as u128);
    let capped_delay_ms = delay_ms.min(config.max_delay.as_millis()) as u64;
    Duration::from_millis(capped_delay_ms)
}
