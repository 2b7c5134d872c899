// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based rate limiting layer for upstream requests.
//!
//! Block explorer APIs meter requests per API key (the free Etherscan tier
//! allows 5 calls per second). This module implements a token bucket that
//! keeps the whole client under such a quota, however many fetch workers
//! share it.

use std::{
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::{sync::Mutex, time::Instant};
use tower::Layer;

/// A Tower layer that applies rate limiting to requests.
///
/// This layer uses a token bucket algorithm to limit the rate of requests.
/// Tokens are replenished at a fixed rate, and each request consumes one token.
/// If no tokens are available, the request waits until a token becomes available.
///
/// Services produced by one layer share a single bucket.
///
/// # Example
///
/// ```rust
/// use deltascan::transport::RateLimitLayer;
/// use std::time::Duration;
///
/// // Allow 5 requests per second
/// let layer = RateLimitLayer::per_second(5);
///
/// // Allow 100 requests per minute
/// let layer = RateLimitLayer::new(100, Duration::from_secs(60));
///
/// // No limit at all
/// let layer = RateLimitLayer::unlimited();
/// assert!(!layer.is_limited());
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitLayer {
    state: Option<Arc<Mutex<RateLimitState>>>,
}

impl RateLimitLayer {
    /// Creates a new rate limit layer.
    ///
    /// # Arguments
    ///
    /// * `requests` - Maximum number of requests allowed in the given period
    /// * `period` - The time period for the rate limit
    ///
    /// A zero `requests` or `period` yields an unlimited layer.
    pub fn new(requests: u32, period: Duration) -> Self {
        if requests == 0 || period.is_zero() {
            return Self::unlimited();
        }
        Self {
            state: Some(Arc::new(Mutex::new(RateLimitState::new(requests, period)))),
        }
    }

    /// Creates a rate limit layer from requests per second.
    pub fn per_second(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(1))
    }

    /// Creates a layer that forwards every request immediately.
    pub fn unlimited() -> Self {
        Self { state: None }
    }

    /// Creates a layer from an optional requests-per-second quota.
    pub fn from_quota(requests_per_second: Option<u32>) -> Self {
        requests_per_second.map_or_else(Self::unlimited, Self::per_second)
    }

    /// Whether this layer delays requests at all.
    pub fn is_limited(&self) -> bool {
        self.state.is_some()
    }
}

impl Default for RateLimitLayer {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService {
            service,
            state: self.state.clone(),
        }
    }
}

/// Internal state for the token bucket rate limiter.
#[derive(Debug)]
struct RateLimitState {
    /// Maximum number of tokens (requests) available
    capacity: u32,
    /// Current number of available tokens
    tokens: f64,
    /// Token replenishment rate (tokens per nanosecond)
    refill_rate: f64,
    /// Last time tokens were refilled
    last_refill: Instant,
}

impl RateLimitState {
    fn new(requests: u32, period: Duration) -> Self {
        let refill_rate = requests as f64 / period.as_nanos() as f64;
        Self {
            capacity: requests,
            tokens: requests as f64,
            refill_rate,
            last_refill: Instant::now(),
        }
    }

    /// Try to acquire a token, returning the wait time if not available.
    fn try_acquire(&mut self) -> Option<Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let needed = 1.0 - self.tokens;
            let wait_nanos = (needed / self.refill_rate).ceil();
            Some(Duration::from_nanos(wait_nanos as u64))
        }
    }

    /// Refill tokens based on elapsed time.
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = elapsed.as_nanos() as f64 * self.refill_rate;

        self.tokens = (self.tokens + new_tokens).min(self.capacity as f64);
        self.last_refill = now;
    }
}

/// A Tower service that applies rate limiting to requests.
#[derive(Clone, Debug)]
pub struct RateLimitService<S> {
    service: S,
    state: Option<Arc<Mutex<RateLimitState>>>,
}

impl<S, Request> tower::Service<Request> for RateLimitService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let state = self.state.clone();
        let mut service = self.service.clone();

        Box::pin(async move {
            if let Some(state) = state {
                loop {
                    let wait_time = {
                        let mut state = state.lock().await;
                        state.try_acquire()
                    };

                    match wait_time {
                        None => break,
                        Some(duration) => tokio::time::sleep(duration).await,
                    }
                }
            }

            service.call(request).await
        })
    }
}
