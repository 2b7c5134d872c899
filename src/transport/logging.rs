// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based logging layer for upstream requests.
//!
//! This module implements a logging layer that uses `tracing` to record
//! request/response information for debugging and observability.

use std::{
    fmt,
    task::{Context, Poll},
    time::Instant,
};

use futures::future::BoxFuture;
use tower::Layer;
use tracing::{debug, trace, warn, Instrument};

/// A Tower layer that adds logging/tracing to upstream requests.
///
/// This layer wraps each request in a tracing span and logs
/// timing information, request details, and any errors that occur.
/// Requests are identified by their `Display` form, e.g.
/// `eth_getBlockByNumber(0x10)`.
///
/// # Example
///
/// ```rust
/// use deltascan::transport::LoggingLayer;
///
/// let quiet = LoggingLayer::new();
/// let chatty = LoggingLayer::new().with_response_logging();
/// ```
#[derive(Clone, Debug, Default)]
pub struct LoggingLayer {
    /// Whether to log response payloads (can be verbose)
    log_responses: bool,
}

impl LoggingLayer {
    /// Creates a new logging layer with default settings.
    ///
    /// By default, only timing and errors are logged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables logging of response payloads at `TRACE`.
    ///
    /// Warning: full blocks with transactions are large.
    pub fn with_response_logging(mut self) -> Self {
        self.log_responses = true;
        self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        LoggingService {
            service,
            log_responses: self.log_responses,
        }
    }
}

/// A Tower service that logs requests and responses.
#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    service: S,
    log_responses: bool,
}

impl<S, Request> tower::Service<Request> for LoggingService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    S::Response: fmt::Debug + Send,
    S::Error: fmt::Display,
    Request: fmt::Display + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let log_responses = self.log_responses;
        let mut service = self.service.clone();
        let method = request.to_string();

        let span = tracing::debug_span!(
            "upstream_call",
            method = %method,
            duration_ms = tracing::field::Empty,
        );

        Box::pin(
            async move {
                let start = Instant::now();
                debug!("Upstream request: {method}");

                let result = service.call(request).await;
                let duration = start.elapsed();

                tracing::Span::current().record("duration_ms", duration.as_millis() as u64);

                match &result {
                    Ok(response) => {
                        if log_responses {
                            trace!(
                                response = ?response,
                                duration_ms = %duration.as_millis(),
                                "Upstream response"
                            );
                        } else {
                            debug!(
                                duration_ms = %duration.as_millis(),
                                "Upstream response: {method}"
                            );
                        }
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            duration_ms = %duration.as_millis(),
                            "Upstream error: {method}"
                        );
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
