// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Block data sources
//!
//! [`BlockSource`] is the seam between the fetch stage and the upstream API:
//! the fetcher only ever asks for the chain tip and for single blocks by
//! number. [`EtherscanClient`] implements it on top of any Tower service
//! speaking [`ProxyRequest`], which in production is the
//! [`EtherscanStack`] of logging, retry and rate limiting around the HTTP
//! transport.
//!
//! # Examples
//!
//! ```rust,no_run
//! use deltascan::{BlockSource, DeltascanConfig, EtherscanClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DeltascanConfig::builder().api_key("YOUR_KEY").build();
//! let client = EtherscanClient::from_config(&config);
//!
//! let tip = client.latest_block_number().await?;
//! let block = client.block_by_number(tip).await?;
//! println!("block {} has {} transactions", block.number, block.transactions.len());
//! # Ok(())
//! # }
//! ```

use alloy_primitives::BlockNumber;
use async_trait::async_trait;
use serde_json::Value;
use tower::{Layer, ServiceExt};

use crate::config::DeltascanConfig;
use crate::errors::ProviderError;
use crate::transport::{
    EtherscanHttpService, EtherscanStack, LoggingLayer, ProxyRequest, RateLimitLayer, RetryLayer,
};
use crate::types::block::{parse_hex_u64, Block, RawBlock};

/// Read access to the chain's blocks
///
/// Implementations must be shareable across fetch workers.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Number of the most recent block
    async fn latest_block_number(&self) -> Result<BlockNumber, ProviderError>;

    /// The block at `number` with full transaction objects
    ///
    /// A block the upstream does not know is [`ProviderError::BlockNotFound`].
    async fn block_by_number(&self, number: BlockNumber) -> Result<Block, ProviderError>;
}

/// [`BlockSource`] backed by an Etherscan-style `proxy` API
#[derive(Clone, Debug)]
pub struct EtherscanClient<S = EtherscanStack> {
    service: S,
}

impl<S> EtherscanClient<S> {
    /// Wraps an already assembled service.
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

impl EtherscanClient<EtherscanStack> {
    /// Builds the production middleware stack from configuration.
    ///
    /// Requests pass through logging, then retry, then rate limiting, so each
    /// retry attempt consumes its own rate-limit token.
    pub fn from_config(config: &DeltascanConfig) -> Self {
        let http = EtherscanHttpService::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.chain.map(|chain| chain.id()),
        );

        let service = LoggingLayer::new().layer(
            RetryLayer::from_config(config.retry.clone())
                .layer(RateLimitLayer::from_quota(config.rate_limit_per_second).layer(http)),
        );

        Self::new(service)
    }
}

impl<S> EtherscanClient<S>
where
    S: tower::Service<ProxyRequest, Response = Value, Error = ProviderError> + Clone + Send,
    S::Future: Send,
{
    async fn request(&self, request: ProxyRequest) -> Result<Value, ProviderError> {
        self.service.clone().oneshot(request).await
    }
}

#[async_trait]
impl<S> BlockSource for EtherscanClient<S>
where
    S: tower::Service<ProxyRequest, Response = Value, Error = ProviderError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
{
    async fn latest_block_number(&self) -> Result<BlockNumber, ProviderError> {
        let result = self.request(ProxyRequest::BlockNumber).await?;
        let hex = result.as_str().ok_or_else(|| {
            ProviderError::malformed_response(format!(
                "eth_blockNumber result is not a string: {result}"
            ))
        })?;
        parse_hex_u64("blockNumber", hex)
    }

    async fn block_by_number(&self, number: BlockNumber) -> Result<Block, ProviderError> {
        let result = self.request(ProxyRequest::BlockByNumber(number)).await?;
        decode_block(number, result)
    }
}

/// Decode an `eth_getBlockByNumber` result for the block at `requested`.
fn decode_block(requested: BlockNumber, result: Value) -> Result<Block, ProviderError> {
    if result.is_null() {
        return Err(ProviderError::block_not_found(requested));
    }

    let raw: RawBlock = serde_json::from_value(result)
        .map_err(|e| ProviderError::malformed_response(format!("invalid block object: {e}")))?;
    let block = Block::try_from(raw)?;

    if block.number != requested {
        return Err(ProviderError::malformed_response(format!(
            "requested block {requested} but received block {}",
            block.number
        )));
    }

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, U256};
    use serde_json::json;
    use std::task::{Context, Poll};

    /// Answers every request synchronously from a plain function.
    #[derive(Clone)]
    struct ScriptedService {
        respond: fn(ProxyRequest) -> Result<Value, ProviderError>,
    }

    impl tower::Service<ProxyRequest> for ScriptedService {
        type Response = Value;
        type Error = ProviderError;
        type Future = std::future::Ready<Result<Value, ProviderError>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, request: ProxyRequest) -> Self::Future {
            std::future::ready((self.respond)(request))
        }
    }

    fn client_with(
        respond: fn(ProxyRequest) -> Result<Value, ProviderError>,
    ) -> EtherscanClient<ScriptedService> {
        EtherscanClient::new(ScriptedService { respond })
    }

    #[tokio::test]
    async fn parses_latest_block_number() {
        let client = client_with(|_| Ok(json!("0x1312d00")));
        assert_eq!(client.latest_block_number().await.unwrap(), 20_000_000);
    }

    #[tokio::test]
    async fn non_hex_tip_is_malformed_not_zero() {
        let client = client_with(|_| Ok(json!("pending")));
        let err = client.latest_block_number().await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));

        let client = client_with(|_| Ok(json!(12)));
        let err = client.latest_block_number().await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn decodes_block_with_transactions() {
        let client = client_with(|request| {
            assert_eq!(request, ProxyRequest::BlockByNumber(0x10));
            Ok(json!({
                "number": "0x10",
                "hash": "0xabc",
                "transactions": [
                    {
                        "from": "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                        "to": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                        "value": "0xde0b6b3a7640000",
                        "gas": "0x5208"
                    },
                    {
                        "from": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                        "to": null,
                        "value": "0x0"
                    }
                ]
            }))
        });

        let block = client.block_by_number(0x10).await.unwrap();

        assert_eq!(block.number, 16);
        assert_eq!(block.transactions.len(), 2);
        let transfer = &block.transactions[0];
        assert_eq!(
            transfer.from,
            Some(address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"))
        );
        assert_eq!(transfer.value, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(block.transactions[1].to, None);
    }

    #[tokio::test]
    async fn null_block_is_not_found() {
        let client = client_with(|_| Ok(Value::Null));
        let err = client.block_by_number(99).await.unwrap_err();
        assert!(matches!(err, ProviderError::BlockNotFound { block_number: 99 }));
    }

    #[tokio::test]
    async fn mismatched_block_number_is_malformed() {
        let client = client_with(|_| Ok(json!({ "number": "0x11", "transactions": [] })));
        let err = client.block_by_number(0x10).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn invalid_address_fails_the_block() {
        let client = client_with(|_| {
            Ok(json!({
                "number": "0x1",
                "transactions": [{ "from": "0x1234", "to": null, "value": "0x1" }]
            }))
        });
        let err = client.block_by_number(1).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn upstream_errors_pass_through() {
        let client = client_with(|_| Err(ProviderError::http_status(502)));
        let err = client.block_by_number(1).await.unwrap_err();
        assert!(matches!(err, ProviderError::HttpStatus { status: 502 }));
    }

    #[tokio::test]
    async fn from_config_builds_without_network() {
        let config = DeltascanConfig::builder()
            .api_key("KEY")
            .rate_limit_per_second(5)
            .build();
        let _client = EtherscanClient::from_config(&config);
    }
}
