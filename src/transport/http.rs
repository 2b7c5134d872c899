// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP transport for the Etherscan-style `proxy` API.

use std::task::{Context, Poll};

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::trace;
use url::Url;

use super::ProxyRequest;
use crate::errors::ProviderError;

/// A Tower service issuing [`ProxyRequest`]s as HTTP GET requests
///
/// Responds with the `result` field of the response envelope, which may be
/// `null` (e.g. for a block that does not exist). Envelope-level failures are
/// mapped to [`ProviderError`] variants so the retry layer can classify them.
#[derive(Clone, Debug)]
pub struct EtherscanHttpService {
    client: reqwest::Client,
    api_url: Url,
    api_key: Option<String>,
    chain_id: Option<u64>,
}

impl EtherscanHttpService {
    /// Creates a new HTTP service.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Base URL of the API (e.g. `https://api.etherscan.io/api`)
    /// * `api_key` - API key sent as `apikey`, if any
    /// * `chain_id` - Chain selector sent as `chainid`, for multichain endpoints
    pub fn new(api_url: Url, api_key: Option<String>, chain_id: Option<u64>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key, chain_id)
    }

    /// Creates a new HTTP service on top of an existing `reqwest` client.
    pub fn with_client(
        client: reqwest::Client,
        api_url: Url,
        api_key: Option<String>,
        chain_id: Option<u64>,
    ) -> Self {
        Self {
            client,
            api_url,
            api_key,
            chain_id,
        }
    }

    /// Full query string for a request, including credentials.
    fn query(&self, request: &ProxyRequest) -> Vec<(&'static str, String)> {
        let mut query = request.query();
        if let Some(chain_id) = self.chain_id {
            query.push(("chainid", chain_id.to_string()));
        }
        if let Some(api_key) = &self.api_key {
            query.push(("apikey", api_key.clone()));
        }
        query
    }
}

impl tower::Service<ProxyRequest> for EtherscanHttpService {
    type Response = Value;
    type Error = ProviderError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: ProxyRequest) -> Self::Future {
        let client = self.client.clone();
        let api_url = self.api_url.clone();
        let query = self.query(&request);

        Box::pin(async move {
            let response = client
                .get(api_url)
                .query(&query)
                .send()
                .await
                .map_err(|e| ProviderError::network(request.to_string(), e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::http_status(status.as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| ProviderError::network(request.to_string(), e))?;

            trace!(request = %request, bytes = body.len(), "Received upstream response");

            decode_envelope(&body)
        })
    }
}

/// Extract the `result` of a `proxy` response envelope.
///
/// Handles both envelope styles the upstream uses:
///
/// - JSON-RPC passthrough: `{"jsonrpc":"2.0","id":1,"result":...}` or
///   `{"jsonrpc":"2.0","id":1,"error":{"code":..,"message":..}}`
/// - API-level failures: `{"status":"0","message":"NOTOK","result":"..."}`
///
/// # Examples
///
/// ```
/// use deltascan::transport::decode_envelope;
///
/// let result = decode_envelope(br#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#).unwrap();
/// assert_eq!(result, "0x10");
///
/// assert!(decode_envelope(br#"{"jsonrpc":"2.0","id":1}"#).is_err());
/// ```
pub fn decode_envelope(body: &[u8]) -> Result<Value, ProviderError> {
    let envelope: Value = serde_json::from_slice(body)
        .map_err(|e| ProviderError::malformed_response(format!("body is not JSON: {e}")))?;

    let Value::Object(mut fields) = envelope else {
        return Err(ProviderError::malformed_response(
            "response is not a JSON object",
        ));
    };

    if let Some(error) = fields.get("error").filter(|error| !error.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(ProviderError::rpc(code, message));
    }

    if fields.get("status").and_then(Value::as_str) == Some("0") {
        let message = fields
            .get("result")
            .and_then(Value::as_str)
            .or_else(|| fields.get("message").and_then(Value::as_str))
            .unwrap_or("NOTOK")
            .to_string();
        if message.to_ascii_lowercase().contains("rate limit") {
            return Err(ProviderError::rate_limited(message));
        }
        return Err(ProviderError::upstream(message));
    }

    fields.remove("result").ok_or_else(ProviderError::missing_result)
}
