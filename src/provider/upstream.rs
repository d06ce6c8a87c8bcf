//! Wrapped-provider interface and the HTTP adapter.
//!
//! The middleware consumes and exposes the same request shape, making it
//! substitutable anywhere a plain provider is expected. [`HttpProvider`] is
//! the usual upstream: a plain HTTP JSON-RPC endpoint. Its JSON-RPC error
//! objects are preserved verbatim in [`UpstreamError::Rpc`].

use std::borrow::Cow;
use std::sync::Arc;

use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::{RpcError, TransportError};
use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ProviderError, ProviderResult, UpstreamError};

/// One JSON-RPC request surface. Implemented by upstream providers and by
/// the middleware itself.
#[async_trait]
pub trait RpcProvider: Send + Sync {
    /// Execute a single JSON-RPC request.
    async fn request(&self, method: &str, params: Vec<Value>) -> ProviderResult<Value>;
}

/// HTTP JSON-RPC provider backed by the alloy client.
#[derive(Clone)]
pub struct HttpProvider {
    provider: Arc<dyn Provider + Send + Sync>,
    endpoint: String,
}

impl HttpProvider {
    /// Connect to an HTTP JSON-RPC endpoint.
    pub fn connect(endpoint: &str) -> Result<Self, UpstreamError> {
        let url: url::Url = endpoint.parse().map_err(|error| {
            UpstreamError::Transport(format!("invalid RPC URL '{endpoint}': {error}"))
        })?;
        Ok(Self {
            provider: Arc::new(ProviderBuilder::new().connect_http(url)),
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl RpcProvider for HttpProvider {
    async fn request(&self, method: &str, params: Vec<Value>) -> ProviderResult<Value> {
        let raw_params = serde_json::value::to_raw_value(&params)
            .map_err(|error| UpstreamError::InvalidResponse(error.to_string()))?;

        let result = self
            .provider
            .raw_request_dyn(Cow::Owned(method.to_owned()), &raw_params)
            .await
            .map_err(map_transport_error)?;

        serde_json::from_str(result.get()).map_err(|error| {
            UpstreamError::InvalidResponse(format!("invalid JSON result: {error}")).into()
        })
    }
}

/// Map an alloy transport error, keeping JSON-RPC error responses verbatim.
fn map_transport_error(error: TransportError) -> ProviderError {
    match error {
        RpcError::ErrorResp(payload) => UpstreamError::Rpc {
            code: payload.code,
            message: payload.message.to_string(),
            data: payload
                .data
                .and_then(|data| serde_json::from_str(data.get()).ok()),
        }
        .into(),
        other => UpstreamError::Transport(other.to_string()).into(),
    }
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
