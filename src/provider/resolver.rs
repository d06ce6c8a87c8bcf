//! Nonce and chain-id resolution against the wrapped provider.
//!
//! The chain id is fetched once and cached for the middleware's lifetime;
//! the pending nonce is fetched per request, and only when the caller
//! omitted it.

use std::sync::Arc;

use alloy::primitives::Address;
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use crate::error::{ProviderResult, UpstreamError};
use crate::provider::upstream::RpcProvider;

/// On-demand chain state lookups for transaction assembly.
pub struct ChainResolver {
    provider: Arc<dyn RpcProvider>,
    chain_id: OnceCell<u64>,
}

impl ChainResolver {
    pub fn new(provider: Arc<dyn RpcProvider>) -> Self {
        Self {
            provider,
            chain_id: OnceCell::new(),
        }
    }

    /// Chain id of the wrapped provider's network, cached after first fetch.
    pub async fn chain_id(&self) -> ProviderResult<u64> {
        self.chain_id
            .get_or_try_init(|| async {
                let raw = self.provider.request("eth_chainId", Vec::new()).await?;
                let chain_id = parse_quantity(&raw)?;
                tracing::debug!(chain_id, "resolved chain id from wrapped provider");
                Ok(chain_id)
            })
            .await
            .copied()
    }

    /// Pending-state transaction count for `address`, i.e. the next nonce.
    pub async fn pending_nonce(&self, address: Address) -> ProviderResult<u64> {
        let raw = self
            .provider
            .request(
                "eth_getTransactionCount",
                vec![json!(address), json!("pending")],
            )
            .await?;
        parse_quantity(&raw)
    }
}

impl std::fmt::Debug for ChainResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainResolver")
            .field("chain_id", &self.chain_id.get())
            .finish()
    }
}

/// Parse a JSON-RPC quantity (`0x`-prefixed hex string) into a u64.
fn parse_quantity(value: &Value) -> ProviderResult<u64> {
    let text = value.as_str().ok_or_else(|| {
        UpstreamError::InvalidResponse(format!("expected a hex quantity, got {value}"))
    })?;
    let digits = text.strip_prefix("0x").ok_or_else(|| {
        UpstreamError::InvalidResponse(format!("quantity '{text}' lacks the 0x prefix"))
    })?;
    u64::from_str_radix(digits, 16).map_err(|error| {
        UpstreamError::InvalidResponse(format!("invalid quantity '{text}': {error}")).into()
    })
}
