//! The request router: a provider middleware that redirects wallet methods
//! to the hardware signing device.
//!
//! # Responsibilities
//! - Classify each incoming request exactly once
//! - Drive validation, assembly/hashing, device signing, and reassembly
//! - Forward everything unrecognized to the wrapped provider verbatim
//!
//! Data flow for a wallet method: validate params -> build the canonical
//! payload (resolving nonce/chain id as needed) -> sign on the device ->
//! reassemble the RPC-format result. Every accepted request resolves to
//! exactly one success or one typed failure.

pub mod resolver;
pub mod upstream;

pub use upstream::{HttpProvider, RpcProvider};

use std::sync::Arc;

use alloy::primitives::{hex, Signature};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::SignerConfig;
use crate::device::{DeviceConnector, DeviceSession};
use crate::eip712;
use crate::error::{DeviceError, ProviderError, ProviderResult};
use crate::rpc::method::Method;
use crate::rpc::validation;
use crate::transaction;
use resolver::ChainResolver;

/// Hardware-backed signing middleware around a wrapped provider.
///
/// Construction is cheap: the device connection is established lazily on the
/// first wallet-method request (call
/// [`DeviceSession::ensure_ready`](crate::device::DeviceSession::ensure_ready)
/// through [`LedgerProvider::session`] for fail-fast startup instead).
pub struct LedgerProvider {
    config: SignerConfig,
    wrapped: Arc<dyn RpcProvider>,
    session: DeviceSession,
    resolver: ChainResolver,
}

impl LedgerProvider {
    pub fn new(
        config: SignerConfig,
        wrapped: Arc<dyn RpcProvider>,
        connector: Arc<dyn DeviceConnector>,
    ) -> Self {
        let session = DeviceSession::new(config.clone(), connector);
        let resolver = ChainResolver::new(wrapped.clone());
        tracing::info!(
            derivation_path = %config.derivation_path,
            broadcast = config.broadcast,
            "ledger provider initialized"
        );
        Self {
            config,
            wrapped,
            session,
            resolver,
        }
    }

    /// The device session, for explicit initialization or state inspection.
    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    async fn handle_accounts(&self) -> ProviderResult<Value> {
        let address = self.session.derive_address().await?;
        Ok(json!([address]))
    }

    async fn handle_message_sign(&self, method: &Method, params: &[Value]) -> ProviderResult<Value> {
        let validated = validation::message_sign_params(method, params)?;
        tracing::debug!(
            method = method.name(),
            address = %validated.address,
            data_len = validated.data.len(),
            "signing message on device"
        );
        let signature = self.session.sign_personal_message(&validated.data).await?;
        Ok(Value::String(signature.to_rpc_hex()?))
    }

    async fn handle_typed_data(&self, params: &[Value]) -> ProviderResult<Value> {
        let validated = validation::typed_data_params(params)?;
        tracing::debug!(
            address = %validated.address,
            primary_type = %validated.typed_data.primary_type,
            "signing typed data on device"
        );

        // Primary path: the device hashes the structure internally. Firmware
        // without structured support reports NotSupported, which selects the
        // hashed fallback; any other device error is terminal.
        let signature = match self.session.sign_typed_data(&validated.typed_data).await {
            Ok(signature) => signature,
            Err(ProviderError::Device(DeviceError::NotSupported(reason))) => {
                tracing::debug!(
                    %reason,
                    "device lacks structured EIP-712 support, signing hashed pair"
                );
                let domain_hash = eip712::domain_hash(&validated.typed_data);
                let struct_hash = eip712::struct_hash(&validated.typed_data)?;
                self.session
                    .sign_typed_data_hash(domain_hash, struct_hash)
                    .await?
            }
            Err(error) => return Err(error),
        };

        Ok(Value::String(signature.to_rpc_hex()?))
    }

    async fn handle_send_transaction(&self, params: &[Value]) -> ProviderResult<Value> {
        let request = validation::transaction_params(params)?;
        let prepared = transaction::prepare(request, &self.resolver).await?;
        tracing::debug!(
            from = %prepared.from,
            chain_id = prepared.chain_id(),
            legacy = prepared.is_legacy(),
            "signing transaction on device"
        );

        let payload = prepared.signing_payload();
        let device_signature = self.session.sign_transaction(&payload).await?;
        let signature = Signature::new(
            device_signature.r,
            device_signature.s,
            device_signature.recovery_parity()?,
        );
        let raw = hex::encode_prefixed(prepared.into_signed_raw(signature));

        if self.config.broadcast {
            self.wrapped
                .request("eth_sendRawTransaction", vec![Value::String(raw)])
                .await
        } else {
            Ok(Value::String(raw))
        }
    }
}

#[async_trait]
impl RpcProvider for LedgerProvider {
    async fn request(&self, method: &str, params: Vec<Value>) -> ProviderResult<Value> {
        let classified = Method::classify(method);
        match &classified {
            Method::Accounts => self.handle_accounts().await,
            Method::PersonalSign | Method::LegacySign => {
                self.handle_message_sign(&classified, &params).await
            }
            Method::TypedDataV4 => self.handle_typed_data(&params).await,
            Method::SendTransaction => self.handle_send_transaction(&params).await,
            // Passthrough: request and response travel unmodified.
            Method::Other(_) => self.wrapped.request(method, params).await,
        }
    }
}

impl std::fmt::Debug for LedgerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerProvider")
            .field("derivation_path", &self.config.derivation_path)
            .field("broadcast", &self.config.broadcast)
            .field("session", &self.session)
            .finish()
    }
}
