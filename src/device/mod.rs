//! Hardware signing device interface.
//!
//! The middleware never talks to USB/HID itself: it consumes two trait seams.
//! A [`DeviceConnector`] opens the transport once and yields a
//! [`WalletDevice`], the capability surface the signing paths use. The
//! [`session::DeviceSession`] owns the connector and enforces the exclusive,
//! non-reentrant access the transport requires.

pub mod session;
pub mod signature;

pub use session::{DeviceSession, SessionState};
pub use signature::DeviceSignature;

use std::sync::Arc;

use alloy::dyn_abi::TypedData;
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SignerConfig;
use crate::error::{ConnectionError, DeviceError};

/// Display metadata the device can use to render a human-readable
/// confirmation before the user approves a transaction. Purely an
/// enrichment: signing proceeds without it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionMetadata {
    /// Name of the contract being called, when known.
    pub contract_name: Option<String>,
    /// Decoded method name, when the calldata selector is known.
    pub method_name: Option<String>,
    /// Token tickers involved in the call, for value display.
    pub tokens: Vec<String>,
}

/// Signing capabilities of a connected hardware device.
///
/// Every method takes the BIP-32 derivation path selecting the key. The
/// device returns raw `{v, r, s}` triples; wire-format reassembly is the
/// middleware's job.
#[async_trait]
pub trait WalletDevice: Send + Sync {
    /// Ethereum address for the key at `path`.
    async fn derive_address(&self, path: &str) -> Result<Address, DeviceError>;

    /// Sign `data` as an EIP-191 personal message (the device applies the
    /// `\x19Ethereum Signed Message:\n` prefix itself).
    async fn sign_personal_message(
        &self,
        path: &str,
        data: &[u8],
    ) -> Result<DeviceSignature, DeviceError>;

    /// Sign a full EIP-712 structure; the device hashes domain and message
    /// internally. Firmware without structured support must return
    /// [`DeviceError::NotSupported`] so the caller can fall back to
    /// [`WalletDevice::sign_typed_data_hash`].
    async fn sign_typed_data(
        &self,
        path: &str,
        typed_data: &TypedData,
    ) -> Result<DeviceSignature, DeviceError>;

    /// Sign a pre-hashed EIP-712 message from its domain-separator hash and
    /// primary-type struct hash.
    async fn sign_typed_data_hash(
        &self,
        path: &str,
        domain_hash: B256,
        struct_hash: B256,
    ) -> Result<DeviceSignature, DeviceError>;

    /// Sign a serialized unsigned transaction. `resolution` carries optional
    /// display metadata for the device screen.
    async fn sign_transaction(
        &self,
        path: &str,
        payload: &[u8],
        resolution: Option<&ResolutionMetadata>,
    ) -> Result<DeviceSignature, DeviceError>;

    /// Decode display metadata for a transaction payload. `Ok(None)` when
    /// the device or its companion service has nothing to offer.
    async fn resolve_transaction(
        &self,
        _payload: &[u8],
    ) -> Result<Option<ResolutionMetadata>, DeviceError> {
        Ok(None)
    }
}

/// Opens the hardware transport and binds the wallet application to it.
#[async_trait]
pub trait DeviceConnector: Send + Sync {
    /// Open the transport using the configured timeouts. Called lazily by the
    /// session on first use, and again after a failed attempt.
    async fn connect(&self, config: &SignerConfig) -> Result<Arc<dyn WalletDevice>, ConnectionError>;
}
