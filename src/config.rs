//! Middleware configuration.
//!
//! One [`SignerConfig`] describes one logical signer: which BIP-32 key the
//! device should use and how long to wait for the transport. It is created at
//! middleware construction and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default BIP-32 derivation path for Ethereum accounts.
pub const DEFAULT_DERIVATION_PATH: &str = "44'/60'/0'/0";

/// Default device open/connection timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Immutable configuration for one hardware-backed signer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignerConfig {
    /// BIP-32 derivation path identifying the signing key on the device.
    pub derivation_path: String,

    /// Timeout for opening the device transport, in milliseconds.
    pub open_timeout_ms: u64,

    /// Timeout for listening to connection events, in milliseconds.
    pub connection_timeout_ms: u64,

    /// Whether a signed `eth_sendTransaction` is forwarded to the wrapped
    /// provider as `eth_sendRawTransaction`. When disabled the raw signed
    /// transaction hex is returned instead and the chain is never touched.
    pub broadcast: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            derivation_path: DEFAULT_DERIVATION_PATH.to_string(),
            open_timeout_ms: DEFAULT_TIMEOUT_MS,
            connection_timeout_ms: DEFAULT_TIMEOUT_MS,
            broadcast: true,
        }
    }
}

impl SignerConfig {
    /// Device transport open timeout.
    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    /// Device connection-events timeout.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }
}
