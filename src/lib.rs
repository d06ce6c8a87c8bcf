//! Hardware-backed signing middleware for Ethereum JSON-RPC providers.
//!
//! [`LedgerProvider`] wraps any provider and intercepts the wallet-sensitive
//! methods (`eth_accounts`, `eth_requestAccounts`, `personal_sign`,
//! `eth_sign`, `eth_signTypedData_v4`, `eth_sendTransaction`), servicing
//! them through a hardware signing device instead of forwarding them. All
//! other methods pass through to the wrapped provider unchanged.
//!
//! The hardware transport itself lives behind the [`DeviceConnector`] /
//! [`WalletDevice`] trait seams; the crate manages the lazy, exclusive
//! device session, parameter validation, transaction serialization, EIP-712
//! hashing (with the hashed fallback for older firmware), and signature
//! reassembly into RPC wire formats.

pub mod config;
pub mod device;
pub mod eip712;
pub mod error;
pub mod observability;
pub mod provider;
pub mod rpc;
pub mod transaction;

pub use config::SignerConfig;
pub use device::{
    DeviceConnector, DeviceSession, DeviceSignature, ResolutionMetadata, SessionState, WalletDevice,
};
pub use error::{
    ConnectionError, DeviceError, ProviderError, ProviderResult, TransactionFieldError,
    UpstreamError, ValidationError,
};
pub use provider::{HttpProvider, LedgerProvider, RpcProvider};
pub use rpc::Method;
