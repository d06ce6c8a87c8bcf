//! Shared mocks for the integration tests.
//!
//! `MockDevice` stands in for the hardware wallet, backed by a local private
//! key (Anvil's well-known first account) so signatures are real secp256k1
//! output and, thanks to RFC-6979 deterministic signing, byte-for-byte
//! comparable against locally computed expectations.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use alloy::dyn_abi::TypedData;
use alloy::primitives::{hex, keccak256, Address, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use async_trait::async_trait;
use serde_json::{json, Value};

use ledger_provider::{
    eip712, ConnectionError, DeviceConnector, DeviceError, DeviceSignature, LedgerProvider,
    ProviderError, ProviderResult, ResolutionMetadata, RpcProvider, SignerConfig, UpstreamError,
    WalletDevice,
};

/// Anvil's first well-known private key.
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const TEST_CHAIN_ID: u64 = 31337;

/// A signing device that behaves like real hardware: exclusive command
/// access is observable via `max_busy`, and structured EIP-712 support can
/// be switched off to exercise the hashed fallback.
pub struct MockDevice {
    signer: PrivateKeySigner,
    chain_id: u64,
    pub typed_data_supported: bool,
    pub resolution: Option<ResolutionMetadata>,
    busy: AtomicU32,
    pub max_busy: AtomicU32,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            signer: TEST_PRIVATE_KEY.parse().expect("valid test key"),
            chain_id: TEST_CHAIN_ID,
            typed_data_supported: true,
            resolution: None,
            busy: AtomicU32::new(0),
            max_busy: AtomicU32::new(0),
        }
    }

    pub fn without_typed_data_support() -> Self {
        Self {
            typed_data_supported: false,
            ..Self::new()
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Track command overlap; the session must keep this at one.
    async fn command_window(&self) {
        let now_busy = self.busy.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_busy.fetch_max(now_busy, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    fn command_done(&self) {
        self.busy.fetch_sub(1, Ordering::SeqCst);
    }

    fn message_signature(&self, hash: B256) -> Result<DeviceSignature, DeviceError> {
        let signature = self
            .signer
            .sign_hash_sync(&hash)
            .map_err(|error| DeviceError::SigningRejected(error.to_string()))?;
        Ok(DeviceSignature::new(
            27 + u64::from(signature.v()),
            signature.r(),
            signature.s(),
        ))
    }
}

#[async_trait]
impl WalletDevice for MockDevice {
    async fn derive_address(&self, _path: &str) -> Result<Address, DeviceError> {
        self.command_window().await;
        self.command_done();
        Ok(self.signer.address())
    }

    async fn sign_personal_message(
        &self,
        _path: &str,
        data: &[u8],
    ) -> Result<DeviceSignature, DeviceError> {
        self.command_window().await;
        let signature = self
            .signer
            .sign_message_sync(data)
            .map_err(|error| DeviceError::SigningRejected(error.to_string()));
        self.command_done();
        let signature = signature?;
        Ok(DeviceSignature::new(
            27 + u64::from(signature.v()),
            signature.r(),
            signature.s(),
        ))
    }

    async fn sign_typed_data(
        &self,
        _path: &str,
        typed_data: &TypedData,
    ) -> Result<DeviceSignature, DeviceError> {
        self.command_window().await;
        self.command_done();
        if !self.typed_data_supported {
            return Err(DeviceError::NotSupported(
                "firmware lacks structured EIP-712 signing".into(),
            ));
        }
        let hash = typed_data
            .eip712_signing_hash()
            .map_err(|error| DeviceError::SigningRejected(error.to_string()))?;
        self.message_signature(hash)
    }

    async fn sign_typed_data_hash(
        &self,
        _path: &str,
        domain_hash: B256,
        struct_hash: B256,
    ) -> Result<DeviceSignature, DeviceError> {
        self.command_window().await;
        self.command_done();
        self.message_signature(eip712::signing_hash(domain_hash, struct_hash))
    }

    async fn sign_transaction(
        &self,
        _path: &str,
        payload: &[u8],
        _resolution: Option<&ResolutionMetadata>,
    ) -> Result<DeviceSignature, DeviceError> {
        self.command_window().await;
        let result = (|| {
            let signature = self
                .signer
                .sign_hash_sync(&keccak256(payload))
                .map_err(|error| DeviceError::SigningRejected(error.to_string()))?;
            let parity = u64::from(signature.v());
            // Legacy payloads are bare RLP lists; typed payloads carry the
            // EIP-2718 type byte and use a {0,1} recovery value.
            let v = if payload.first().copied().unwrap_or_default() >= 0xc0 {
                self.chain_id * 2 + 35 + parity
            } else {
                parity
            };
            Ok(DeviceSignature::new(v, signature.r(), signature.s()))
        })();
        self.command_done();
        result
    }

    async fn resolve_transaction(
        &self,
        _payload: &[u8],
    ) -> Result<Option<ResolutionMetadata>, DeviceError> {
        Ok(self.resolution.clone())
    }
}

/// Connector with an open counter, optional failure, and an optional delay
/// to widen the race window in concurrency tests.
pub struct MockConnector {
    device: Arc<MockDevice>,
    pub opens: AtomicU32,
    pub fail: AtomicBool,
    pub connect_delay: Duration,
}

impl MockConnector {
    pub fn new(device: Arc<MockDevice>) -> Self {
        Self {
            device,
            opens: AtomicU32::new(0),
            fail: AtomicBool::new(false),
            connect_delay: Duration::ZERO,
        }
    }

    pub fn with_delay(device: Arc<MockDevice>, delay: Duration) -> Self {
        Self {
            connect_delay: delay,
            ..Self::new(device)
        }
    }

    pub fn open_count(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceConnector for MockConnector {
    async fn connect(
        &self,
        _config: &SignerConfig,
    ) -> Result<Arc<dyn WalletDevice>, ConnectionError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if !self.connect_delay.is_zero() {
            tokio::time::sleep(self.connect_delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ConnectionError::Transport {
                id: "NoDeviceFound".into(),
                message: "no ledger device attached".into(),
            });
        }
        Ok(self.device.clone())
    }
}

/// Scripted wrapped provider recording every call it receives.
pub struct MockUpstream {
    pub chain_id: u64,
    pub nonce: u64,
    pub calls: StdMutex<Vec<(String, Vec<Value>)>>,
    pub responses: StdMutex<HashMap<String, Value>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self {
            chain_id: TEST_CHAIN_ID,
            nonce: 7,
            calls: StdMutex::new(Vec::new()),
            responses: StdMutex::new(HashMap::new()),
        }
    }

    pub fn respond(&self, method: &str, response: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), response);
    }

    pub fn calls_for(&self, method: &str) -> Vec<Vec<Value>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

#[async_trait]
impl RpcProvider for MockUpstream {
    async fn request(&self, method: &str, params: Vec<Value>) -> ProviderResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        if let Some(response) = self.responses.lock().unwrap().get(method) {
            return Ok(response.clone());
        }

        match method {
            "eth_chainId" => Ok(json!(format!("0x{:x}", self.chain_id))),
            "eth_getTransactionCount" => Ok(json!(format!("0x{:x}", self.nonce))),
            "eth_sendRawTransaction" => {
                let raw = params[0].as_str().expect("raw tx is a hex string");
                let bytes = hex::decode(raw).expect("raw tx decodes");
                Ok(json!(format!("0x{}", hex::encode(keccak256(bytes)))))
            }
            "eth_uncooperative" => Err(ProviderError::Upstream(UpstreamError::Rpc {
                code: -32000,
                message: "execution reverted".into(),
                data: Some(json!("0x08c379a0")),
            })),
            other => Err(ProviderError::Upstream(UpstreamError::Transport(format!(
                "unscripted method {other}"
            )))),
        }
    }
}

/// Assemble a middleware over fresh mocks.
pub struct Harness {
    pub provider: Arc<LedgerProvider>,
    pub device: Arc<MockDevice>,
    pub connector: Arc<MockConnector>,
    pub upstream: Arc<MockUpstream>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(SignerConfig::default(), MockDevice::new(), Duration::ZERO)
    }

    pub fn sign_only() -> Self {
        let config = SignerConfig {
            broadcast: false,
            ..SignerConfig::default()
        };
        Self::build(config, MockDevice::new(), Duration::ZERO)
    }

    pub fn without_typed_data_support() -> Self {
        Self::build(
            SignerConfig::default(),
            MockDevice::without_typed_data_support(),
            Duration::ZERO,
        )
    }

    pub fn with_connect_delay(delay: Duration) -> Self {
        Self::build(SignerConfig::default(), MockDevice::new(), delay)
    }

    fn build(config: SignerConfig, device: MockDevice, delay: Duration) -> Self {
        let device = Arc::new(device);
        let connector = Arc::new(MockConnector::with_delay(device.clone(), delay));
        let upstream = Arc::new(MockUpstream::new());
        let provider = Arc::new(LedgerProvider::new(
            config,
            upstream.clone(),
            connector.clone(),
        ));
        Self {
            provider,
            device,
            connector,
            upstream,
        }
    }
}
