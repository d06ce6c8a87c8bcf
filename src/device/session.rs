//! Device session lifecycle and command serialization.
//!
//! # Responsibilities
//! - Open the device transport lazily, on first use, exactly once at a time
//! - Serialize every device command: the transport is exclusive and
//!   non-reentrant, overlapping commands would corrupt its framing
//! - Track the `Uninitialized -> Connecting -> Ready | Failed` lifecycle
//!
//! # Design Decisions
//! - One async mutex guards both connection attempts and device commands, so
//!   concurrent first-use callers collapse into a single attempt and queued
//!   signing requests run strictly one at a time
//! - A caller queued behind an in-flight attempt adopts that attempt's
//!   outcome; a caller that observed an already-completed failure starts a
//!   fresh attempt instead (no automatic retry inside the session)

use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use alloy::dyn_abi::TypedData;
use alloy::primitives::{Address, B256};
use tokio::sync::Mutex as AsyncMutex;

use crate::config::SignerConfig;
use crate::device::{DeviceConnector, DeviceSignature, WalletDevice};
use crate::error::{ConnectionError, ProviderResult};

/// Observable lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection attempt has been made yet.
    Uninitialized,
    /// A connection attempt is in flight.
    Connecting,
    /// The device is connected and accepting commands.
    Ready,
    /// The last connection attempt failed; the next caller re-attempts.
    Failed,
}

enum State {
    Uninitialized,
    Connecting { attempt: u64 },
    Ready(Arc<dyn WalletDevice>),
    Failed { attempt: u64, error: ConnectionError },
}

struct Inner {
    state: State,
    attempts: u64,
}

/// Owner of the exclusive device connection for one [`SignerConfig`].
pub struct DeviceSession {
    config: SignerConfig,
    connector: Arc<dyn DeviceConnector>,
    inner: StdMutex<Inner>,
    /// Serializes connection attempts and every device command.
    io_lock: AsyncMutex<()>,
}

impl DeviceSession {
    pub fn new(config: SignerConfig, connector: Arc<dyn DeviceConnector>) -> Self {
        Self {
            config,
            connector,
            inner: StdMutex::new(Inner {
                state: State::Uninitialized,
                attempts: 0,
            }),
            io_lock: AsyncMutex::new(()),
        }
    }

    /// Current lifecycle state snapshot.
    pub fn state(&self) -> SessionState {
        match self.inner().state {
            State::Uninitialized => SessionState::Uninitialized,
            State::Connecting { .. } => SessionState::Connecting,
            State::Ready(_) => SessionState::Ready,
            State::Failed { .. } => SessionState::Failed,
        }
    }

    /// Establish the device connection if it is not already up.
    ///
    /// Lazy initialization is implicit on first use; this is public so hosts
    /// that prefer fail-fast startup can connect eagerly.
    pub async fn ensure_ready(&self) -> Result<(), ConnectionError> {
        let floor = self.adopt_floor();
        let _io = self.io_lock.lock().await;
        self.device_locked(floor).await.map(|_| ())
    }

    /// Derived address for the configured path.
    pub async fn derive_address(&self) -> ProviderResult<Address> {
        let floor = self.adopt_floor();
        let _io = self.io_lock.lock().await;
        let device = self.device_locked(floor).await?;
        Ok(device.derive_address(&self.config.derivation_path).await?)
    }

    /// Sign an EIP-191 personal message.
    pub async fn sign_personal_message(&self, data: &[u8]) -> ProviderResult<DeviceSignature> {
        let floor = self.adopt_floor();
        let _io = self.io_lock.lock().await;
        let device = self.device_locked(floor).await?;
        Ok(device
            .sign_personal_message(&self.config.derivation_path, data)
            .await?)
    }

    /// Sign a full EIP-712 structure on the device.
    pub async fn sign_typed_data(&self, typed_data: &TypedData) -> ProviderResult<DeviceSignature> {
        let floor = self.adopt_floor();
        let _io = self.io_lock.lock().await;
        let device = self.device_locked(floor).await?;
        Ok(device
            .sign_typed_data(&self.config.derivation_path, typed_data)
            .await?)
    }

    /// Sign a pre-hashed EIP-712 message (the fallback path).
    pub async fn sign_typed_data_hash(
        &self,
        domain_hash: B256,
        struct_hash: B256,
    ) -> ProviderResult<DeviceSignature> {
        let floor = self.adopt_floor();
        let _io = self.io_lock.lock().await;
        let device = self.device_locked(floor).await?;
        Ok(device
            .sign_typed_data_hash(&self.config.derivation_path, domain_hash, struct_hash)
            .await?)
    }

    /// Sign a serialized unsigned transaction, enriching the confirmation
    /// screen with resolution metadata when the device can provide it.
    pub async fn sign_transaction(&self, payload: &[u8]) -> ProviderResult<DeviceSignature> {
        let floor = self.adopt_floor();
        let _io = self.io_lock.lock().await;
        let device = self.device_locked(floor).await?;

        // Best-effort enrichment: absence never blocks signing.
        let resolution = match device.resolve_transaction(payload).await {
            Ok(resolution) => resolution,
            Err(error) => {
                tracing::debug!(%error, "transaction resolution unavailable, signing without display metadata");
                None
            }
        };

        Ok(device
            .sign_transaction(&self.config.derivation_path, payload, resolution.as_ref())
            .await?)
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lowest attempt number whose failure this caller must adopt instead of
    /// retrying. Read before queuing on `io_lock`: a caller that saw attempt
    /// N in flight adopts N's failure, while a caller that saw attempt N
    /// already failed retries with attempt N+1.
    fn adopt_floor(&self) -> u64 {
        match &self.inner().state {
            State::Connecting { attempt } => *attempt,
            State::Failed { attempt, .. } => attempt + 1,
            State::Uninitialized | State::Ready(_) => 0,
        }
    }

    /// Resolve the connected device, opening the transport if needed.
    /// Must be called with `io_lock` held.
    async fn device_locked(
        &self,
        adopt_floor: u64,
    ) -> Result<Arc<dyn WalletDevice>, ConnectionError> {
        let attempt = {
            let mut inner = self.inner();
            match &inner.state {
                State::Ready(device) => return Ok(device.clone()),
                State::Failed { attempt, error } if *attempt >= adopt_floor => {
                    return Err(error.clone())
                }
                _ => {
                    inner.attempts += 1;
                    let attempt = inner.attempts;
                    inner.state = State::Connecting { attempt };
                    attempt
                }
            }
        };

        tracing::info!(
            attempt,
            open_timeout_ms = self.config.open_timeout_ms,
            connection_timeout_ms = self.config.connection_timeout_ms,
            "opening device transport"
        );

        match self.connector.connect(&self.config).await {
            Ok(device) => {
                tracing::info!(attempt, "device transport ready");
                self.inner().state = State::Ready(device.clone());
                Ok(device)
            }
            Err(error) => {
                tracing::warn!(attempt, %error, "device connection failed");
                self.inner().state = State::Failed {
                    attempt,
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("derivation_path", &self.config.derivation_path)
            .field("state", &self.state())
            .finish()
    }
}
