//! Device signature parsing and RPC re-encoding.
//!
//! All four signing paths converge on a raw `{v, r, s}` triple. Devices
//! report `v` in whatever convention the operation uses ({0,1}, {27,28}, or
//! EIP-155 `v >= 35`); the recovery parity is normalized here and message
//! signatures are re-encoded as the 65-byte RPC string `r ‖ s ‖ recovery_id`.

use alloy::primitives::{hex, U256};

use crate::error::DeviceError;

/// Length of both the device's signature response and the RPC signature.
pub const SIGNATURE_LEN: usize = 65;

/// Raw signature triple as produced by the signing device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSignature {
    /// Recovery value in the device's convention for the signed payload.
    pub v: u64,
    /// ECDSA `r` component.
    pub r: U256,
    /// ECDSA `s` component.
    pub s: U256,
}

impl DeviceSignature {
    pub fn new(v: u64, r: U256, s: U256) -> Self {
        Self { v, r, s }
    }

    /// Parse the device's 65-byte `v ‖ r ‖ s` response frame.
    ///
    /// A length mismatch is a fatal device-response error, not recoverable.
    pub fn from_device_bytes(data: &[u8]) -> Result<Self, DeviceError> {
        if data.len() != SIGNATURE_LEN {
            return Err(DeviceError::MalformedSignature(format!(
                "signature response is {} bytes, expected {}",
                data.len(),
                SIGNATURE_LEN
            )));
        }
        Ok(Self {
            v: u64::from(data[0]),
            r: U256::from_be_slice(&data[1..33]),
            s: U256::from_be_slice(&data[33..65]),
        })
    }

    /// Recovery parity of `v`, independent of the encoding convention.
    pub fn recovery_parity(&self) -> Result<bool, DeviceError> {
        match self.v {
            0 | 1 => Ok(self.v == 1),
            27 | 28 => Ok(self.v == 28),
            v if v >= 35 => Ok((v - 35) % 2 == 1),
            v => Err(DeviceError::MalformedSignature(format!(
                "unexpected recovery value {v}"
            ))),
        }
    }

    /// 65-byte RPC signature string `r ‖ s ‖ recovery_id`, with the recovery
    /// id normalized to the {0,1} convention. Used for message-signing
    /// responses; transaction signatures keep `v` chain-appropriate instead.
    pub fn to_rpc_hex(&self) -> Result<String, DeviceError> {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        out[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        out[64] = u8::from(self.recovery_parity()?);
        Ok(hex::encode_prefixed(out))
    }
}
