//! EIP-712 typed-data hashing.
//!
//! The primary signing path hands the whole structure to the device, which
//! hashes internally. Devices without structured support fall back to
//! signing the `(domain hash, struct hash)` pair computed here; both paths
//! produce the same signature for the same logical message.

use alloy::dyn_abi::TypedData;
use alloy::primitives::{keccak256, B256};

use crate::error::ValidationError;

/// Reserved type name used for domain hashing only; it is never a valid
/// primary type for the user struct hash.
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// Domain-separator hash for the typed data's domain.
pub fn domain_hash(typed_data: &TypedData) -> B256 {
    typed_data.domain.hash_struct()
}

/// Struct hash of the primary type over the user-defined type set.
pub fn struct_hash(typed_data: &TypedData) -> Result<B256, ValidationError> {
    if typed_data.primary_type == DOMAIN_TYPE {
        return Err(ValidationError::InvalidTypedData(format!(
            "{DOMAIN_TYPE} is reserved for domain hashing and cannot be the primary type"
        )));
    }
    typed_data
        .hash_struct()
        .map_err(|error| ValidationError::InvalidTypedData(error.to_string()))
}

/// Final EIP-712 signing hash: `keccak256(0x19 ‖ 0x01 ‖ domainHash ‖ structHash)`.
pub fn signing_hash(domain_hash: B256, struct_hash: B256) -> B256 {
    let mut buf = [0u8; 66];
    buf[0] = 0x19;
    buf[1] = 0x01;
    buf[2..34].copy_from_slice(domain_hash.as_slice());
    buf[34..66].copy_from_slice(struct_hash.as_slice());
    keccak256(buf)
}
