//! Parameter validation for the intercepted RPC methods.
//!
//! # Responsibilities
//! - Check parameter arity and types against each method's fixed schema
//! - Preserve the `eth_sign` / `personal_sign` parameter-order inversion
//! - Accept typed data as either a JSON object or a JSON-encoded string
//!
//! All validation happens before any device interaction, so malformed input
//! never costs a device round-trip.

use alloy::dyn_abi::TypedData;
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use serde_json::Value;

use crate::error::ValidationError;
use crate::rpc::method::Method;

/// Validated parameters for `personal_sign` / `eth_sign`.
#[derive(Debug, Clone)]
pub struct MessageSignParams {
    /// Raw bytes to sign (the device applies the EIP-191 prefix).
    pub data: Bytes,
    /// Account expected to produce the signature.
    pub address: Address,
}

/// Validated parameters for `eth_signTypedData_v4`.
#[derive(Debug, Clone)]
pub struct TypedDataParams {
    /// Account expected to produce the signature.
    pub address: Address,
    /// Parsed EIP-712 payload.
    pub typed_data: TypedData,
}

/// Validate `personal_sign` (`[data, address]`) or `eth_sign`
/// (`[address, data]`) parameters.
///
/// The swapped order for `eth_sign` is a legacy RPC quirk and is preserved
/// exactly: both methods extract the same fields, from inverted positions.
pub fn message_sign_params(
    method: &Method,
    params: &[Value],
) -> Result<MessageSignParams, ValidationError> {
    let (data_idx, address_idx) = match method {
        Method::PersonalSign => (0, 1),
        Method::LegacySign => (1, 0),
        other => {
            return Err(ValidationError::InvalidParams {
                method: other.name().to_string(),
                reason: "not a message-signing method".to_string(),
            })
        }
    };

    let data = match non_null(params, data_idx) {
        Some(value) => parse_bytes(method.name(), value)?,
        None => {
            return Err(ValidationError::MissingData {
                method: method.name().to_string(),
            })
        }
    };

    let address = match non_null(params, address_idx) {
        Some(value) => parse_address(method.name(), value)?,
        None => {
            return Err(ValidationError::MissingAddress {
                method: method.name().to_string(),
            })
        }
    };

    Ok(MessageSignParams { data, address })
}

/// Validate `eth_signTypedData_v4` parameters: `[address, typedData]` where
/// the typed data may be a structured object or a JSON-encoded string.
pub fn typed_data_params(params: &[Value]) -> Result<TypedDataParams, ValidationError> {
    const METHOD: &str = "eth_signTypedData_v4";

    let address = match non_null(params, 0) {
        Some(value) => parse_address(METHOD, value)?,
        None => {
            return Err(ValidationError::MissingAddress {
                method: METHOD.to_string(),
            })
        }
    };

    let raw = non_null(params, 1).ok_or_else(|| ValidationError::MissingData {
        method: METHOD.to_string(),
    })?;

    let parsed: Value = match raw {
        Value::String(text) => {
            serde_json::from_str(text).map_err(|_| ValidationError::InvalidTypedDataJson)?
        }
        other => other.clone(),
    };

    let typed_data: TypedData = serde_json::from_value(parsed)
        .map_err(|error| ValidationError::InvalidTypedData(error.to_string()))?;

    Ok(TypedDataParams {
        address,
        typed_data,
    })
}

/// Validate `eth_sendTransaction` parameters: `[transactionRequest]`.
///
/// Field-level preconditions (gas, from, fee model) are the assembler's job;
/// this only checks the request object's shape.
pub fn transaction_params(params: &[Value]) -> Result<TransactionRequest, ValidationError> {
    const METHOD: &str = "eth_sendTransaction";

    let raw = non_null(params, 0).ok_or_else(|| ValidationError::InvalidParams {
        method: METHOD.to_string(),
        reason: "expected a single transaction object".to_string(),
    })?;

    serde_json::from_value(raw.clone()).map_err(|error| ValidationError::InvalidParams {
        method: METHOD.to_string(),
        reason: error.to_string(),
    })
}

fn non_null(params: &[Value], index: usize) -> Option<&Value> {
    params.get(index).filter(|value| !value.is_null())
}

fn parse_bytes(method: &str, value: &Value) -> Result<Bytes, ValidationError> {
    value
        .as_str()
        .and_then(|text| text.parse::<Bytes>().ok())
        .ok_or_else(|| ValidationError::InvalidParams {
            method: method.to_string(),
            reason: format!("expected 0x-prefixed hex data, got {value}"),
        })
}

fn parse_address(method: &str, value: &Value) -> Result<Address, ValidationError> {
    value
        .as_str()
        .and_then(|text| text.parse::<Address>().ok())
        .ok_or_else(|| ValidationError::InvalidParams {
            method: method.to_string(),
            reason: format!("expected a 20-byte address, got {value}"),
        })
}
