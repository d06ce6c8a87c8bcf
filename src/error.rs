//! Error taxonomy for the signing middleware.
//!
//! # Design Decisions
//! - Validation and transaction-field errors are raised before any device
//!   interaction, so malformed input never costs a device round-trip
//! - Upstream errors are surfaced verbatim, never reinterpreted, so callers
//!   can tell "the chain rejected this" from "the signing layer failed"
//! - Connection errors carry the transport's own diagnostic id when present

use serde_json::Value;
use thiserror::Error;

/// Result type for middleware operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Top-level error for every request handled by the middleware.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Request parameters failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transaction request is missing or mixing required fields.
    #[error(transparent)]
    Transaction(#[from] TransactionFieldError),

    /// Connecting to the signing device failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The signing device failed or rejected an operation.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Opaque error from the wrapped provider.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Parameter validation failures for the intercepted RPC methods.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Data is present but the account address parameter is not.
    #[error("missing address parameter in {method} request")]
    MissingAddress { method: String },

    /// The data parameter is not present.
    #[error("missing data parameter in {method} request")]
    MissingData { method: String },

    /// The typed-data parameter was a string that is not valid JSON.
    #[error("typed-data parameter is a string but could not be parsed as JSON")]
    InvalidTypedDataJson,

    /// The typed-data structure is malformed or unresolvable.
    #[error("invalid typed data: {0}")]
    InvalidTypedData(String),

    /// Parameter arity or type does not match the method schema.
    #[error("invalid parameters for {method}: {reason}")]
    InvalidParams { method: String, reason: String },
}

/// Transaction-field preconditions, checked in a fixed order before the
/// transaction is assembled for signing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransactionFieldError {
    /// `gas` must be provided by the caller; the middleware never estimates.
    #[error("missing required transaction field \"gas\"")]
    MissingGas,

    /// `from` selects the signing account and cannot be defaulted.
    #[error("missing required transaction field \"from\"")]
    MissingFrom,

    /// Neither `gasPrice` nor the EIP-1559 fee fields are present.
    #[error("transaction has no fee price fields: provide gasPrice or maxFeePerGas/maxPriorityFeePerGas")]
    MissingFeeFields,

    /// `gasPrice` and the EIP-1559 fee fields are mutually exclusive.
    #[error("transaction mixes gasPrice with EIP-1559 fee fields")]
    IncompatibleFeeFields,

    /// EIP-1559 pricing selected but `maxFeePerGas` is absent.
    #[error("missing required transaction field \"maxFeePerGas\"")]
    MissingMaxFeePerGas,

    /// EIP-1559 pricing selected but `maxPriorityFeePerGas` is absent.
    #[error("missing required transaction field \"maxPriorityFeePerGas\"")]
    MissingMaxPriorityFeePerGas,
}

/// Failure to establish the device transport connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The transport could not be opened at all.
    #[error("could not establish a connection to the signing device: {message}")]
    OpenFailed { message: String },

    /// The transport reported a typed error with its own diagnostic id.
    #[error("could not establish a connection to the signing device: {message} (transport error id: {id})")]
    Transport { id: String, message: String },
}

/// Failures reported by a connected device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The user (or firmware policy) declined to sign.
    #[error("device rejected the signing request: {0}")]
    SigningRejected(String),

    /// The device firmware does not support the requested operation.
    /// For typed-data signing this triggers the hashed fallback path.
    #[error("operation not supported by the device: {0}")]
    NotSupported(String),

    /// The device returned a signature that does not fit the expected shape.
    #[error("malformed signature from device: {0}")]
    MalformedSignature(String),

    /// Command-level transport failure after the connection was established.
    #[error("device transport failure: {0}")]
    Transport(String),
}

/// Error from the wrapped provider, passed through without reinterpretation.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// JSON-RPC error object returned by the wrapped provider.
    #[error("upstream RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// Transport-level failure reaching the wrapped provider.
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// The wrapped provider answered with a result the middleware cannot read.
    #[error("malformed upstream response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransactionFieldError::MissingGas;
        assert_eq!(err.to_string(), "missing required transaction field \"gas\"");

        let err = ConnectionError::Transport {
            id: "NoDeviceFound".into(),
            message: "cannot open device".into(),
        };
        assert!(err.to_string().contains("NoDeviceFound"));
        assert!(err.to_string().contains("cannot open device"));
    }

    #[test]
    fn test_upstream_error_is_transparent() {
        let err = ProviderError::from(UpstreamError::Rpc {
            code: -32000,
            message: "execution reverted".into(),
            data: None,
        });
        assert_eq!(err.to_string(), "upstream RPC error -32000: execution reverted");
    }

    #[test]
    fn test_validation_error_names_the_method() {
        let err = ValidationError::MissingAddress {
            method: "personal_sign".into(),
        };
        assert!(err.to_string().contains("personal_sign"));
    }
}
