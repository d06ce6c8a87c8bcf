//! Transaction assembly for device signing.
//!
//! # Responsibilities
//! - Check field preconditions in a fixed order, each with a distinct error
//! - Select exactly one fee model (legacy gas price vs. EIP-1559)
//! - Resolve missing nonce and the chain id from the wrapped provider
//! - Produce the canonical unsigned bytes the device signs, then re-serialize
//!   the same fields with `{v, r, s}` into the broadcastable raw transaction
//!
//! "Bytes to sign" and "bytes to broadcast" deliberately differ only in the
//! signature fields; whether the result is broadcast is the router's call.

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Signature, TxKind, U256};
use alloy::rpc::types::TransactionRequest;

use crate::error::{ProviderResult, TransactionFieldError};
use crate::provider::resolver::ChainResolver;

/// Fee pricing for one transaction. The two models are mutually exclusive
/// and exhaustive: exactly one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePricing {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

/// Select the fee model from the request fields.
///
/// Total over the four (legacy, eip1559) presence combinations: neither and
/// both are errors, legacy alone succeeds, and EIP-1559 succeeds only with
/// both sub-fields present.
pub fn fee_pricing(request: &TransactionRequest) -> Result<FeePricing, TransactionFieldError> {
    match (
        request.gas_price,
        request.max_fee_per_gas,
        request.max_priority_fee_per_gas,
    ) {
        (None, None, None) => Err(TransactionFieldError::MissingFeeFields),
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
            Err(TransactionFieldError::IncompatibleFeeFields)
        }
        (Some(gas_price), None, None) => Ok(FeePricing::Legacy { gas_price }),
        (None, None, Some(_)) => Err(TransactionFieldError::MissingMaxFeePerGas),
        (None, Some(_), None) => Err(TransactionFieldError::MissingMaxPriorityFeePerGas),
        (None, Some(max_fee_per_gas), Some(max_priority_fee_per_gas)) => Ok(FeePricing::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        }),
    }
}

#[derive(Debug, Clone)]
enum UnsignedTx {
    Legacy(TxLegacy),
    Eip1559(TxEip1559),
}

/// A fully resolved unsigned transaction, ready for the device.
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
    /// Signing account, taken from the request's `from` field.
    pub from: Address,
    chain_id: u64,
    tx: UnsignedTx,
}

impl PreparedTransaction {
    /// Chain id the transaction is bound to.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Whether the legacy fee model is in use.
    pub fn is_legacy(&self) -> bool {
        matches!(self.tx, UnsignedTx::Legacy(_))
    }

    /// Canonical unsigned encoding handed to the device: the EIP-155 RLP
    /// preimage for legacy transactions, or the full typed envelope preimage
    /// (type byte included) for EIP-1559.
    pub fn signing_payload(&self) -> Vec<u8> {
        match &self.tx {
            UnsignedTx::Legacy(tx) => tx.encoded_for_signing(),
            UnsignedTx::Eip1559(tx) => tx.encoded_for_signing(),
        }
    }

    /// Re-serialize the same base fields with the signature inserted,
    /// producing the broadcastable EIP-2718 raw transaction.
    pub fn into_signed_raw(self, signature: Signature) -> Vec<u8> {
        match self.tx {
            UnsignedTx::Legacy(tx) => TxEnvelope::from(tx.into_signed(signature)).encoded_2718(),
            UnsignedTx::Eip1559(tx) => TxEnvelope::from(tx.into_signed(signature)).encoded_2718(),
        }
    }
}

/// Assemble an unsigned transaction from a validated request, resolving the
/// nonce and chain id through `resolver` when the caller omitted them.
///
/// Precondition order is fixed: gas, from, fee model, then the provider
/// lookups. Each failure carries its own error so callers can tell exactly
/// which field is at fault.
pub async fn prepare(
    request: TransactionRequest,
    resolver: &ChainResolver,
) -> ProviderResult<PreparedTransaction> {
    let gas_limit = request.gas.ok_or(TransactionFieldError::MissingGas)?;
    let from = request.from.ok_or(TransactionFieldError::MissingFrom)?;
    let pricing = fee_pricing(&request)?;

    let nonce = match request.nonce {
        Some(nonce) => nonce,
        None => resolver.pending_nonce(from).await?,
    };
    let chain_id = resolver.chain_id().await?;

    let to = request.to.unwrap_or(TxKind::Create);
    let value = request.value.unwrap_or(U256::ZERO);
    let input = request.input.into_input().unwrap_or_default();

    let tx = match pricing {
        FeePricing::Legacy { gas_price } => UnsignedTx::Legacy(TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            input,
        }),
        FeePricing::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => UnsignedTx::Eip1559(TxEip1559 {
            chain_id,
            nonce,
            gas_limit,
            max_fee_per_gas,
            max_priority_fee_per_gas,
            to,
            value,
            access_list: Default::default(),
            input,
        }),
    };

    Ok(PreparedTransaction { from, chain_id, tx })
}
