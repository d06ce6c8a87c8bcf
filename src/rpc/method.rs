//! RPC method classification.
//!
//! Every incoming request is classified exactly once at the router boundary;
//! downstream code matches on the closed enum instead of comparing method
//! name strings again.

/// Classification of an incoming JSON-RPC method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// `eth_accounts` / `eth_requestAccounts`: list the device-derived account.
    Accounts,
    /// `personal_sign`: message signing, params are `[data, address]`.
    PersonalSign,
    /// `eth_sign`: legacy message signing, params are `[address, data]`.
    LegacySign,
    /// `eth_signTypedData_v4`: EIP-712 structured signing.
    TypedDataV4,
    /// `eth_sendTransaction`: transaction signing.
    SendTransaction,
    /// Anything else; forwarded verbatim to the wrapped provider.
    Other(String),
}

impl Method {
    /// Classify a method name. Pure function of the string.
    pub fn classify(method: &str) -> Self {
        match method {
            "eth_accounts" | "eth_requestAccounts" => Self::Accounts,
            "personal_sign" => Self::PersonalSign,
            "eth_sign" => Self::LegacySign,
            "eth_signTypedData_v4" => Self::TypedDataV4,
            "eth_sendTransaction" => Self::SendTransaction,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether this method is serviced by the signing device.
    pub fn is_wallet_method(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Canonical method name, for error messages and logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Accounts => "eth_accounts",
            Self::PersonalSign => "personal_sign",
            Self::LegacySign => "eth_sign",
            Self::TypedDataV4 => "eth_signTypedData_v4",
            Self::SendTransaction => "eth_sendTransaction",
            Self::Other(name) => name,
        }
    }
}
