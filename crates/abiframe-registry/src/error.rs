//! Errors raised at the collaborator boundary.

use abiframe_core::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid address '{0}': expected 0x followed by 40 hex digits")]
    InvalidAddress(String),

    #[error("invalid date range: {reason}")]
    InvalidDateRange { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Failures talking to a block explorer or a JSON-RPC node.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("ABI not found for {address}")]
    NotFound { address: String },

    #[error("Etherscan API error: {message}")]
    EtherscanError { message: String },

    #[error("rate limited by {service}")]
    RateLimited { service: String },

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },
}

impl RemoteError {
    /// The contract has no published ABI; callers degrade instead of failing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RemoteError::NotFound { .. } | RemoteError::EtherscanError { .. }
        )
    }
}
