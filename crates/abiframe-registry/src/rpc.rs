//! Read-only contract calls over JSON-RPC.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::account::Address;
use crate::error::RemoteError;

/// Calls a view function on a contract.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Call `signature` (plain text, e.g. `"name()"`) on `to` with no
    /// arguments. Returns the hex return data, or `None` when the node
    /// returns `0x` (no such function, or an EOA).
    async fn call(&self, to: &Address, signature: &str) -> Result<Option<String>, RemoteError>;
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id,
        }
    }

    pub fn block_number(id: u64) -> Self {
        Self::new(id, "eth_blockNumber", Vec::new())
    }

    /// `eth_call` of a zero-argument function at the latest block.
    pub fn eth_call(id: u64, to: &Address, signature: &str) -> Self {
        let data = abiframe_evm::function_selector(signature);
        Self::new(
            id,
            "eth_call",
            vec![serde_json::json!({ "to": to.as_str(), "data": data }), "latest".into()],
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// The `eth_call` result as hex, with `0x` mapped to `None`.
    pub fn into_call_result(self) -> Result<Option<String>, RemoteError> {
        match self.into_result()? {
            Some(Value::String(s)) if s == "0x" || s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(RemoteError::InvalidResponse {
                service: "eth_call".into(),
                reason: format!("expected a hex string, got {other}"),
            }),
        }
    }

    /// The `eth_blockNumber` result, a hex quantity such as `"0x10d4f"`.
    pub fn into_block_number(self) -> Result<u64, RemoteError> {
        let invalid = |reason: String| RemoteError::InvalidResponse {
            service: "eth_blockNumber".into(),
            reason,
        };
        match self.into_result()? {
            Some(Value::String(s)) => {
                let digits = s.strip_prefix("0x").unwrap_or(&s);
                u64::from_str_radix(digits, 16)
                    .map_err(|e| invalid(format!("bad quantity '{s}': {e}")))
            }
            other => Err(invalid(format!("expected a hex quantity, got {other:?}"))),
        }
    }

    fn into_result(self) -> Result<Option<Value>, RemoteError> {
        match self.error {
            Some(err) => Err(RemoteError::Rpc {
                code: err.code,
                message: err.message,
            }),
            None => Ok(self.result),
        }
    }
}
