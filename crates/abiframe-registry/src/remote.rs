//! HTTP-backed collaborators: Etherscan ABI fetching and JSON-RPC `eth_call`.
//!
//! # Feature Flag
//! This module requires the `remote` feature flag (enables `reqwest`).
//!
//! ```toml
//! abiframe-registry = { version = "0.1", features = ["remote"] }
//! ```
//!
//! # Usage
//! ```ignore
//! let etherscan = EtherscanSource::new().with_api_key(key);
//! let abi_json = etherscan.fetch_abi(&address).await?;
//!
//! let node = JsonRpcReader::new(infura_url(&project_id));
//! let name = node.call(&address, "name()").await?;
//! let head = node.block_number().await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::abi_source::AbiSource;
use crate::account::Address;
use crate::error::RemoteError;
use crate::rpc::{ContractReader, JsonRpcRequest, JsonRpcResponse};

pub const ETHERSCAN_MAINNET: &str = "https://api.etherscan.io/api";

/// Mainnet HTTPS endpoint for an Infura project.
pub fn infura_url(project_id: &str) -> String {
    format!("https://mainnet.infura.io/v3/{project_id}")
}

fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent(concat!("abiframe/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

fn http_err(e: reqwest::Error) -> RemoteError {
    RemoteError::Http(e.to_string())
}

// ─── Etherscan ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    message: String,
    result: String,
}

/// Fetches verified contract ABIs from Etherscan (or a compatible explorer).
pub struct EtherscanSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl EtherscanSource {
    pub fn new() -> Self {
        Self {
            client: http_client(),
            base_url: ETHERSCAN_MAINNET.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point at an Etherscan-compatible API, e.g. `https://api.polygonscan.com/api`.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for EtherscanSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AbiSource for EtherscanSource {
    async fn fetch_abi(&self, address: &Address) -> Result<String, RemoteError> {
        // Etherscan serves a heavily rate-limited anonymous tier.
        let api_key = self.api_key.as_deref().unwrap_or("YourApiKeyToken");
        debug!(%address, base = %self.base_url, "fetching ABI from Etherscan");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("module", "contract"),
                ("action", "getabi"),
                ("address", address.as_str()),
                ("apikey", api_key),
            ])
            .send()
            .await
            .map_err(http_err)?;

        if resp.status() == 429 {
            return Err(RemoteError::RateLimited {
                service: "Etherscan".into(),
            });
        }

        let body: EtherscanResponse = resp.json().await.map_err(http_err)?;
        if body.status != "1" {
            // "Contract source code not verified" lands here.
            return Err(RemoteError::EtherscanError {
                message: format!("{}: {}", body.message, body.result),
            });
        }

        serde_json::from_str::<serde_json::Value>(&body.result).map_err(|e| {
            RemoteError::InvalidResponse {
                service: "Etherscan".into(),
                reason: e.to_string(),
            }
        })?;

        Ok(body.result)
    }
}

// ─── JSON-RPC ─────────────────────────────────────────────────────────────────

/// `eth_call` over HTTP JSON-RPC (Infura or any Ethereum node).
pub struct JsonRpcReader {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcReader {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Latest block number via `eth_blockNumber`.
    pub async fn block_number(&self) -> Result<u64, RemoteError> {
        let id = self.next_id();
        debug!(id, "eth_blockNumber");
        self.send(&JsonRpcRequest::block_number(id))
            .await?
            .into_block_number()
    }

    async fn send(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, RemoteError> {
        let resp = self
            .client
            .post(&self.url)
            .json(req)
            .send()
            .await
            .map_err(http_err)?;

        let status = resp.status();
        if status == 429 {
            return Err(RemoteError::RateLimited {
                service: "JSON-RPC".into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json().await.map_err(|e| RemoteError::InvalidResponse {
            service: "JSON-RPC".into(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ContractReader for JsonRpcReader {
    async fn call(&self, to: &Address, signature: &str) -> Result<Option<String>, RemoteError> {
        let id = self.next_id();
        debug!(%to, signature, id, "eth_call");
        self.send(&JsonRpcRequest::eth_call(id, to, signature))
            .await?
            .into_call_result()
    }
}
