//! ERC-20 token metadata.
//!
//! Each field resolves independently: a configured override wins, then the
//! contract's own getter via `eth_call`, then a fixed fallback with a
//! warning. Overrides cover the well-known tokens whose getters are
//! missing or non-standard and are loaded from configuration.

use abiframe_core::types::u256_to_f64;
use abiframe_evm::{decode_string_return, decode_uint_return};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::account::Address;
use crate::error::{RegistryError, RemoteError};
use crate::rpc::ContractReader;

pub const FALLBACK_DECIMALS: u32 = 18;

/// Configured metadata for one token. Unset fields are read on-chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    /// Already scaled by `decimals`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<f64>,
}

/// Address → override map. Keys are normalised to lower case on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenOverrides(HashMap<Address, TokenOverride>);

impl TokenOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Address, entry: TokenOverride) {
        self.0.insert(address, entry);
    }

    pub fn get(&self, address: &Address) -> Option<&TokenOverride> {
        self.0.get(address)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a YAML (or JSON, which YAML accepts) mapping.
    pub fn from_yaml(text: &str) -> Result<Self, RegistryError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load from a `.json` or `.yaml`/`.yml` file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&text)?),
            _ => Self::from_yaml(&text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub total_supply: f64,
}

/// Resolves and caches token metadata.
pub struct TokenResolver<R> {
    reader: R,
    overrides: TokenOverrides,
    cache: Arc<RwLock<HashMap<Address, TokenMetadata>>>,
}

impl<R: ContractReader> TokenResolver<R> {
    pub fn new(reader: R, overrides: TokenOverrides) -> Self {
        Self {
            reader,
            overrides,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Metadata for `address`. Transport failures are returned; a getter
    /// that is missing or returns undecodable data falls back instead.
    pub async fn resolve(&self, address: &Address) -> Result<TokenMetadata, RemoteError> {
        if let Some(hit) = self.cached(address) {
            return Ok(hit);
        }

        let entry = self.overrides.get(address).cloned().unwrap_or_default();

        let name = match entry.name {
            Some(name) => name,
            None => self.read_string(address, "name()").await?.unwrap_or_else(|| {
                warn!(%address, "could not find name; falling back to \"\"");
                String::new()
            }),
        };

        let symbol = match entry.symbol {
            Some(symbol) => symbol,
            None => self.read_string(address, "symbol()").await?.unwrap_or_else(|| {
                warn!(%address, "could not find symbol; falling back to \"\"");
                String::new()
            }),
        };

        let decimals = match entry.decimals {
            Some(d) => d,
            None => {
                let raw = self.reader.call(address, "decimals()").await?;
                // ERC-20 declares `decimals` as uint8
                let parsed = raw
                    .as_deref()
                    .and_then(decode_uint_return)
                    .and_then(|v| u8::try_from(v).ok())
                    .map(u32::from);
                parsed.unwrap_or_else(|| {
                    warn!(%address, fallback = FALLBACK_DECIMALS, "could not find decimals");
                    FALLBACK_DECIMALS
                })
            }
        };

        let total_supply = match entry.total_supply {
            Some(s) => s,
            None => {
                let raw = self.reader.call(address, "totalSupply()").await?;
                match raw.as_deref().and_then(decode_uint_return) {
                    Some(v) => scale(u256_to_f64(v), decimals),
                    None => {
                        warn!(%address, "could not find total supply; falling back to 0");
                        0.0
                    }
                }
            }
        };

        let meta = TokenMetadata {
            address: address.clone(),
            name,
            symbol,
            decimals,
            total_supply,
        };
        debug!(%address, symbol = %meta.symbol, decimals, "resolved token metadata");
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(address.clone(), meta.clone());
        Ok(meta)
    }

    fn cached(&self, address: &Address) -> Option<TokenMetadata> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(address)
            .cloned()
    }

    async fn read_string(
        &self,
        address: &Address,
        signature: &str,
    ) -> Result<Option<String>, RemoteError> {
        let raw = self.reader.call(address, signature).await?;
        Ok(raw.as_deref().and_then(decode_string_return))
    }
}

fn scale(raw: f64, decimals: u32) -> f64 {
    raw / 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers from a fixed table keyed by signature and counts calls.
    struct FakeReader {
        answers: HashMap<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl FakeReader {
        fn new(answers: &[(&'static str, &'static str)]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContractReader for FakeReader {
        async fn call(&self, _to: &Address, signature: &str) -> Result<Option<String>, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answers.get(signature).map(|s| s.to_string()))
        }
    }

    struct DownReader;

    #[async_trait]
    impl ContractReader for DownReader {
        async fn call(&self, _to: &Address, _sig: &str) -> Result<Option<String>, RemoteError> {
            Err(RemoteError::Http("connection refused".into()))
        }
    }

    const FOAM: &str = "0x4946c0e9f43f4dee607b0ef1fa1c1a7b3bdd3f0a";
    const BYTES32_FOAM: &str = "0x464f414d00000000000000000000000000000000000000000000000000000000";
    const EIGHTEEN: &str = "0x0000000000000000000000000000000000000000000000000000000000000012";
    // 1_000_000_000 * 10^18
    const SUPPLY: &str = "0x0000000000000000000000000000000000000000033b2e3c9fd0803ce8000000";

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[tokio::test]
    async fn reads_getters_on_chain() {
        let reader = FakeReader::new(&[
            ("name()", BYTES32_FOAM),
            ("symbol()", BYTES32_FOAM),
            ("decimals()", EIGHTEEN),
            ("totalSupply()", SUPPLY),
        ]);
        let resolver = TokenResolver::new(reader, TokenOverrides::new());
        let meta = resolver.resolve(&addr(FOAM)).await.unwrap();
        assert_eq!(meta.name, "FOAM");
        assert_eq!(meta.symbol, "FOAM");
        assert_eq!(meta.decimals, 18);
        assert_eq!(meta.total_supply, 1e9);
    }

    #[tokio::test]
    async fn missing_getters_fall_back() {
        let resolver = TokenResolver::new(FakeReader::new(&[]), TokenOverrides::new());
        let meta = resolver.resolve(&addr(FOAM)).await.unwrap();
        assert_eq!(meta.name, "");
        assert_eq!(meta.symbol, "");
        assert_eq!(meta.decimals, FALLBACK_DECIMALS);
        assert_eq!(meta.total_supply, 0.0);
    }

    #[tokio::test]
    async fn decimals_wider_than_uint8_fall_back() {
        for wide in [
            "0x0000000000000000000000000000000000000000000000000000000000000100",
            "0x0000000000000000000000000000000000000000000000000000000080000000",
        ] {
            let reader = FakeReader::new(&[("decimals()", wide), ("totalSupply()", SUPPLY)]);
            let meta = TokenResolver::new(reader, TokenOverrides::new())
                .resolve(&addr(FOAM))
                .await
                .unwrap();
            assert_eq!(meta.decimals, FALLBACK_DECIMALS);
            assert_eq!(meta.total_supply, 1e9);
        }
    }

    #[test]
    fn scale_saturates_huge_overridden_decimals() {
        assert_eq!(scale(1e27, u32::MAX), 0.0);
    }

    #[tokio::test]
    async fn overrides_win_and_skip_the_node() {
        let overrides = TokenOverrides::from_yaml(
            r#"
"0xE0B7927C4AF23765CB51314A0E0521A9645F0E2A":
  name: DGD
  symbol: DGD
  decimals: 9
  total_supply: 2000000.0
"#,
        )
        .unwrap();
        let reader = FakeReader::new(&[("name()", BYTES32_FOAM)]);
        let resolver = TokenResolver::new(reader, overrides);
        let meta = resolver
            .resolve(&addr("0xe0b7927c4af23765cb51314a0e0521a9645f0e2a"))
            .await
            .unwrap();
        assert_eq!(meta.name, "DGD");
        assert_eq!(meta.decimals, 9);
        assert_eq!(meta.total_supply, 2_000_000.0);
        assert_eq!(resolver.reader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn partial_override_scales_supply_by_overridden_decimals() {
        let mut overrides = TokenOverrides::new();
        overrides.insert(
            addr(FOAM),
            TokenOverride {
                decimals: Some(0),
                ..Default::default()
            },
        );
        let reader = FakeReader::new(&[("totalSupply()", EIGHTEEN)]);
        let meta = TokenResolver::new(reader, overrides)
            .resolve(&addr(FOAM))
            .await
            .unwrap();
        assert_eq!(meta.decimals, 0);
        assert_eq!(meta.total_supply, 18.0);
    }

    #[tokio::test]
    async fn results_are_cached() {
        let reader = FakeReader::new(&[("decimals()", EIGHTEEN)]);
        let resolver = TokenResolver::new(reader, TokenOverrides::new());
        resolver.resolve(&addr(FOAM)).await.unwrap();
        resolver.resolve(&addr(FOAM)).await.unwrap();
        assert_eq!(resolver.reader.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn transport_errors_propagate() {
        let resolver = TokenResolver::new(DownReader, TokenOverrides::new());
        assert!(matches!(
            resolver.resolve(&addr(FOAM)).await,
            Err(RemoteError::Http(_))
        ));
    }

    #[test]
    fn shipped_override_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/token_overrides.yaml");
        let overrides = TokenOverrides::load(&path).unwrap();
        let dao = overrides
            .get(&addr("0xbb9bc244d798123fde783fcc1c72d3bb8c189413"))
            .unwrap();
        assert_eq!(dao.decimals, Some(16));
    }
}
