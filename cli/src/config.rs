//! `abiframe.yaml`: CLI configuration.
//!
//! ```yaml
//! log:
//!   level: info
//!   components: { abiframe-evm: debug }
//!   json: false
//! etherscan:
//!   base_url: https://api.etherscan.io/api
//!   api_key: ...
//! rpc:
//!   url: https://mainnet.infura.io/v3/<project>
//! token_overrides: config/token_overrides.yaml   # or an inline map
//! ```
//!
//! Environment variables win over the file: `ETHERSCAN_API_KEY`,
//! `ABIFRAME_RPC_URL`, and `INFURA_PROJECT_ID` (used when no RPC URL is set).

use abiframe_observability::LogConfig;
use abiframe_registry::TokenOverrides;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogConfig,
    pub etherscan: EtherscanConfig,
    pub rpc: RpcConfig,
    pub token_overrides: TokenOverridesSetting,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EtherscanConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub url: Option<String>,
}

/// Either a path to an overrides file or the map itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TokenOverridesSetting {
    Path(PathBuf),
    Inline(TokenOverrides),
}

impl Default for TokenOverridesSetting {
    fn default() -> Self {
        TokenOverridesSetting::Inline(TokenOverrides::new())
    }
}

impl AppConfig {
    /// Read the file (if any), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read config file '{}'", path.display()))?;
                let mut config = Self::from_yaml(&text)
                    .with_context(|| format!("parse config file '{}'", path.display()))?;
                // Relative override paths are relative to the config file.
                if let TokenOverridesSetting::Path(p) = &mut config.token_overrides {
                    if p.is_relative() {
                        if let Some(dir) = path.parent() {
                            *p = dir.join(&*p);
                        }
                    }
                }
                config
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("ETHERSCAN_API_KEY").filter(|k| !k.is_empty()) {
            self.etherscan.api_key = Some(key);
        }
        if let Some(url) = var("ABIFRAME_RPC_URL").filter(|u| !u.is_empty()) {
            self.rpc.url = Some(url);
        }
        if self.rpc.url.is_none() {
            if let Some(project) = var("INFURA_PROJECT_ID").filter(|p| !p.is_empty()) {
                self.rpc.url = Some(abiframe_registry::infura_url(&project));
            }
        }
    }

    pub fn token_overrides(&self) -> Result<TokenOverrides> {
        match &self.token_overrides {
            TokenOverridesSetting::Inline(map) => Ok(map.clone()),
            TokenOverridesSetting::Path(path) => TokenOverrides::load(path)
                .with_context(|| format!("load token overrides '{}'", path.display())),
        }
    }
}
