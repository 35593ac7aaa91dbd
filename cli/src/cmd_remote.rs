//! `abiframe fetch-abi` / `token` / `block-number`: commands that talk to Etherscan or a node.

use abiframe_registry::{
    AbiSource, Address, EtherscanSource, JsonRpcReader, TokenResolver,
};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::info;

use crate::config::AppConfig;

fn etherscan(config: &AppConfig) -> EtherscanSource {
    let mut source = EtherscanSource::new();
    if let Some(url) = &config.etherscan.base_url {
        source = source.with_base_url(url);
    }
    if let Some(key) = &config.etherscan.api_key {
        source = source.with_api_key(key);
    }
    source
}

pub async fn fetch_abi(config: &AppConfig, address: &str, output: Option<&Path>) -> Result<()> {
    let address = Address::parse(address)?;
    let abi = etherscan(config)
        .fetch_abi(&address)
        .await
        .with_context(|| format!("fetch ABI for {address}"))?;

    // Reject documents the decoder would not accept.
    let schema = abiframe_evm::build_schema(&abi)?;
    info!(
        %address,
        functions = schema.functions.len(),
        events = schema.events.len() + schema.anonymous_events.len(),
        "fetched ABI"
    );

    let pretty = serde_json::to_string_pretty(&serde_json::from_str::<serde_json::Value>(&abi)?)?;
    match output {
        Some(path) => {
            std::fs::write(path, pretty)
                .with_context(|| format!("write ABI to '{}'", path.display()))?;
            eprintln!("Saved ABI for {address} to {}", path.display());
        }
        None => println!("{pretty}"),
    }
    Ok(())
}

fn node(config: &AppConfig) -> Result<JsonRpcReader> {
    let url = config.rpc.url.clone().ok_or_else(|| {
        anyhow!("no JSON-RPC endpoint: set rpc.url, ABIFRAME_RPC_URL or INFURA_PROJECT_ID")
    })?;
    Ok(JsonRpcReader::new(url))
}

pub async fn token(config: &AppConfig, address: &str, as_json: bool) -> Result<()> {
    let address = Address::parse(address)?;
    let resolver = TokenResolver::new(node(config)?, config.token_overrides()?);
    let meta = resolver.resolve(&address).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    } else {
        println!("Address:      {}", meta.address);
        println!("Name:         {}", meta.name);
        println!("Symbol:       {}", meta.symbol);
        println!("Decimals:     {}", meta.decimals);
        println!("Total supply: {}", meta.total_supply);
    }
    Ok(())
}

pub async fn block_number(config: &AppConfig) -> Result<()> {
    let node = node(config)?;
    let head = node
        .block_number()
        .await
        .with_context(|| format!("eth_blockNumber at {}", node.url()))?;
    println!("{head}");
    Ok(())
}
