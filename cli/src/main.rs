//! abiframe CLI: decode warehouse transaction and log rows against a contract ABI.
//!
//! # Commands
//! ```text
//! abiframe selector    <signature>
//! abiframe event-hash  <signature>
//! abiframe schema      --abi <path.json>
//! abiframe decode-txs  --abi <path.json> --rows <rows.json> [--address <addr>] [--json]
//! abiframe decode-logs --abi <path.json> --rows <rows.json> [--address <addr>] [--json]
//! abiframe fetch-abi   --address <addr> [--output <path>]
//! abiframe token       --address <addr>
//! abiframe block-number
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd_decode;
mod cmd_remote;
mod cmd_schema;
mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(
    name = "abiframe",
    about = "ABI-driven decoder for Ethereum transaction inputs and event logs",
    long_about = "
abiframe: turn raw call data and event logs exported from a blockchain
warehouse into named, typed columns using the contract's ABI.

ENVIRONMENT VARIABLES:
  ETHERSCAN_API_KEY    Etherscan API key (fetch-abi)
  ABIFRAME_RPC_URL     JSON-RPC endpoint (token, block-number)
  INFURA_PROJECT_ID    Infura project, used when no RPC URL is configured
",
    version
)]
struct Cli {
    /// YAML config file
    #[arg(short, long, global = true, env = "ABIFRAME_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the 4-byte selector of a function signature
    Selector {
        /// e.g. "transfer(address,uint256)"
        signature: String,
    },

    /// Print the topic hash of an event signature
    #[command(name = "event-hash")]
    EventHash {
        /// e.g. "Transfer(address,address,uint256)"
        signature: String,
    },

    /// Build a schema from an ABI file and list its functions and events
    Schema {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode transaction rows (JSON array) using an ABI file
    #[command(name = "decode-txs")]
    DecodeTxs {
        #[command(flatten)]
        args: cmd_decode::DecodeArgs,
    },

    /// Decode log rows (JSON array) using an ABI file
    #[command(name = "decode-logs")]
    DecodeLogs {
        #[command(flatten)]
        args: cmd_decode::DecodeArgs,
    },

    /// Fetch a verified contract ABI from Etherscan
    #[command(name = "fetch-abi")]
    FetchAbi {
        /// Contract address
        #[arg(long)]
        address: String,
        /// Save ABI to this file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Resolve ERC-20 token metadata
    Token {
        /// Token contract address
        #[arg(long)]
        address: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the node's latest block number
    #[command(name = "block-number")]
    BlockNumber,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let log = config.log.clone().with_verbosity(cli.verbose);
    // A subscriber installed by an embedding process is left alone.
    let _ = abiframe_observability::init_tracing(&log);

    match cli.command {
        Commands::Selector { signature } => {
            println!("{}", abiframe_evm::function_selector(&signature));
            Ok(())
        }

        Commands::EventHash { signature } => {
            println!("{}", abiframe_evm::event_hash(&signature));
            Ok(())
        }

        Commands::Schema { abi, json } => cmd_schema::run(&abi, json),

        Commands::DecodeTxs { args } => cmd_decode::transactions(&args).await,

        Commands::DecodeLogs { args } => cmd_decode::logs(&args).await,

        Commands::FetchAbi { address, output } => {
            cmd_remote::fetch_abi(&config, &address, output.as_deref()).await
        }

        Commands::Token { address, json } => cmd_remote::token(&config, &address, json).await,

        Commands::BlockNumber => cmd_remote::block_number(&config).await,
    }
}
