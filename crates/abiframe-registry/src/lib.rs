//! # abiframe-registry
//!
//! Everything outside the decoder: where ABIs and rows come from, and the
//! account, contract and token model built on top of them.
//!
//! ## Collaborators
//! 1. **ABI sources**: a directory of `<address>.json` files, or Etherscan
//!    (`remote` feature)
//! 2. **Contract reader**: JSON-RPC `eth_call` for token getters (`remote` feature)
//! 3. **Row sources**: exported warehouse rows, filtered per account, and
//!    contract creation lookups
//!
//! Each is a trait so tests and embedders can supply their own.

pub mod abi_source;
pub mod account;
pub mod cache;
pub mod contract;
pub mod error;
#[cfg(feature = "remote")]
pub mod remote;
pub mod rows;
pub mod rpc;
pub mod token;

pub use abi_source::{AbiSource, FileAbiSource};
pub use account::{Account, Address, QueryRange};
pub use cache::SchemaCache;
pub use contract::{unknown_creation_date, Contract, Sources};
pub use error::{RegistryError, RemoteError};
pub use rows::{CreationSource, JsonFileRowSource, RowSource};
pub use rpc::ContractReader;
pub use token::{TokenMetadata, TokenOverride, TokenOverrides, TokenResolver};

#[cfg(feature = "remote")]
pub use remote::{infura_url, EtherscanSource, JsonRpcReader};
