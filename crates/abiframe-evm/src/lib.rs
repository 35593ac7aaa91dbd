//! # abiframe-evm
//!
//! ABI-driven decoder for Ethereum call inputs and event logs.
//!
//! ## Pipeline
//! - `abi` builds selector → function and hash → event tables (keccak256)
//! - `word` splits a hex payload into 32-byte words with a spent mask
//! - `scalar` and `composite` walk the head/tail layout of each parameter
//! - `topic` decodes indexed parameters from log topics
//! - `assembler` applies a schema to a batch of rows in parallel

pub mod abi;
pub mod assembler;
pub mod composite;
pub mod fingerprint;
pub mod returns;
pub mod scalar;
pub mod topic;
pub mod word;

pub use abi::{build_schema, build_schema_from_entries, build_schema_from_value, canonical_signature};
pub use assembler::{assemble, LogDecoder, RowAssembler, TransactionDecoder};
pub use composite::{decode_param, decode_params, FieldOutcome};
pub use fingerprint::{event_hash, function_selector, keccak256};
pub use returns::{decode_string_return, decode_uint_return};
pub use word::WordStream;
