//! # abiframe-core
//!
//! Core types shared across the abiframe crates: parsed ABI type
//! descriptors, decoded values, contract schemas, warehouse rows and the
//! warning taxonomy. The EVM decoder, the registry and the CLI are all
//! built on the interfaces defined here.

pub mod decoder;
pub mod descriptor;
pub mod error;
pub mod row;
pub mod schema;
pub mod types;

pub use decoder::{ProgressCallback, RowDecoder, RowOutcome};
pub use descriptor::{BaseKind, Dim, TypeDescriptor, TypeKind, UnsupportedReason};
pub use error::{DecodeWarning, FieldError, PayloadError, SchemaError};
pub use row::{
    Columns, DecodedLog, DecodedTable, DecodedTransaction, LogRow, RawRow, RowWarning,
    TransactionRow,
};
pub use schema::{
    AbiEntry, AbiParam, ContractSchema, EventKey, EventSchema, FunctionSchema, ParamMap,
    ResolvedEvent,
};
pub use types::{DecodedValue, MAX_SAFE_INTEGER};
