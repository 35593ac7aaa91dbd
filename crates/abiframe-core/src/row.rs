//! Warehouse rows in, decoded rows out.

use crate::error::DecodeWarning;
use crate::types::DecodedValue;
use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Common accessors the assembler needs from any input row.
pub trait RawRow {
    fn block_timestamp(&self) -> DateTime<Utc>;
}

/// A successful transaction touching an account, as exported by the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRow {
    pub transaction_hash: String,
    pub block_timestamp: DateTime<Utc>,
    pub from_address: String,
    #[serde(default)]
    pub to_address: Option<String>,
    /// Wei, as a decimal string.
    #[serde(default)]
    pub value: String,
    /// First 4 bytes of the input, `0x`-prefixed.
    #[serde(default)]
    pub function_signature: Option<String>,
    /// Input after the selector, unprefixed hex.
    #[serde(default)]
    pub function_data: Option<String>,
    /// `1` for success, `0` for a reverted call; absent before Byzantium.
    #[serde(default)]
    pub receipt_status: Option<u8>,
}

impl TransactionRow {
    /// Selector with the warehouse's empty markers (`""`, `"0x"`) treated as absent.
    pub fn selector(&self) -> Option<&str> {
        self.function_signature
            .as_deref()
            .filter(|s| !s.is_empty() && *s != "0x")
    }

    /// Call data with `""` treated as absent.
    pub fn call_data(&self) -> Option<&str> {
        self.function_data.as_deref().filter(|s| !s.is_empty())
    }

    /// Only an explicit `receipt_status` of 0 marks a reverted call.
    pub fn is_reverted(&self) -> bool {
        self.receipt_status == Some(0)
    }
}

impl RawRow for TransactionRow {
    fn block_timestamp(&self) -> DateTime<Utc> {
        self.block_timestamp
    }
}

/// One event log emitted by a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRow {
    pub transaction_hash: String,
    pub block_timestamp: DateTime<Utc>,
    pub address: String,
    /// Up to four 32-byte topics, `0x`-prefixed.
    #[serde(default)]
    pub topics: Vec<String>,
    /// ABI-encoded non-indexed parameters, `0x`-prefixed.
    #[serde(default)]
    pub transaction_data: String,
}

impl RawRow for LogRow {
    fn block_timestamp(&self) -> DateTime<Utc> {
        self.block_timestamp
    }
}

/// Lets the assembler ask a decoded row whether it carries a column.
pub trait Columns {
    fn has_column(&self, column: &str) -> bool;
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodedTransaction {
    pub transaction_hash: String,
    /// UTC wall-clock time, timezone dropped.
    pub block_timestamp: NaiveDateTime,
    pub from_address: String,
    pub to_address: Option<String>,
    pub value: String,
    pub function_name: Option<String>,
    /// `param_<name>` → value, only for parameters that decoded.
    #[serde(flatten)]
    pub params: IndexMap<String, DecodedValue>,
}

impl Columns for DecodedTransaction {
    fn has_column(&self, column: &str) -> bool {
        self.params.contains_key(column)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodedLog {
    pub transaction_hash: String,
    pub block_timestamp: NaiveDateTime,
    pub address: String,
    pub event_name: Option<String>,
    /// `topic_<name>` / `data_<name>` → value.
    #[serde(flatten)]
    pub fields: IndexMap<String, DecodedValue>,
}

impl Columns for DecodedLog {
    fn has_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }
}

/// A warning tied to the output row it was raised on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowWarning {
    pub row: usize,
    pub warning: DecodeWarning,
}

/// Output of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedTable<R> {
    /// Schema-derived columns present in at least one row, ABI order.
    pub columns: Vec<String>,
    pub rows: Vec<R>,
    pub warnings: Vec<RowWarning>,
}

impl<R> DecodedTable<R> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Warnings raised on one row.
    pub fn warnings_for(&self, row: usize) -> impl Iterator<Item = &DecodeWarning> {
        self.warnings
            .iter()
            .filter(move |w| w.row == row)
            .map(|w| &w.warning)
    }
}
