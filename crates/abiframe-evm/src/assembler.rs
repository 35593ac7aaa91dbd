//! Row Assembler: applies a contract schema to a batch of warehouse rows.
//!
//! Rows are ordered by block timestamp, decoded in parallel with Rayon (each
//! row owns its word stream), and collected into a [`DecodedTable`] whose
//! columns are the schema-derived columns present in at least one row.

use abiframe_core::{
    decoder::{ProgressCallback, RowDecoder, RowOutcome},
    error::DecodeWarning,
    row::{
        Columns, DecodedLog, DecodedTable, DecodedTransaction, LogRow, RawRow, RowWarning,
        TransactionRow,
    },
    schema::{data_column, param_column, topic_column, ContractSchema},
    DecodedValue, ParamMap,
};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::composite::{decode_params, FieldOutcome};
use crate::topic::decode_topic;
use crate::word::WordStream;

/// Decode `rows` with `decoder`. Never fails; problems are reported per row
/// in the table's warnings.
pub fn assemble<D: RowDecoder>(
    decoder: &D,
    rows: &[D::Row],
    progress: Option<&dyn ProgressCallback>,
) -> DecodedTable<D::Output> {
    let mut ordered: Vec<&D::Row> = rows.iter().collect();
    ordered.sort_by_key(|r| r.block_timestamp());

    let total = ordered.len();
    let done = AtomicUsize::new(0);
    let outcomes: Vec<RowOutcome<D::Output>> = ordered
        .par_iter()
        .map(|row| {
            let outcome = decoder.decode_row(row);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress {
                cb.on_progress(n, total);
            }
            outcome
        })
        .collect();

    let mut rows_out = Vec::with_capacity(outcomes.len());
    let mut warnings = Vec::new();
    for (row, outcome) in outcomes.into_iter().enumerate() {
        warnings.extend(
            outcome
                .warnings
                .into_iter()
                .map(|warning| RowWarning { row, warning }),
        );
        rows_out.push(outcome.output);
    }

    let columns: Vec<String> = decoder
        .output_columns()
        .into_iter()
        .filter(|c| rows_out.iter().any(|r| r.has_column(c)))
        .collect();

    info!(
        rows = rows_out.len(),
        columns = columns.len(),
        warnings = warnings.len(),
        "decoded batch"
    );

    DecodedTable {
        columns,
        rows: rows_out,
        warnings,
    }
}

/// Decode a payload against `params`, writing `column(name)` → value.
fn decode_payload(
    payload: &str,
    params: &ParamMap,
    column: fn(&str) -> String,
    out: &mut IndexMap<String, DecodedValue>,
    warnings: &mut Vec<DecodeWarning>,
) {
    if params.is_empty() {
        return;
    }
    let mut stream = match WordStream::from_hex(payload) {
        Ok(stream) => stream,
        Err(e) => {
            warnings.push(e.into());
            return;
        }
    };
    for (name, outcome) in decode_params(&mut stream, params) {
        collect(name, outcome, column, out, warnings);
    }
}

fn collect(
    name: &str,
    outcome: FieldOutcome,
    column: fn(&str) -> String,
    out: &mut IndexMap<String, DecodedValue>,
    warnings: &mut Vec<DecodeWarning>,
) {
    if let Some(value) = outcome.value {
        out.insert(column(name), value);
    }
    if let Some(warning) = outcome.warning {
        warnings.push(warning);
    }
}

/// Decodes transaction call data against the schema's functions.
#[derive(Debug, Clone, Copy)]
pub struct TransactionDecoder<'s> {
    schema: &'s ContractSchema,
}

impl<'s> TransactionDecoder<'s> {
    pub fn new(schema: &'s ContractSchema) -> Self {
        Self { schema }
    }
}

impl RowDecoder for TransactionDecoder<'_> {
    type Row = TransactionRow;
    type Output = DecodedTransaction;

    fn output_columns(&self) -> Vec<String> {
        self.schema.function_columns()
    }

    fn decode_row(&self, row: &TransactionRow) -> RowOutcome<DecodedTransaction> {
        let mut decoded = DecodedTransaction {
            transaction_hash: row.transaction_hash.clone(),
            block_timestamp: row.block_timestamp.naive_utc(),
            from_address: row.from_address.clone(),
            to_address: row.to_address.clone(),
            value: row.value.clone(),
            function_name: None,
            params: IndexMap::new(),
        };

        let Some(selector) = row.selector() else {
            return RowOutcome::clean(decoded);
        };
        let Some(function) = self.schema.function(selector) else {
            debug!(tx = %row.transaction_hash, selector, "unknown selector");
            return RowOutcome {
                output: decoded,
                warnings: vec![DecodeWarning::UnknownSelector {
                    selector: selector.to_string(),
                }],
            };
        };

        let mut warnings = Vec::new();
        decoded.function_name = Some(function.name.clone());
        decode_payload(
            row.call_data().unwrap_or_default(),
            &function.params,
            param_column,
            &mut decoded.params,
            &mut warnings,
        );
        RowOutcome {
            output: decoded,
            warnings,
        }
    }
}

/// Decodes event logs against the schema's events.
#[derive(Debug, Clone, Copy)]
pub struct LogDecoder<'s> {
    schema: &'s ContractSchema,
}

impl<'s> LogDecoder<'s> {
    pub fn new(schema: &'s ContractSchema) -> Self {
        Self { schema }
    }
}

impl RowDecoder for LogDecoder<'_> {
    type Row = LogRow;
    type Output = DecodedLog;

    fn output_columns(&self) -> Vec<String> {
        self.schema.event_columns()
    }

    fn decode_row(&self, row: &LogRow) -> RowOutcome<DecodedLog> {
        let mut decoded = DecodedLog {
            transaction_hash: row.transaction_hash.clone(),
            block_timestamp: row.block_timestamp.naive_utc(),
            address: row.address.clone(),
            event_name: None,
            fields: IndexMap::new(),
        };

        let resolved = match self.schema.resolve_event(row.topics.first().map(String::as_str)) {
            Ok(resolved) => resolved,
            Err(warning) => {
                debug!(tx = %row.transaction_hash, %warning, "log not resolved");
                return RowOutcome {
                    output: decoded,
                    warnings: vec![warning],
                };
            }
        };

        let event = resolved.event;
        let mut warnings = Vec::new();
        decoded.event_name = Some(event.name.clone());

        for (i, (name, ty)) in event.topics.iter().enumerate() {
            let index = resolved.first_topic + i;
            match row.topics.get(index) {
                Some(topic) => {
                    let outcome = decode_topic(name, ty, topic);
                    collect(name, outcome, topic_column, &mut decoded.fields, &mut warnings);
                }
                None => warnings.push(DecodeWarning::MissingTopic {
                    param: name.clone(),
                    index,
                }),
            }
        }

        decode_payload(
            &row.transaction_data,
            &event.data,
            data_column,
            &mut decoded.fields,
            &mut warnings,
        );
        RowOutcome {
            output: decoded,
            warnings,
        }
    }
}

/// Decodes both row kinds against one contract schema.
#[derive(Debug, Clone, Copy)]
pub struct RowAssembler<'s> {
    schema: &'s ContractSchema,
}

impl<'s> RowAssembler<'s> {
    pub fn new(schema: &'s ContractSchema) -> Self {
        Self { schema }
    }

    pub fn decode_transactions(&self, rows: &[TransactionRow]) -> DecodedTable<DecodedTransaction> {
        assemble(&TransactionDecoder::new(self.schema), rows, None)
    }

    pub fn decode_logs(&self, rows: &[LogRow]) -> DecodedTable<DecodedLog> {
        assemble(&LogDecoder::new(self.schema), rows, None)
    }
}
