//! `abiframe decode-txs` / `decode-logs`: decode exported warehouse rows.

use abiframe_core::{DecodedTable, DecodedValue, RowWarning, TransactionRow};
use abiframe_evm::RowAssembler;
use abiframe_observability::WarningReport;
use abiframe_registry::{Account, JsonFileRowSource, QueryRange, RowSource};
use anyhow::Result;
use clap::Args;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

use crate::cmd_schema;

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Path to the ABI JSON file
    #[arg(long)]
    pub abi: PathBuf,
    /// Rows exported from the warehouse, as a JSON array
    #[arg(long)]
    pub rows: PathBuf,
    /// Keep only rows touching this account
    #[arg(long)]
    pub address: Option<String>,
    /// First day to include (YYYY-MM-DD), requires --address
    #[arg(long, requires = "address")]
    pub start: Option<String>,
    /// Last day to include (YYYY-MM-DD), requires --address
    #[arg(long, requires = "address")]
    pub end: Option<String>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DecodeArgs {
    fn account(&self) -> Result<Option<Account>> {
        let Some(address) = &self.address else {
            return Ok(None);
        };
        let range = QueryRange::parse(self.start.as_deref(), self.end.as_deref())?;
        Ok(Some(Account::new(address)?.with_range(range)))
    }
}

pub async fn transactions(args: &DecodeArgs) -> Result<()> {
    let schema = cmd_schema::load(&args.abi)?;
    let rows = match args.account()? {
        Some(account) => {
            JsonFileRowSource::new()
                .with_transactions(&args.rows)
                .transactions(&account)
                .await?
        }
        None => {
            let rows: Vec<TransactionRow> =
                serde_json::from_str(&std::fs::read_to_string(&args.rows)?)?;
            rows.into_iter().filter(|r| !r.is_reverted()).collect()
        }
    };

    let table = RowAssembler::new(&schema).decode_transactions(&rows);
    print_table(&table, args.json, |r| {
        (
            r.block_timestamp.to_string(),
            r.transaction_hash.as_str(),
            r.function_name.as_deref(),
            &r.params,
        )
    })?;
    report(&table.warnings, "decode-txs");
    Ok(())
}

pub async fn logs(args: &DecodeArgs) -> Result<()> {
    let schema = cmd_schema::load(&args.abi)?;
    let rows = match args.account()? {
        Some(account) => {
            JsonFileRowSource::new()
                .with_logs(&args.rows)
                .logs(&account)
                .await?
        }
        None => serde_json::from_str(&std::fs::read_to_string(&args.rows)?)?,
    };

    let table = RowAssembler::new(&schema).decode_logs(&rows);
    print_table(&table, args.json, |r| {
        (
            r.block_timestamp.to_string(),
            r.transaction_hash.as_str(),
            r.event_name.as_deref(),
            &r.fields,
        )
    })?;
    report(&table.warnings, "decode-logs");
    Ok(())
}

/// (timestamp, tx hash, function/event name, decoded columns)
type RowView<'a> = (
    String,
    &'a str,
    Option<&'a str>,
    &'a IndexMap<String, DecodedValue>,
);

fn print_table<R: Serialize>(
    table: &DecodedTable<R>,
    as_json: bool,
    view: impl Fn(&R) -> RowView<'_>,
) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&table.rows)?);
        return Ok(());
    }

    println!("Columns: {}", table.columns.join(", "));
    for row in &table.rows {
        let (ts, hash, name, values) = view(row);
        println!("{ts}  {hash}  {}", name.unwrap_or("-"));
        for (col, value) in values {
            println!("    {col} = {}", serde_json::to_string(value)?);
        }
    }
    println!("{} rows", table.len());
    Ok(())
}

fn report(warnings: &[RowWarning], context: &str) {
    let report = WarningReport::from_warnings(warnings);
    if report.is_empty() {
        return;
    }
    report.emit(context);
    eprintln!("{} warnings:", report.total);
    for (kind, summary) in &report.by_kind {
        eprintln!(
            "  {kind:28} {:>6}  e.g. row {}: {}",
            summary.count, summary.first_row, summary.example
        );
    }
}
