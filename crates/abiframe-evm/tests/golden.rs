//! Golden fixture integration tests.
//!
//! Each fixture in `fixtures/evm/` carries an ABI, a batch of warehouse rows
//! and the expected decoded table: surviving columns, per-row values (in
//! their serialized form), columns that must be absent, and warnings.

use abiframe_core::{DecodedTable, LogRow, RowWarning, TransactionRow};
use abiframe_evm::{abi::build_schema_from_value, RowAssembler};
use serde::Serialize;
use serde_json::Value;

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// The fixtures live two levels above the crate root.
fn fixture_path(name: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures/evm");
    p.push(name);
    p
}

fn load_fixture(name: &str) -> Value {
    let text = std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("fixture {name} not found: {e}"));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("fixture {name} is not JSON: {e}"))
}

/// Decode the fixture's rows and return the table in serialized form.
fn run_fixture(fixture: &Value) -> (Vec<String>, Vec<Value>, Vec<RowWarning>) {
    let schema = build_schema_from_value(&fixture["abi"]).expect("fixture ABI must build");
    let assembler = RowAssembler::new(&schema);
    match fixture["kind"].as_str() {
        Some("transactions") => {
            let rows: Vec<TransactionRow> =
                serde_json::from_value(fixture["rows"].clone()).expect("transaction rows");
            serialize(assembler.decode_transactions(&rows))
        }
        Some("logs") => {
            let rows: Vec<LogRow> =
                serde_json::from_value(fixture["rows"].clone()).expect("log rows");
            serialize(assembler.decode_logs(&rows))
        }
        other => panic!("unknown fixture kind {other:?}"),
    }
}

fn serialize<R: Serialize>(table: DecodedTable<R>) -> (Vec<String>, Vec<Value>, Vec<RowWarning>) {
    let rows = table
        .rows
        .iter()
        .map(|r| serde_json::to_value(r).expect("row serializes"))
        .collect();
    (table.columns, rows, table.warnings)
}

fn assert_fixture(name: &str) {
    let fixture = load_fixture(name);
    let expected = &fixture["expected"];
    let (columns, rows, warnings) = run_fixture(&fixture);

    let expected_columns: Vec<String> =
        serde_json::from_value(expected["columns"].clone()).expect("expected columns");
    assert_eq!(columns, expected_columns, "{name}: columns");

    let expected_rows = expected["rows"].as_array().expect("expected rows");
    assert_eq!(rows.len(), expected_rows.len(), "{name}: row count");

    for (i, (got, want)) in rows.iter().zip(expected_rows).enumerate() {
        for (key, value) in want.as_object().expect("expected row object") {
            if key == "absent" {
                for col in value.as_array().expect("absent list") {
                    let col = col.as_str().expect("column name");
                    assert!(got.get(col).is_none(), "{name}: row {i} should not have {col}");
                }
                continue;
            }
            assert_eq!(&got[key.as_str()], value, "{name}: row {i} field {key}");
        }
    }

    let expected_warnings = expected["warnings"].as_array().expect("expected warnings");
    assert_eq!(warnings.len(), expected_warnings.len(), "{name}: warning count {warnings:?}");
    for (got, want) in warnings.iter().zip(expected_warnings) {
        assert_eq!(Some(got.row as u64), want["row"].as_u64(), "{name}: warning row");
        assert_eq!(Some(got.warning.kind()), want["kind"].as_str(), "{name}: warning kind");
        if let Some(param) = want.get("param") {
            assert_eq!(got.warning.param(), param.as_str(), "{name}: warning param");
        }
        if let Some(message) = want.get("message") {
            assert_eq!(Some(got.warning.to_string().as_str()), message.as_str());
        }
    }
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

#[test]
fn static_arrays_golden() {
    assert_fixture("static-arrays.json");
}

#[test]
fn dynamic_params_golden() {
    assert_fixture("dynamic-params.json");
}

#[test]
fn erc20_logs_golden() {
    assert_fixture("erc20-logs.json");
}

// ─── Batch properties ─────────────────────────────────────────────────────────

#[test]
fn decoding_is_deterministic_across_runs() {
    let fixture = load_fixture("dynamic-params.json");
    let (_, first, _) = run_fixture(&fixture);
    let (_, second, _) = run_fixture(&fixture);
    assert_eq!(first, second);
}

#[test]
fn raw_encoded_columns_are_dropped() {
    let fixture = load_fixture("static-arrays.json");
    let (_, rows, _) = run_fixture(&fixture);
    let row = rows[0].as_object().expect("row object");
    assert!(!row.contains_key("function_data"));
    assert!(!row.contains_key("function_signature"));
    assert_eq!(row["from_address"], "0x59550cdee3fe8685fdb76281f5bbd9a65dc50c51");
}
