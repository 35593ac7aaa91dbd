//! `abiframe schema`: build a schema from an ABI file and print its tables.

use abiframe_core::{ContractSchema, ParamMap};
use anyhow::{Context, Result};
use std::path::Path;

pub fn load(abi: &Path) -> Result<ContractSchema> {
    let json = std::fs::read_to_string(abi)
        .with_context(|| format!("read ABI file '{}'", abi.display()))?;
    abiframe_evm::build_schema(&json).with_context(|| format!("build schema from '{}'", abi.display()))
}

pub fn run(abi: &Path, as_json: bool) -> Result<()> {
    let schema = load(abi)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    println!("Functions: {}", schema.functions.len());
    for f in schema.functions.values() {
        println!("  {}  {}", f.selector, f.signature);
        print_params(&f.params, "");
    }

    let events = schema.events.len() + schema.anonymous_events.len();
    println!("Events: {events}");
    for e in schema.events.values().chain(&schema.anonymous_events) {
        println!("  {}  {}", e.key, e.signature);
        print_params(&e.topics, " [indexed]");
        print_params(&e.data, "");
    }
    Ok(())
}

fn print_params(params: &ParamMap, suffix: &str) {
    for (name, ty) in params {
        let status = if ty.is_supported() {
            ""
        } else if ty.is_opaque_word() {
            "  (raw word)"
        } else {
            "  (not yet supported)"
        };
        println!("    - {name}: {ty}{suffix}{status}");
    }
}
