//! Schema Builder: ABI document → selector and event-hash lookup tables.
//!
//! Building is pure and idempotent. Selectors and hashes are computed from
//! the canonical signature `name(type1,type2,...)` written with the ABI's
//! declared type strings; each parameter type is parsed once into a
//! [`TypeDescriptor`].

use abiframe_core::{
    error::SchemaError,
    schema::{AbiEntry, AbiParam, ContractSchema, EventKey, EventSchema, FunctionSchema, ParamMap},
    TypeDescriptor,
};
use tracing::debug;

use crate::fingerprint;

/// Parse an ABI JSON document and build the contract schema.
pub fn build_schema(abi_json: &str) -> Result<ContractSchema, SchemaError> {
    let value: serde_json::Value = serde_json::from_str(abi_json)?;
    build_schema_from_value(&value)
}

/// Build from an already-parsed ABI document (a JSON array of entries).
pub fn build_schema_from_value(value: &serde_json::Value) -> Result<ContractSchema, SchemaError> {
    let items = value.as_array().ok_or_else(|| SchemaError::InvalidEntry {
        index: 0,
        reason: "ABI document is not a JSON array".into(),
    })?;

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            return Err(SchemaError::InvalidEntry {
                index,
                reason: "entry is not an object".into(),
            });
        }
        let entry: AbiEntry =
            serde_json::from_value(item.clone()).map_err(|e| SchemaError::InvalidEntry {
                index,
                reason: e.to_string(),
            })?;
        entries.push(entry);
    }
    build_schema_from_entries(&entries)
}

/// Build from typed ABI entries. Entries other than functions and events
/// (constructor, fallback, receive, error) are ignored.
pub fn build_schema_from_entries(entries: &[AbiEntry]) -> Result<ContractSchema, SchemaError> {
    let mut schema = ContractSchema::default();

    for (index, entry) in entries.iter().enumerate() {
        match entry.entry_type.as_str() {
            "function" => {
                require_name(entry, index)?;
                let func = function_schema(entry);
                debug!(selector = %func.selector, signature = %func.signature, "function");
                schema.functions.entry(func.selector.clone()).or_insert(func);
            }
            "event" => {
                require_name(entry, index)?;
                let event = event_schema(entry);
                debug!(key = %event.key, signature = %event.signature, "event");
                match &event.key {
                    EventKey::Hash(hash) => {
                        schema.events.entry(hash.clone()).or_insert(event);
                    }
                    EventKey::Anonymous => schema.anonymous_events.push(event),
                }
            }
            _ => {}
        }
    }

    Ok(schema)
}

fn require_name(entry: &AbiEntry, index: usize) -> Result<(), SchemaError> {
    if entry.name.is_empty() {
        return Err(SchemaError::InvalidEntry {
            index,
            reason: format!("{} entry has no name", entry.entry_type),
        });
    }
    Ok(())
}

/// `name(type1,type2,...)` with `tuple` types expanded from their components.
pub fn canonical_signature(entry: &AbiEntry) -> String {
    let types: Vec<String> = entry.inputs.iter().map(canonical_type).collect();
    format!("{}({})", entry.name, types.join(","))
}

fn canonical_type(param: &AbiParam) -> String {
    match param.ty.strip_prefix("tuple") {
        Some(dims) if !param.components.is_empty() => {
            let inner: Vec<String> = param.components.iter().map(canonical_type).collect();
            format!("({}){}", inner.join(","), dims)
        }
        _ => param.ty.clone(),
    }
}

/// Name for the parameter at `position`. Empty or repeated names fall back
/// to `arg<position>` so every parameter keeps its own column.
fn param_name(param: &AbiParam, position: usize, taken: &ParamMap) -> String {
    if param.name.is_empty() || taken.contains_key(&param.name) {
        format!("arg{position}")
    } else {
        param.name.clone()
    }
}

fn function_schema(entry: &AbiEntry) -> FunctionSchema {
    let signature = canonical_signature(entry);
    let mut params = ParamMap::new();
    for (i, input) in entry.inputs.iter().enumerate() {
        let name = param_name(input, i, &params);
        params.insert(name, TypeDescriptor::parse(&input.ty));
    }
    FunctionSchema {
        selector: fingerprint::function_selector(&signature),
        name: entry.name.clone(),
        signature,
        params,
    }
}

fn event_schema(entry: &AbiEntry) -> EventSchema {
    let signature = canonical_signature(entry);
    let mut topics = ParamMap::new();
    let mut data = ParamMap::new();
    for (i, input) in entry.inputs.iter().enumerate() {
        let target = if input.indexed { &mut topics } else { &mut data };
        let name = param_name(input, i, target);
        target.insert(name, TypeDescriptor::parse(&input.ty));
    }
    let key = if entry.anonymous {
        EventKey::Anonymous
    } else {
        EventKey::Hash(fingerprint::event_hash(&signature))
    };
    EventSchema {
        key,
        name: entry.name.clone(),
        signature,
        topics,
        data,
    }
}
