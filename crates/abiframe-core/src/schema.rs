//! Contract schemas built from an ABI document.
//!
//! The serde types at the top mirror the ABI JSON published by contract
//! registries. The schema types below are the lookup tables the row
//! assembler uses: selector → function, event hash → event.

use crate::descriptor::TypeDescriptor;
use crate::error::DecodeWarning;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of an ABI document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AbiEntry {
    /// `function`, `event`, `constructor`, `fallback`, `receive`, `error`.
    /// Omitted means `function`.
    #[serde(rename = "type", default = "default_entry_type")]
    pub entry_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub anonymous: bool,
}

fn default_entry_type() -> String {
    "function".into()
}

/// One input parameter of an ABI entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub indexed: bool,
    /// Tuple members, only present for `tuple` types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
}

/// Ordered parameter name → type. Order is the ABI declaration order and
/// drives positional decoding.
pub type ParamMap = IndexMap<String, TypeDescriptor>;

/// A function entry keyed by its 4-byte selector.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSchema {
    /// `0x` + 8 lowercase hex digits.
    pub selector: String,
    pub name: String,
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub signature: String,
    pub params: ParamMap,
}

/// How an event is found in a log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum EventKey {
    /// Full keccak256 of the signature, carried in `topics[0]`.
    Hash(String),
    /// Anonymous events carry no signature topic.
    Anonymous,
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Hash(h) => write!(f, "{h}"),
            EventKey::Anonymous => write!(f, "Anonymous"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventSchema {
    pub key: EventKey,
    pub name: String,
    pub signature: String,
    /// Indexed parameters, one topic each.
    pub topics: ParamMap,
    /// Non-indexed parameters, ABI-encoded in the log data.
    pub data: ParamMap,
}

/// The event selected for a log and the topic index its indexed params start at.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEvent<'a> {
    pub event: &'a EventSchema,
    pub first_topic: usize,
}

/// Lookup tables for one contract.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContractSchema {
    /// selector → function, in ABI order
    pub functions: IndexMap<String, FunctionSchema>,
    /// event hash → event, in ABI order
    pub events: IndexMap<String, EventSchema>,
    /// events marked `anonymous` in the ABI
    pub anonymous_events: Vec<EventSchema>,
}

impl ContractSchema {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.events.is_empty() && self.anonymous_events.is_empty()
    }

    /// Case-insensitive selector lookup.
    pub fn function(&self, selector: &str) -> Option<&FunctionSchema> {
        self.functions
            .get(selector)
            .or_else(|| self.functions.get(&selector.to_ascii_lowercase()))
    }

    /// Pick the event layout for a log from its first topic.
    ///
    /// A matching hash wins. Otherwise a single anonymous event is used, with
    /// its indexed parameters starting at `topics[0]`.
    pub fn resolve_event(&self, topic0: Option<&str>) -> Result<ResolvedEvent<'_>, DecodeWarning> {
        if let Some(topic0) = topic0 {
            let found = self
                .events
                .get(topic0)
                .or_else(|| self.events.get(&topic0.to_ascii_lowercase()));
            if let Some(event) = found {
                return Ok(ResolvedEvent {
                    event,
                    first_topic: 1,
                });
            }
        }

        match self.anonymous_events.as_slice() {
            [event] => Ok(ResolvedEvent {
                event,
                first_topic: 0,
            }),
            [] => Err(DecodeWarning::UnknownSelector {
                selector: topic0.unwrap_or_default().to_string(),
            }),
            many => Err(DecodeWarning::AmbiguousAnonymousEvent { count: many.len() }),
        }
    }

    /// `param_<name>` columns across all functions, ABI order, deduplicated.
    pub fn function_columns(&self) -> Vec<String> {
        let cols: IndexSet<String> = self
            .functions
            .values()
            .flat_map(|f| f.params.keys().map(|n| param_column(n)))
            .collect();
        cols.into_iter().collect()
    }

    /// `topic_<name>` / `data_<name>` columns across all events, ABI order, deduplicated.
    pub fn event_columns(&self) -> Vec<String> {
        let cols: IndexSet<String> = self
            .events
            .values()
            .chain(self.anonymous_events.iter())
            .flat_map(|e| {
                e.topics
                    .keys()
                    .map(|n| topic_column(n))
                    .chain(e.data.keys().map(|n| data_column(n)))
            })
            .collect();
        cols.into_iter().collect()
    }
}

pub fn param_column(name: &str) -> String {
    format!("param_{name}")
}

pub fn topic_column(name: &str) -> String {
    format!("topic_{name}")
}

pub fn data_column(name: &str) -> String {
    format!("data_{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(key: EventKey, name: &str) -> EventSchema {
        let mut topics = ParamMap::new();
        topics.insert("from".into(), TypeDescriptor::parse("address"));
        let mut data = ParamMap::new();
        data.insert("value".into(), TypeDescriptor::parse("uint256"));
        EventSchema {
            key,
            name: name.into(),
            signature: format!("{name}(address,uint256)"),
            topics,
            data,
        }
    }

    #[test]
    fn abi_entry_defaults() {
        let entry: AbiEntry =
            serde_json::from_str(r#"{"name":"f","inputs":[{"name":"a","type":"uint8"}]}"#).unwrap();
        assert_eq!(entry.entry_type, "function");
        assert!(!entry.anonymous);
        assert!(!entry.inputs[0].indexed);
    }

    #[test]
    fn resolve_by_hash_is_case_insensitive() {
        let mut schema = ContractSchema::default();
        schema
            .events
            .insert("0xddf2".into(), event(EventKey::Hash("0xddf2".into()), "Transfer"));
        let resolved = schema.resolve_event(Some("0xDDF2")).unwrap();
        assert_eq!(resolved.event.name, "Transfer");
        assert_eq!(resolved.first_topic, 1);
    }

    #[test]
    fn single_anonymous_event_starts_at_topic_zero() {
        let mut schema = ContractSchema::default();
        schema.anonymous_events.push(event(EventKey::Anonymous, "Anon"));
        let resolved = schema.resolve_event(Some("0xabc")).unwrap();
        assert_eq!(resolved.event.name, "Anon");
        assert_eq!(resolved.first_topic, 0);
    }

    #[test]
    fn several_anonymous_events_are_ambiguous() {
        let mut schema = ContractSchema::default();
        schema.anonymous_events.push(event(EventKey::Anonymous, "A"));
        schema.anonymous_events.push(event(EventKey::Anonymous, "B"));
        let err = schema.resolve_event(Some("0xabc")).unwrap_err();
        assert_eq!(err, DecodeWarning::AmbiguousAnonymousEvent { count: 2 });
    }

    #[test]
    fn unknown_hash_without_anonymous_events() {
        let schema = ContractSchema::default();
        let err = schema.resolve_event(Some("0xabc")).unwrap_err();
        assert_eq!(err.kind(), "unknown_selector");
    }

    #[test]
    fn event_columns_are_prefixed_and_deduplicated() {
        let mut schema = ContractSchema::default();
        schema
            .events
            .insert("0x1".into(), event(EventKey::Hash("0x1".into()), "A"));
        schema
            .events
            .insert("0x2".into(), event(EventKey::Hash("0x2".into()), "B"));
        assert_eq!(schema.event_columns(), vec!["topic_from", "data_value"]);
    }
}
