//! Decoded values.
//!
//! Integers are carried as exact `U256` all the way through the decoder and
//! only turned into `f64` at the presentation boundary ([`DecodedValue::as_f64`]
//! and `Serialize`), which is what numeric table columns expect. Integers above
//! [`MAX_SAFE_INTEGER`] may round when presented.

use alloy_primitives::U256;
use serde::{Serialize, Serializer};
use std::fmt;

/// Largest integer an `f64` represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// A value decoded from one ABI parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    /// `0x` + the low 40 hex digits of the word, case as encoded.
    Address(String),
    /// `uintN` / `intN` magnitude.
    Number(U256),
    Bool(bool),
    /// `bytesN`: the word's hex digits, unprefixed.
    FixedBytes(String),
    /// Dynamic `bytes`: exactly `len` bytes as unprefixed hex.
    Bytes(String),
    Str(String),
    /// An undecoded data word (unprefixed hex) or topic (verbatim).
    RawWord(String),
    Array(Vec<DecodedValue>),
}

impl DecodedValue {
    pub fn as_address(&self) -> Option<&str> {
        match self {
            DecodedValue::Address(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<U256> {
        match self {
            DecodedValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Presentation conversion for numbers. Exact up to [`MAX_SAFE_INTEGER`].
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(u256_to_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DecodedValue]> {
        match self {
            DecodedValue::Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

/// Nearest `f64` to `value` (round-half-even).
pub fn u256_to_f64(value: U256) -> f64 {
    if let Ok(small) = u64::try_from(value) {
        return small as f64;
    }
    value.to_string().parse().unwrap_or(f64::INFINITY)
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Number(v) => serializer.serialize_f64(u256_to_f64(*v)),
            DecodedValue::Bool(b) => serializer.serialize_bool(*b),
            DecodedValue::Address(s)
            | DecodedValue::FixedBytes(s)
            | DecodedValue::Bytes(s)
            | DecodedValue::Str(s)
            | DecodedValue::RawWord(s) => serializer.serialize_str(s),
            DecodedValue::Array(items) => serializer.collect_seq(items),
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Number(v) => write!(f, "{v}"),
            DecodedValue::Bool(b) => write!(f, "{b}"),
            DecodedValue::Address(s)
            | DecodedValue::FixedBytes(s)
            | DecodedValue::Bytes(s)
            | DecodedValue::Str(s)
            | DecodedValue::RawWord(s) => write!(f, "{s}"),
            DecodedValue::Array(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}
