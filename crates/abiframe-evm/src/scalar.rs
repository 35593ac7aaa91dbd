//! Scalar Decoder: one word, or one length-prefixed byte run, into a value.

use abiframe_core::{error::FieldError, BaseKind, DecodedValue};
use alloy_primitives::U256;

use crate::word::WORD_HEX;

/// Decode a static base type from one 64-hex-digit word.
pub fn decode_word(base: BaseKind, word: &str) -> Result<DecodedValue, FieldError> {
    match base {
        BaseKind::Address => Ok(DecodedValue::Address(format!("0x{}", &word[WORD_HEX - 40..]))),
        // intN is read as an unsigned magnitude, no sign extension.
        BaseKind::Uint(_) | BaseKind::Int(_) => word_to_u256(word).map(DecodedValue::Number),
        BaseKind::Bool => Ok(DecodedValue::Bool(word.bytes().any(|b| b != b'0'))),
        BaseKind::FixedBytes(_) => Ok(DecodedValue::FixedBytes(word.to_string())),
        BaseKind::Bytes | BaseKind::String => Err(FieldError::Unsupported {
            ty: format!("{base} read as a single word"),
        }),
    }
}

/// Decode `bytes` / `string` from the words following a length word.
/// `run` must hold at least `len` bytes; anything past `len` is padding.
pub fn decode_dynamic(base: BaseKind, len: usize, run: &str) -> Result<DecodedValue, FieldError> {
    let hex = run.get(..len.saturating_mul(2)).ok_or_else(|| {
        FieldError::MalformedOffset(format!("length {len} exceeds the {}-byte run", run.len() / 2))
    })?;
    match base {
        BaseKind::Bytes => Ok(DecodedValue::Bytes(hex.to_string())),
        BaseKind::String => {
            let bytes = hex::decode(hex).map_err(|e| FieldError::InvalidUtf8(e.to_string()))?;
            String::from_utf8(bytes)
                .map(DecodedValue::Str)
                .map_err(|e| FieldError::InvalidUtf8(e.to_string()))
        }
        other => Err(FieldError::Unsupported {
            ty: format!("{other} read as a byte run"),
        }),
    }
}

pub fn word_to_u256(word: &str) -> Result<U256, FieldError> {
    U256::from_str_radix(word, 16)
        .map_err(|e| FieldError::MalformedOffset(format!("word is not a number: {e}")))
}

/// A length or offset word as a native index.
pub fn word_to_usize(word: &str) -> Result<usize, FieldError> {
    let value = word_to_u256(word)?;
    usize::try_from(value)
        .map_err(|_| FieldError::MalformedOffset(format!("{value} does not fit in a word index")))
}
