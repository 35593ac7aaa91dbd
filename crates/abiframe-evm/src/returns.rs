//! Helpers for `eth_call` return data of ERC-20 style getters.

use abiframe_core::{DecodedValue, TypeDescriptor};
use alloy_primitives::U256;

use crate::composite::decode_param;
use crate::scalar::word_to_u256;
use crate::word::WordStream;

/// Decode a `string` return value. Older tokens return `bytes32` instead,
/// right-padded with zeros; that form is accepted as a fallback.
pub fn decode_string_return(data: &str) -> Option<String> {
    let mut stream = WordStream::from_hex(data).ok()?;
    if stream.is_empty() {
        return None;
    }

    let mut head = 0;
    let ty = TypeDescriptor::parse("string");
    if let Some(DecodedValue::Str(s)) = decode_param(&mut stream, &mut head, "return", &ty).value {
        return Some(s);
    }

    let bytes = hex::decode(stream.word(0).ok()?).ok()?;
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8(bytes[..end].to_vec()).ok()
}

/// Decode a `uint` return value from the first word.
pub fn decode_uint_return(data: &str) -> Option<U256> {
    let stream = WordStream::from_hex(data).ok()?;
    word_to_u256(stream.word(0).ok()?).ok()
}
