//! Indexed event parameters.
//!
//! # Topic encoding rules
//! - **Value types** (uint, int, bool, address, bytesN) are padded to 32
//!   bytes and stored directly, so they decode like any head word.
//! - **Reference types** (string, bytes, arrays) are stored as the keccak256
//!   of their encoding. The value is unrecoverable, so the topic is passed
//!   through unchanged with a warning.

use abiframe_core::{error::DecodeWarning, DecodedValue, TypeDescriptor, TypeKind};

use crate::composite::FieldOutcome;
use crate::scalar::decode_word;
use crate::word::WORD_HEX;

/// Decode one topic as the indexed parameter `name` of type `ty`.
pub fn decode_topic(name: &str, ty: &TypeDescriptor, topic: &str) -> FieldOutcome {
    let hex = topic.strip_prefix("0x").unwrap_or(topic);
    if hex.len() != WORD_HEX || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return FieldOutcome {
            value: None,
            warning: Some(DecodeWarning::MalformedPayload {
                detail: format!("topic for {name} is not a 32-byte hex word"),
            }),
        };
    }

    let raw = || Some(DecodedValue::RawWord(topic.to_string()));

    if ty.is_opaque_word() {
        return FieldOutcome {
            value: raw(),
            warning: Some(DecodeWarning::UnsupportedType {
                param: name.to_string(),
                ty: ty.raw.clone(),
            }),
        };
    }

    match &ty.kind {
        TypeKind::Scalar(base) if !base.is_dynamic() => match decode_word(*base, hex) {
            Ok(value) => FieldOutcome {
                value: Some(value),
                warning: None,
            },
            Err(e) => FieldOutcome {
                value: None,
                warning: Some(e.into_warning(name)),
            },
        },
        _ => FieldOutcome {
            value: raw(),
            warning: Some(DecodeWarning::TopicTypeUnsupported {
                param: name.to_string(),
                ty: ty.raw.clone(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    const FROM: &str = "0x00000000000000000000000059550cdee3fe8685fdb76281f5bbd9a65dc50c51";

    #[test]
    fn address_topic() {
        let out = decode_topic("from", &TypeDescriptor::parse("address"), FROM);
        assert_eq!(
            out.value,
            Some(DecodedValue::Address(
                "0x59550cdee3fe8685fdb76281f5bbd9a65dc50c51".into()
            ))
        );
        assert!(out.warning.is_none());
    }

    #[test]
    fn uint_topic() {
        let topic = format!("0x{:0>64}", "3e8");
        let out = decode_topic("id", &TypeDescriptor::parse("uint256"), &topic);
        assert_eq!(out.value, Some(DecodedValue::Number(U256::from(1000u64))));
    }

    #[test]
    fn fixed_array_topic_is_passed_through() {
        let topic = "0x9a8b3c1d0000000000000000000000000000000000000000000000000000abcd";
        let out = decode_topic("ids", &TypeDescriptor::parse("bytes32[4]"), topic);
        assert_eq!(out.value, Some(DecodedValue::RawWord(topic.to_string())));
        assert_eq!(
            out.warning.unwrap().to_string(),
            "bytes32[4] is not yet supported passed as topic"
        );
    }

    #[test]
    fn dynamic_topics_are_passed_through() {
        for ty in ["string", "bytes", "uint256[]", "string[]"] {
            let out = decode_topic("x", &TypeDescriptor::parse(ty), FROM);
            assert_eq!(out.value, Some(DecodedValue::RawWord(FROM.to_string())), "{ty}");
            assert_eq!(
                out.warning.as_ref().map(|w| w.kind()),
                Some("topic_type_unsupported"),
                "{ty}"
            );
        }
    }

    #[test]
    fn malformed_topic() {
        let out = decode_topic("from", &TypeDescriptor::parse("address"), "0x1234");
        assert!(out.value.is_none());
        assert_eq!(out.warning.map(|w| w.kind()), Some("malformed_payload"));
    }
}
