//! Composite Decoder: the head/tail walk over a [`WordStream`].
//!
//! Every parameter owns `head_words()` consecutive head slots. Static values
//! are read in place; a dynamic value's head slot holds a byte offset into
//! the tail, counted from the start of the enclosing block:
//!
//! - top-level parameters: the start of the payload
//! - elements of a dynamic array: the word after the length word
//! - elements of a fixed array of dynamic elements: the array's first slot
//!
//! The walk is written against an explicit cursor and the stream's spent
//! mask, both passed by exclusive reference, so there is no hidden state
//! between parameters and every call is reentrant.

use abiframe_core::{
    error::{DecodeWarning, FieldError},
    BaseKind, DecodedValue, ParamMap, TypeDescriptor, TypeKind,
};
use tracing::debug;

use crate::scalar::{decode_dynamic, decode_word, word_to_usize};
use crate::word::{WordStream, WORD_BYTES};

/// Result of decoding one parameter: a value, a warning, or both when an
/// unknown scalar is passed through as its raw word.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldOutcome {
    pub value: Option<DecodedValue>,
    pub warning: Option<DecodeWarning>,
}

impl FieldOutcome {
    fn ok(value: DecodedValue) -> Self {
        Self {
            value: Some(value),
            warning: None,
        }
    }

    fn failed(warning: DecodeWarning) -> Self {
        Self {
            value: None,
            warning: Some(warning),
        }
    }
}

/// Decode every parameter of `params` in declaration order, starting at word 0.
pub fn decode_params<'p>(
    stream: &mut WordStream<'_>,
    params: &'p ParamMap,
) -> Vec<(&'p str, FieldOutcome)> {
    let mut head = 0usize;
    params
        .iter()
        .map(|(name, ty)| (name.as_str(), decode_param(stream, &mut head, name, ty)))
        .collect()
}

/// Decode one top-level parameter at `*head` and advance the cursor past
/// its head slots, whatever the outcome.
///
/// A failure is local to the parameter: the spent mask is rolled back to
/// where it was before the attempt, and only the parameter's own head slots
/// stay claimed, so a bad offset can never lock out a sibling's tail.
pub fn decode_param(
    stream: &mut WordStream<'_>,
    head: &mut usize,
    name: &str,
    ty: &TypeDescriptor,
) -> FieldOutcome {
    let at = *head;
    let width = ty.head_words();
    *head = at.saturating_add(width);

    if !ty.is_supported() {
        stream.mark_spent(at, width);
        let warning = DecodeWarning::UnsupportedType {
            param: name.to_string(),
            ty: ty.raw.clone(),
        };
        debug!(param = name, ty = %ty, "skipping unsupported type");
        let value = if ty.is_opaque_word() {
            stream.word(at).ok().map(|w| DecodedValue::RawWord(w.to_string()))
        } else {
            None
        };
        return FieldOutcome {
            value,
            warning: Some(warning),
        };
    }

    let before = stream.snapshot();
    match decode_at(stream, 0, at, &ty.kind) {
        Ok(value) => FieldOutcome::ok(value),
        Err(e) => {
            stream.restore(before);
            stream.mark_spent(at, width);
            debug!(param = name, ty = %ty, error = %e, "field decode failed");
            FieldOutcome::failed(e.into_warning(name))
        }
    }
}

/// Decode a value whose head slot(s) start at `slot`, inside the block that
/// starts at word `base`.
fn decode_at(
    stream: &mut WordStream<'_>,
    base: usize,
    slot: usize,
    kind: &TypeKind,
) -> Result<DecodedValue, FieldError> {
    if kind.is_dynamic() {
        let target = resolve_offset(stream, base, slot)?;
        return decode_tail(stream, target, kind);
    }
    match kind {
        TypeKind::Scalar(b) => decode_word(*b, stream.consume(slot)?),
        TypeKind::FixedArray(elem, len) => {
            let step = elem.head_words();
            check_span(stream, slot, *len, step)?;
            let mut items = Vec::with_capacity(*len);
            for i in 0..*len {
                items.push(decode_at(stream, base, slot + i * step, elem)?);
            }
            Ok(DecodedValue::Array(items))
        }
        _ => Err(unsupported(kind)),
    }
}

/// Decode the tail content of a dynamic value that starts at word `at`.
fn decode_tail(
    stream: &mut WordStream<'_>,
    at: usize,
    kind: &TypeKind,
) -> Result<DecodedValue, FieldError> {
    match kind {
        TypeKind::Scalar(b @ (BaseKind::Bytes | BaseKind::String)) => {
            let len = word_to_usize(stream.consume(at)?)?;
            let run = stream.consume_run(at + 1, len.div_ceil(WORD_BYTES))?;
            decode_dynamic(*b, len, run)
        }
        TypeKind::DynamicArray(elem) => {
            let count = word_to_usize(stream.consume(at)?)?;
            let block = at + 1;
            let step = elem.head_words();
            check_span(stream, block, count, step)?;
            let mut items = Vec::with_capacity(count);
            for i in 0..count {
                items.push(decode_at(stream, block, block + i * step, elem)?);
            }
            Ok(DecodedValue::Array(items))
        }
        TypeKind::FixedArray(elem, len) => {
            check_span(stream, at, *len, 1)?;
            let mut items = Vec::with_capacity(*len);
            for i in 0..*len {
                items.push(decode_at(stream, at, at + i, elem)?);
            }
            Ok(DecodedValue::Array(items))
        }
        _ => Err(unsupported(kind)),
    }
}

/// Fail unless `count` elements of `step` head words each, starting at word
/// `start`, fit inside the payload. Array lengths come from the ABI or the
/// payload and are never trusted for allocation.
fn check_span(
    stream: &WordStream<'_>,
    start: usize,
    count: usize,
    step: usize,
) -> Result<(), FieldError> {
    let fits = count
        .checked_mul(step)
        .and_then(|n| n.checked_add(start))
        .is_some_and(|end| end <= stream.len());
    if fits {
        Ok(())
    } else {
        Err(FieldError::MalformedOffset(format!(
            "{count} elements of {step} words at word {start} run past the end of a {}-word payload",
            stream.len()
        )))
    }
}

/// Read the offset in `slot` and turn it into an absolute word index.
fn resolve_offset(stream: &mut WordStream<'_>, base: usize, slot: usize) -> Result<usize, FieldError> {
    let offset = word_to_usize(stream.consume(slot)?)?;
    if offset % WORD_BYTES != 0 {
        return Err(FieldError::MalformedOffset(format!(
            "offset {offset} is not a multiple of {WORD_BYTES}"
        )));
    }
    base.checked_add(offset / WORD_BYTES)
        .filter(|target| *target < stream.len())
        .ok_or_else(|| {
            FieldError::MalformedOffset(format!(
                "offset {offset} points past the end of a {}-word payload",
                stream.len()
            ))
        })
}

fn unsupported(kind: &TypeKind) -> FieldError {
    FieldError::Unsupported {
        ty: format!("{kind:?}"),
    }
}
