//! Error and warning types for the abiframe decode pipeline.
//!
//! Only [`SchemaError`] is fatal. Everything raised while decoding rows is a
//! [`DecodeWarning`] scoped to one field or one row; a batch never aborts.

use serde::Serialize;
use thiserror::Error;

/// Non-fatal, field- or row-local decode conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeWarning {
    #[error("no ABI entry for selector {selector}")]
    UnknownSelector { selector: String },

    #[error("{ty} is not yet supported")]
    UnsupportedType { param: String, ty: String },

    #[error("{ty} is not yet supported passed as topic")]
    TopicTypeUnsupported { param: String, ty: String },

    #[error("malformed offset for {param}: {detail}")]
    MalformedOffset { param: String, detail: String },

    #[error("{param} is not valid UTF-8: {detail}")]
    StringDecodeFailure { param: String, detail: String },

    #[error("{count} anonymous events in ABI, cannot resolve log layout")]
    AmbiguousAnonymousEvent { count: usize },

    #[error("log has no topic {index} for indexed parameter {param}")]
    MissingTopic { param: String, index: usize },

    #[error("malformed payload: {detail}")]
    MalformedPayload { detail: String },
}

impl DecodeWarning {
    /// Stable short name, used to group warnings in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeWarning::UnknownSelector { .. } => "unknown_selector",
            DecodeWarning::UnsupportedType { .. } => "unsupported_type",
            DecodeWarning::TopicTypeUnsupported { .. } => "topic_type_unsupported",
            DecodeWarning::MalformedOffset { .. } => "malformed_offset",
            DecodeWarning::StringDecodeFailure { .. } => "string_decode_failure",
            DecodeWarning::AmbiguousAnonymousEvent { .. } => "ambiguous_anonymous_event",
            DecodeWarning::MissingTopic { .. } => "missing_topic",
            DecodeWarning::MalformedPayload { .. } => "malformed_payload",
        }
    }

    /// The parameter this warning is scoped to, if it is field-local.
    pub fn param(&self) -> Option<&str> {
        match self {
            DecodeWarning::UnsupportedType { param, .. }
            | DecodeWarning::TopicTypeUnsupported { param, .. }
            | DecodeWarning::MalformedOffset { param, .. }
            | DecodeWarning::StringDecodeFailure { param, .. }
            | DecodeWarning::MissingTopic { param, .. } => Some(param),
            _ => None,
        }
    }
}

/// A failure while decoding one parameter from a word stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0}")]
    MalformedOffset(String),

    #[error("{0}")]
    InvalidUtf8(String),

    #[error("{ty} is not yet supported")]
    Unsupported { ty: String },
}

impl FieldError {
    /// Attach the parameter name.
    pub fn into_warning(self, param: &str) -> DecodeWarning {
        let param = param.to_string();
        match self {
            FieldError::MalformedOffset(detail) => DecodeWarning::MalformedOffset { param, detail },
            FieldError::InvalidUtf8(detail) => DecodeWarning::StringDecodeFailure { param, detail },
            FieldError::Unsupported { ty } => DecodeWarning::UnsupportedType { param, ty },
        }
    }
}

/// A payload that cannot be split into 32-byte words.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("payload length {len} is not a multiple of 64 hex characters")]
    NotWordAligned { len: usize },

    #[error("payload contains non-hex character at position {position}")]
    InvalidHex { position: usize },
}

impl From<PayloadError> for DecodeWarning {
    fn from(e: PayloadError) -> Self {
        DecodeWarning::MalformedPayload {
            detail: e.to_string(),
        }
    }
}

/// Fatal errors while building a schema from an ABI document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid ABI JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid ABI entry #{index}: {reason}")]
    InvalidEntry { index: usize, reason: String },
}
