//! ABI type descriptors.
//!
//! A [`TypeDescriptor`] is parsed once per schema parameter from the textual
//! ABI type (`"uint256"`, `"bool[2]"`, `"bytes32[][3]"`, ...) and is then
//! matched on for every row, so the decoder never re-parses type strings.
//!
//! Support policy: at most two array dimensions, and at most one dynamic
//! layer, where a `[]` dimension and a dynamic base (`bytes`, `string`) each
//! count as one layer. Everything else parses to [`TypeKind::Unsupported`]
//! with the nominal number of head words it occupies, so siblings stay aligned.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of array dimensions the decoder resolves.
pub const MAX_ARRAY_DEPTH: usize = 2;

/// Leaf (non-array) ABI types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseKind {
    Address,
    /// Unsigned integer, width in bits.
    Uint(u16),
    /// Signed integer, width in bits.
    Int(u16),
    Bool,
    /// `bytes1` .. `bytes32`, length in bytes.
    FixedBytes(u8),
    /// Variable-length `bytes`.
    Bytes,
    String,
}

impl BaseKind {
    /// Parse a base token. Returns `None` for anything outside the supported grammar.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "address" => return Some(Self::Address),
            "bool" => return Some(Self::Bool),
            "string" => return Some(Self::String),
            "bytes" => return Some(Self::Bytes),
            "uint" => return Some(Self::Uint(256)),
            "int" => return Some(Self::Int(256)),
            _ => {}
        }

        if let Some(bits) = token.strip_prefix("uint") {
            return parse_int_width(bits).map(Self::Uint);
        }
        if let Some(bits) = token.strip_prefix("int") {
            return parse_int_width(bits).map(Self::Int);
        }
        if let Some(len) = token.strip_prefix("bytes") {
            let len: u8 = parse_digits(len)?;
            return (1..=32).contains(&len).then_some(Self::FixedBytes(len));
        }
        None
    }

    /// `bytes` and `string` are stored behind an offset.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Bytes | Self::String)
    }
}

fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

fn parse_int_width(bits: &str) -> Option<u16> {
    let bits: u16 = parse_digits(bits)?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseKind::Address => write!(f, "address"),
            BaseKind::Uint(bits) => write!(f, "uint{bits}"),
            BaseKind::Int(bits) => write!(f, "int{bits}"),
            BaseKind::Bool => write!(f, "bool"),
            BaseKind::FixedBytes(n) => write!(f, "bytes{n}"),
            BaseKind::Bytes => write!(f, "bytes"),
            BaseKind::String => write!(f, "string"),
        }
    }
}

/// One array dimension, as written in the type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dim {
    Fixed(usize),
    Dynamic,
}

/// Why a type string was not resolved into a decodable shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedReason {
    /// The base token is outside the grammar (`tuple`, `fixed128x18`, `uint7`, ...).
    UnknownBase,
    /// Brackets do not parse (`uint256[`, `bool[0]`, `address[x]`).
    Malformed,
    /// More than [`MAX_ARRAY_DEPTH`] dimensions.
    TooDeep,
    /// A dynamic layer nested inside another dynamic layer (`string[]`, `address[][]`).
    NestedDynamic,
}

/// Resolved shape of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Scalar(BaseKind),
    FixedArray(Box<TypeKind>, usize),
    DynamicArray(Box<TypeKind>),
    Unsupported {
        reason: UnsupportedReason,
        /// Head words the type nominally occupies.
        head_words: usize,
    },
}

impl TypeKind {
    pub fn is_dynamic(&self) -> bool {
        match self {
            TypeKind::Scalar(base) => base.is_dynamic(),
            TypeKind::FixedArray(elem, _) => elem.is_dynamic(),
            TypeKind::DynamicArray(_) => true,
            TypeKind::Unsupported { .. } => false,
        }
    }

    /// Number of 32-byte words this type takes in the head of its enclosing block.
    pub fn head_words(&self) -> usize {
        match self {
            TypeKind::Unsupported { head_words, .. } => *head_words,
            kind if kind.is_dynamic() => 1,
            TypeKind::FixedArray(elem, len) => elem.head_words().saturating_mul(*len),
            _ => 1,
        }
    }

    fn from_parts(base: BaseKind, dims: &[Dim]) -> Self {
        dims.iter()
            .rev()
            .fold(TypeKind::Scalar(base), |elem, dim| match dim {
                Dim::Fixed(len) => TypeKind::FixedArray(Box::new(elem), *len),
                Dim::Dynamic => TypeKind::DynamicArray(Box::new(elem)),
            })
    }
}

/// A parsed ABI parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// The type string exactly as declared in the ABI.
    pub raw: String,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Parse an ABI type string. Never fails: shapes outside the supported
    /// subset come back as [`TypeKind::Unsupported`].
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: resolve(raw.trim()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self.kind, TypeKind::Unsupported { .. })
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind.is_dynamic()
    }

    pub fn head_words(&self) -> usize {
        self.kind.head_words()
    }

    /// The leaf type, if the type resolved.
    pub fn base(&self) -> Option<BaseKind> {
        let mut kind = &self.kind;
        loop {
            match kind {
                TypeKind::Scalar(base) => return Some(*base),
                TypeKind::FixedArray(elem, _) | TypeKind::DynamicArray(elem) => kind = elem,
                TypeKind::Unsupported { .. } => return None,
            }
        }
    }

    /// Array dimensions, outermost first. Empty for scalars and unsupported types.
    pub fn array_dims(&self) -> Vec<Dim> {
        let mut dims = Vec::new();
        let mut kind = &self.kind;
        loop {
            match kind {
                TypeKind::FixedArray(elem, len) => {
                    dims.push(Dim::Fixed(*len));
                    kind = elem;
                }
                TypeKind::DynamicArray(elem) => {
                    dims.push(Dim::Dynamic);
                    kind = elem;
                }
                _ => return dims,
            }
        }
    }

    /// `true` for an unknown base with no array brackets. The decoder passes
    /// such a word through as raw hex instead of dropping it.
    pub fn is_opaque_word(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Unsupported { reason: UnsupportedReason::UnknownBase, .. }
        ) && !self.raw.contains('[')
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Split `base[..][..]` into the base token and its dimensions, innermost first.
fn split_dims(raw: &str) -> Option<(&str, Vec<Dim>)> {
    let (base, mut rest) = match raw.find('[') {
        Some(i) => (&raw[..i], &raw[i..]),
        None => (raw, ""),
    };
    if base.is_empty() {
        return None;
    }

    let mut dims = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let size = &inner[..close];
        dims.push(if size.is_empty() {
            Dim::Dynamic
        } else {
            Dim::Fixed(parse_digits(size)?)
        });
        rest = &inner[close + 1..];
    }
    Some((base, dims))
}

fn resolve(raw: &str) -> TypeKind {
    let Some((base_token, mut dims)) = split_dims(raw) else {
        return TypeKind::Unsupported {
            reason: UnsupportedReason::Malformed,
            head_words: 1,
        };
    };
    // outermost first
    dims.reverse();

    let nominal_words = |base_dynamic: bool| {
        if base_dynamic || dims.contains(&Dim::Dynamic) {
            1
        } else {
            dims.iter()
                .map(|d| match d {
                    Dim::Fixed(len) => *len,
                    Dim::Dynamic => 1,
                })
                .fold(1usize, |acc, len| acc.saturating_mul(len))
        }
    };

    let Some(base) = BaseKind::parse(base_token) else {
        return TypeKind::Unsupported {
            reason: UnsupportedReason::UnknownBase,
            head_words: nominal_words(false),
        };
    };

    let dynamic_layers = dims.iter().filter(|d| **d == Dim::Dynamic).count()
        + usize::from(base.is_dynamic());

    if dims.len() > MAX_ARRAY_DEPTH {
        return TypeKind::Unsupported {
            reason: UnsupportedReason::TooDeep,
            head_words: nominal_words(base.is_dynamic()),
        };
    }
    if dynamic_layers > 1 {
        return TypeKind::Unsupported {
            reason: UnsupportedReason::NestedDynamic,
            head_words: 1,
        };
    }

    TypeKind::from_parts(base, &dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(raw: &str) -> TypeKind {
        TypeDescriptor::parse(raw).kind
    }

    #[test]
    fn scalar_bases() {
        assert_eq!(kind("address"), TypeKind::Scalar(BaseKind::Address));
        assert_eq!(kind("uint256"), TypeKind::Scalar(BaseKind::Uint(256)));
        assert_eq!(kind("uint"), TypeKind::Scalar(BaseKind::Uint(256)));
        assert_eq!(kind("int8"), TypeKind::Scalar(BaseKind::Int(8)));
        assert_eq!(kind("bytes32"), TypeKind::Scalar(BaseKind::FixedBytes(32)));
        assert_eq!(kind("bytes"), TypeKind::Scalar(BaseKind::Bytes));
        assert_eq!(kind("string"), TypeKind::Scalar(BaseKind::String));
    }

    #[test]
    fn rejects_invalid_widths() {
        for raw in ["uint7", "uint264", "int0", "bytes0", "bytes33", "uint08"] {
            assert!(
                matches!(
                    kind(raw),
                    TypeKind::Unsupported { reason: UnsupportedReason::UnknownBase, .. }
                ),
                "{raw} should be an unknown base"
            );
        }
    }

    #[test]
    fn dims_are_outermost_first() {
        let ty = TypeDescriptor::parse("bool[2][3]");
        assert_eq!(ty.array_dims(), vec![Dim::Fixed(3), Dim::Fixed(2)]);
        assert_eq!(ty.base(), Some(BaseKind::Bool));
        assert_eq!(ty.head_words(), 6);
        assert!(!ty.is_dynamic());

        let ty = TypeDescriptor::parse("int8[2][]");
        assert_eq!(ty.array_dims(), vec![Dim::Dynamic, Dim::Fixed(2)]);
        assert!(ty.is_dynamic());
        assert_eq!(ty.head_words(), 1);
    }

    #[test]
    fn fixed_array_of_dynamic_is_dynamic() {
        let ty = TypeDescriptor::parse("string[3]");
        assert!(ty.is_supported());
        assert!(ty.is_dynamic());
        assert_eq!(ty.head_words(), 1);

        let ty = TypeDescriptor::parse("bytes32[][3]");
        assert!(ty.is_supported());
        assert!(ty.is_dynamic());
    }

    #[test]
    fn static_fixed_array_head_words() {
        let ty = TypeDescriptor::parse("address[11]");
        assert!(!ty.is_dynamic());
        assert_eq!(ty.head_words(), 11);
    }

    #[test]
    fn nested_dynamic_is_unsupported() {
        for raw in ["string[]", "address[][]", "bytes[][2]"] {
            let ty = TypeDescriptor::parse(raw);
            assert_eq!(
                ty.kind,
                TypeKind::Unsupported {
                    reason: UnsupportedReason::NestedDynamic,
                    head_words: 1
                },
                "{raw}"
            );
        }
    }

    #[test]
    fn too_deep_keeps_nominal_width() {
        let ty = TypeDescriptor::parse("uint8[2][3][4]");
        assert_eq!(
            ty.kind,
            TypeKind::Unsupported {
                reason: UnsupportedReason::TooDeep,
                head_words: 24
            }
        );
        let ty = TypeDescriptor::parse("uint8[][3][4]");
        assert_eq!(ty.head_words(), 1);
    }

    #[test]
    fn malformed_brackets() {
        for raw in ["uint256[", "bool[0]", "address[x]", "[2]", "uint256]"] {
            let ty = TypeDescriptor::parse(raw);
            assert!(!ty.is_supported(), "{raw}");
        }
    }

    #[test]
    fn unknown_base_with_fixed_dims() {
        let ty = TypeDescriptor::parse("fixed128x18[2]");
        assert_eq!(ty.head_words(), 2);
        assert!(!ty.is_opaque_word());
        assert!(TypeDescriptor::parse("tuple").is_opaque_word());
    }

    #[test]
    fn raw_string_is_preserved() {
        let ty = TypeDescriptor::parse("uint");
        assert_eq!(ty.raw, "uint");
        assert_eq!(ty.to_string(), "uint");
        assert_eq!(ty.base().map(|b| b.to_string()), Some("uint256".into()));
    }
}
