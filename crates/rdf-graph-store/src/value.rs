//! Value Codec (§4.A): canonical string encoding of RDF values.
//!
//! Pure, allocation-only, no I/O. The separator is a single space; encoding
//! is injective under the assumption that language tags and datatype IRIs
//! never contain spaces (true per RFC 5646 and RFC 3986 respectively).

use crate::error::{StoreError, StoreResult};

const SEP: char = ' ';
const PREFIX_IRI: char = 'U';
const PREFIX_BLANK: char = 'B';
const PREFIX_PLAIN: char = 'P';
const PREFIX_LANG: char = 'L';
const PREFIX_TYPED: char = 'T';

/// The encoded form of a null (default-graph) context.
pub const NULL_CONTEXT: &str = "N";

/// An RDF value: an IRI, a blank node, or a literal (plain or typed).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Iri(String),
    BlankNode(String),
    PlainLiteral { label: String, lang: Option<String> },
    TypedLiteral { label: String, datatype: String },
}

impl Value {
    pub fn iri(iri: impl Into<String>) -> Self {
        Value::Iri(iri.into())
    }

    pub fn blank_node(id: impl Into<String>) -> Self {
        Value::BlankNode(id.into())
    }

    pub fn plain_literal(label: impl Into<String>) -> Self {
        Value::PlainLiteral {
            label: label.into(),
            lang: None,
        }
    }

    pub fn lang_literal(label: impl Into<String>, lang: impl Into<String>) -> Self {
        Value::PlainLiteral {
            label: label.into(),
            lang: Some(lang.into()),
        }
    }

    pub fn typed_literal(label: impl Into<String>, datatype: impl Into<String>) -> Self {
        Value::TypedLiteral {
            label: label.into(),
            datatype: datatype.into(),
        }
    }

    /// A blank node with a freshly generated id, for callers that don't
    /// already have a stable one to reuse.
    pub fn fresh_blank_node() -> Self {
        Value::BlankNode(uuid::Uuid::new_v4().to_string())
    }

    /// The vertex `kind` this value is stored under (§3 Vertex).
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Iri(_) => "uri",
            Value::BlankNode(_) => "bnode",
            Value::PlainLiteral { .. } | Value::TypedLiteral { .. } => "literal",
        }
    }

    /// The value's primary lexical form, stored as the vertex `value` property.
    pub fn lexical_form(&self) -> &str {
        match self {
            Value::Iri(s) => s,
            Value::BlankNode(id) => id,
            Value::PlainLiteral { label, .. } => label,
            Value::TypedLiteral { label, .. } => label,
        }
    }

    pub fn lang(&self) -> Option<&str> {
        match self {
            Value::PlainLiteral { lang, .. } => lang.as_deref(),
            _ => None,
        }
    }

    pub fn datatype(&self) -> Option<&str> {
        match self {
            Value::TypedLiteral { datatype, .. } => Some(datatype),
            _ => None,
        }
    }
}

/// `encode(value) -> string` (§4.A).
pub fn encode(value: &Value) -> String {
    match value {
        Value::Iri(iri) => format!("{PREFIX_IRI}{SEP}{iri}"),
        Value::BlankNode(id) => format!("{PREFIX_BLANK}{SEP}{id}"),
        Value::PlainLiteral { label, lang: None } => format!("{PREFIX_PLAIN}{SEP}{label}"),
        Value::PlainLiteral {
            label,
            lang: Some(lang),
        } => format!("{PREFIX_LANG}{SEP}{lang}{SEP}{label}"),
        Value::TypedLiteral { label, datatype } => {
            format!("{PREFIX_TYPED}{SEP}{datatype}{SEP}{label}")
        }
    }
}

/// `encodeContextOrNull(value?) -> string` (§4.A).
pub fn encode_context_or_null(context: Option<&Value>) -> String {
    match context {
        None => NULL_CONTEXT.to_string(),
        Some(v) => encode(v),
    }
}

/// `decode(string) -> value` (§4.A). Fails with `MalformedEncoding` when the
/// prefix is unknown or the separator structure is invalid.
pub fn decode(encoded: &str) -> StoreResult<Value> {
    let (prefix, rest) = split_prefix(encoded)?;
    match prefix {
        "U" => Ok(Value::Iri(rest.to_string())),
        "B" => Ok(Value::BlankNode(rest.to_string())),
        "P" => Ok(Value::PlainLiteral {
            label: rest.to_string(),
            lang: None,
        }),
        "L" => {
            let (lang, label) = split_prefix(rest).map_err(|_| {
                StoreError::MalformedEncoding(format!(
                    "language literal missing label: {encoded:?}"
                ))
            })?;
            Ok(Value::PlainLiteral {
                label: label.to_string(),
                lang: Some(lang.to_string()),
            })
        }
        "T" => {
            let (datatype, label) = split_prefix(rest).map_err(|_| {
                StoreError::MalformedEncoding(format!("typed literal missing label: {encoded:?}"))
            })?;
            Ok(Value::TypedLiteral {
                label: label.to_string(),
                datatype: datatype.to_string(),
            })
        }
        other => Err(StoreError::MalformedEncoding(format!(
            "unknown value prefix {other:?} in {encoded:?}"
        ))),
    }
}

/// Decode a context position, honoring the null-context sentinel.
pub fn decode_context(encoded: &str) -> StoreResult<Option<Value>> {
    if encoded == NULL_CONTEXT {
        Ok(None)
    } else {
        decode(encoded).map(Some)
    }
}

fn split_prefix(encoded: &str) -> StoreResult<(&str, &str)> {
    encoded
        .split_once(SEP)
        .ok_or_else(|| StoreError::MalformedEncoding(format!("missing separator in {encoded:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_trips_each_variant() {
        let values = vec![
            Value::iri("http://example.org/s"),
            Value::blank_node("b0"),
            Value::plain_literal("hello"),
            Value::lang_literal("hello", "en"),
            Value::typed_literal("5", "http://www.w3.org/2001/XMLSchema#int"),
        ];
        for v in values {
            assert_eq!(decode(&encode(&v)).unwrap(), v);
        }
    }

    #[test]
    fn null_context_is_not_a_value() {
        assert!(decode(NULL_CONTEXT).is_err());
        assert_eq!(decode_context(NULL_CONTEXT).unwrap(), None);
    }

    #[test]
    fn malformed_prefix_is_rejected() {
        assert!(decode("Z foo").is_err());
        assert!(decode("no-separator-here").is_err());
    }

    fn arb_no_space() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9:/#._-]{0,40}".prop_map(|s| s)
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            arb_no_space().prop_map(Value::iri),
            arb_no_space().prop_map(Value::blank_node),
            ".{0,60}".prop_map(Value::plain_literal),
            (".{0,60}", arb_no_space()).prop_map(|(label, lang)| Value::lang_literal(label, lang)),
            (".{0,60}", arb_no_space())
                .prop_map(|(label, datatype)| Value::typed_literal(label, datatype)),
        ]
    }

    proptest! {
        #[test]
        fn decode_encode_round_trip(v in arb_value()) {
            prop_assert_eq!(decode(&encode(&v)).unwrap(), v);
        }
    }
}
