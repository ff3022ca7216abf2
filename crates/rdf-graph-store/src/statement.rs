//! Statement Encoder (§4.C): quads, and edge-property computation for the
//! set of enabled indexed patterns.

use crate::error::{StoreError, StoreResult};
use crate::graph::IndexableGraph;
use crate::pattern::Mask;
use crate::value::{self, Value};
use crate::vertex;

/// An RDF statement: subject, predicate, object, and an optional named-graph
/// context (`None` is the default graph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub subject: Value,
    pub predicate: Value,
    pub object: Value,
    pub context: Option<Value>,
}

impl Statement {
    pub fn new(subject: Value, predicate: Value, object: Value, context: Option<Value>) -> Self {
        Statement {
            subject,
            predicate,
            object,
            context,
        }
    }
}

/// The edge property key for `p` (always present).
pub const PROP_PREDICATE: &str = "p";
/// The edge property key for `c` (always present).
pub const PROP_CONTEXT: &str = "c";

/// Compute the composite-key edge property value for `mask` from already
/// -encoded s/p/o/c strings (fixed s→p→o→c order, joined by the codec's
/// separator, which is the same single space used inside each encoding).
pub fn composite_key(mask: Mask, s: &str, p: &str, o: &str, c: &str) -> String {
    let mut parts = Vec::with_capacity(4);
    if mask.has_s() {
        parts.push(s);
    }
    if mask.has_p() {
        parts.push(p);
    }
    if mask.has_o() {
        parts.push(o);
    }
    if mask.has_c() {
        parts.push(c);
    }
    parts.join(" ")
}

/// Every `(property_key, value)` pair to set on a new statement's edge,
/// given the canonical encodings of its four positions and the set of
/// enabled indexed patterns (already unioned with `"p"`/`"c"` by
/// `StoreConfig`). Patterns `"p"` and `"c"` alone map directly onto the
/// always-present `p`/`c` properties and are not duplicated.
pub fn edge_properties(
    enabled_patterns: &[Mask],
    s_enc: &str,
    p_enc: &str,
    o_enc: &str,
    c_enc: &str,
) -> Vec<(String, String)> {
    let mut props = vec![
        (PROP_PREDICATE.to_string(), p_enc.to_string()),
        (PROP_CONTEXT.to_string(), c_enc.to_string()),
    ];

    for &mask in enabled_patterns {
        let pattern = mask.pattern_string();
        if pattern == "p" || pattern == "c" {
            continue;
        }
        let key = composite_key(mask, s_enc, p_enc, o_enc, c_enc);
        props.push((pattern, key));
    }

    props
}

/// Decode an edge back into a `Statement`: subject/object come from the
/// edge's endpoint vertices, predicate/context from the `p`/`c` properties.
pub fn decode_edge<G: IndexableGraph>(graph: &G, edge: G::EdgeId) -> StoreResult<Statement> {
    let source = graph.edge_source(edge).map_err(StoreError::store_failure)?;
    let target = graph.edge_target(edge).map_err(StoreError::store_failure)?;
    let p_enc = graph
        .get_edge_property(edge, PROP_PREDICATE)
        .map_err(StoreError::store_failure)?
        .ok_or_else(|| StoreError::MalformedEncoding(format!("edge {edge:?} missing p property")))?;
    let c_enc = graph
        .get_edge_property(edge, PROP_CONTEXT)
        .map_err(StoreError::store_failure)?
        .ok_or_else(|| StoreError::MalformedEncoding(format!("edge {edge:?} missing c property")))?;

    Ok(Statement {
        subject: vertex::vertex_value(graph, source)?,
        predicate: value::decode(&p_enc)?,
        object: vertex::vertex_value(graph, target)?,
        context: value::decode_context(&c_enc)?,
    })
}

pub fn encode_statement(stmt: &Statement) -> (String, String, String, String) {
    (
        value::encode(&stmt.subject),
        value::encode(&stmt.predicate),
        value::encode(&stmt.object),
        value::encode_context_or_null(stmt.context.as_ref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Mask;

    #[test]
    fn pc_only_is_not_duplicated() {
        let patterns = [Mask::new(false, true, false, false), Mask::new(false, false, false, true)];
        let props = edge_properties(&patterns, "U s", "U p", "U o", "N");
        assert_eq!(props.len(), 2);
        assert!(props.iter().any(|(k, v)| k == "p" && v == "U p"));
        assert!(props.iter().any(|(k, v)| k == "c" && v == "N"));
    }

    #[test]
    fn composite_key_follows_spoc_order() {
        let mask = Mask::new(true, false, true, true);
        assert_eq!(composite_key(mask, "S", "P", "O", "C"), "S O C");
    }
}
