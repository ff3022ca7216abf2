//! Vertex Store (§4.B): find-or-create a vertex for a value.

use crate::error::{StoreError, StoreResult};
use crate::graph::{IndexableGraph, VALUES_INDEX};
use crate::value::Value;

/// Reconstruct the `Value` a vertex was created for, reading back its
/// `kind`/`value`/`type`/`lang` properties (the inverse of
/// `VertexStore::add_vertex`).
pub fn vertex_value<G: IndexableGraph>(graph: &G, vertex: G::VertexId) -> StoreResult<Value> {
    let kind = graph
        .get_vertex_property(vertex, PROP_KIND)
        .map_err(StoreError::store_failure)?
        .ok_or_else(|| StoreError::IllegalValue(format!("vertex {vertex:?} has no kind")))?;
    let lexical = graph
        .get_vertex_property(vertex, PROP_VALUE)
        .map_err(StoreError::store_failure)?
        .ok_or_else(|| StoreError::IllegalValue(format!("vertex {vertex:?} has no value")))?;

    match kind.as_str() {
        "uri" => Ok(Value::Iri(lexical)),
        "bnode" => Ok(Value::BlankNode(lexical)),
        "literal" => {
            let datatype = graph
                .get_vertex_property(vertex, PROP_TYPE)
                .map_err(StoreError::store_failure)?;
            let lang = graph
                .get_vertex_property(vertex, PROP_LANG)
                .map_err(StoreError::store_failure)?;
            match (datatype, lang) {
                (Some(datatype), _) => Ok(Value::TypedLiteral {
                    label: lexical,
                    datatype,
                }),
                (None, lang) => Ok(Value::PlainLiteral {
                    label: lexical,
                    lang,
                }),
            }
        }
        other => Err(StoreError::IllegalValue(format!(
            "vertex {vertex:?} has unknown kind {other:?}"
        ))),
    }
}

pub const PROP_KIND: &str = "kind";
pub const PROP_VALUE: &str = "value";
pub const PROP_TYPE: &str = "type";
pub const PROP_LANG: &str = "lang";

pub struct VertexStore<'g, G: IndexableGraph> {
    graph: &'g G,
}

impl<'g, G: IndexableGraph> VertexStore<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        VertexStore { graph }
    }

    /// `findVertex(value) -> vertex?`. Queries the `values` auto-index on
    /// the `value` property, then walks the result looking for the first
    /// vertex whose attributes *match* `value` under the §4.B matching rule.
    pub fn find_vertex(&self, value: &Value) -> StoreResult<Option<G::VertexId>> {
        let candidates = self
            .graph
            .vertex_index_lookup(VALUES_INDEX, PROP_VALUE, value.lexical_form())
            .map_err(StoreError::store_failure)?;

        for vertex in candidates {
            if self.matches(vertex, value)? {
                return Ok(Some(vertex));
            }
        }
        Ok(None)
    }

    /// `addVertex(value) -> vertex`. Unconditionally creates a new vertex.
    pub fn add_vertex(&self, value: &Value) -> StoreResult<G::VertexId> {
        let vertex = self.graph.add_vertex().map_err(StoreError::store_failure)?;
        self.graph
            .set_vertex_property(vertex, PROP_KIND, value.kind().to_string())
            .map_err(StoreError::store_failure)?;
        self.graph
            .set_vertex_property(vertex, PROP_VALUE, value.lexical_form().to_string())
            .map_err(StoreError::store_failure)?;
        if let Some(datatype) = value.datatype() {
            self.graph
                .set_vertex_property(vertex, PROP_TYPE, datatype.to_string())
                .map_err(StoreError::store_failure)?;
        }
        if let Some(lang) = value.lang() {
            self.graph
                .set_vertex_property(vertex, PROP_LANG, lang.to_string())
                .map_err(StoreError::store_failure)?;
        }
        tracing::trace!(kind = value.kind(), "added vertex");
        Ok(vertex)
    }

    /// `findOrAdd(value) -> vertex`.
    pub fn find_or_add(&self, value: &Value) -> StoreResult<G::VertexId> {
        if let Some(vertex) = self.find_vertex(value)? {
            return Ok(vertex);
        }
        self.add_vertex(value)
    }

    /// The §4.B matching rule: `kind` must agree with the value's variant,
    /// and for literals the datatype/language disjunction must hold. This
    /// disjunction is deliberate, not a bug: a plain and a typed literal
    /// sharing a label and nothing else can false-match (§9 open question).
    fn matches(&self, vertex: G::VertexId, value: &Value) -> StoreResult<bool> {
        let kind = self
            .graph
            .get_vertex_property(vertex, PROP_KIND)
            .map_err(StoreError::store_failure)?;
        if kind.as_deref() != Some(value.kind()) {
            return Ok(false);
        }

        let stored_value = self
            .graph
            .get_vertex_property(vertex, PROP_VALUE)
            .map_err(StoreError::store_failure)?;
        if stored_value.as_deref() != Some(value.lexical_form()) {
            return Ok(false);
        }

        match value {
            Value::Iri(_) | Value::BlankNode(_) => Ok(true),
            Value::PlainLiteral { .. } | Value::TypedLiteral { .. } => {
                let stored_type = self
                    .graph
                    .get_vertex_property(vertex, PROP_TYPE)
                    .map_err(StoreError::store_failure)?;
                let stored_lang = self
                    .graph
                    .get_vertex_property(vertex, PROP_LANG)
                    .map_err(StoreError::store_failure)?;

                let both_absent = stored_type.is_none()
                    && stored_lang.is_none()
                    && value.datatype().is_none()
                    && value.lang().is_none();
                let types_match = match (stored_type.as_deref(), value.datatype()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                };
                let langs_match = match (stored_lang.as_deref(), value.lang()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                };

                Ok(both_absent || types_match || langs_match)
            }
        }
    }
}
