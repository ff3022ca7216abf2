//! Namespace Table (§4.I): prefix↔IRI map held as properties on one
//! reference vertex, found by its reserved `value` property.

use crate::error::{StoreError, StoreResult};
use crate::graph::{IndexableGraph, VALUES_INDEX};
use crate::vertex::PROP_VALUE;

/// The reserved `value` property identifying the namespace vertex (§3
/// invariant 4).
pub const RESERVED_NAMESPACE_ID: &str = "urn:rdf-graph-store:namespaces";

/// Handle to the namespace vertex, resolved once at store open.
pub struct NamespaceTable<G: IndexableGraph> {
    vertex: G::VertexId,
}

impl<G: IndexableGraph> NamespaceTable<G> {
    /// Find the namespace vertex, creating it if this is the first open.
    pub fn open(graph: &G) -> StoreResult<Self> {
        let candidates = graph
            .vertex_index_lookup(VALUES_INDEX, PROP_VALUE, RESERVED_NAMESPACE_ID)
            .map_err(StoreError::store_failure)?;

        let vertex = match candidates.into_iter().next() {
            Some(v) => v,
            None => {
                let v = graph.add_vertex().map_err(StoreError::store_failure)?;
                graph
                    .set_vertex_property(v, PROP_VALUE, RESERVED_NAMESPACE_ID.to_string())
                    .map_err(StoreError::store_failure)?;
                tracing::debug!("created namespace vertex");
                v
            }
        };

        Ok(NamespaceTable { vertex })
    }

    pub fn set_namespace(&self, graph: &G, prefix: &str, iri: &str) -> StoreResult<()> {
        graph
            .set_vertex_property(self.vertex, prefix, iri.to_string())
            .map_err(StoreError::store_failure)
    }

    pub fn get_namespace(&self, graph: &G, prefix: &str) -> StoreResult<Option<String>> {
        graph
            .get_vertex_property(self.vertex, prefix)
            .map_err(StoreError::store_failure)
    }

    pub fn remove_namespace(&self, graph: &G, prefix: &str) -> StoreResult<()> {
        if let Err(err) = graph.remove_vertex_property(self.vertex, prefix) {
            tracing::warn!(error = %err, prefix, "failed to remove namespace, ignoring");
        }
        Ok(())
    }

    /// `getNamespaces()`: every property on the namespace vertex except the
    /// reserved id marker.
    pub fn get_namespaces(&self, graph: &G) -> StoreResult<Vec<(String, String)>> {
        let props = graph
            .vertex_properties(self.vertex)
            .map_err(StoreError::store_failure)?;
        Ok(props.into_iter().filter(|(k, _)| k != PROP_VALUE).collect())
    }
}
