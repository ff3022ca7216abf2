//! The Indexable Graph contract (§6, consumed interface).
//!
//! This is the abstraction boundary the core adapter is built against. The
//! concrete backing graph engine is an external collaborator and out of
//! scope for this crate (§1); `memory.rs` supplies a minimal reference
//! implementation used by this crate's own tests.

use std::fmt;

/// A backing property graph the adapter can store RDF statements on.
///
/// Implementors provide vertices and edges, per-element string properties,
/// and named automatic indexes that reindex whenever a tracked property is
/// set. Transactional capability (manual begin/commit/rollback) is optional;
/// a non-transactional backing graph is expected to auto-commit every call.
pub trait IndexableGraph: Send + Sync {
    type VertexId: Copy + Eq + std::hash::Hash + fmt::Debug + Send + Sync + 'static;
    type EdgeId: Copy + Eq + std::hash::Hash + fmt::Debug + Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    fn add_vertex(&self) -> Result<Self::VertexId, Self::Error>;
    fn add_edge(
        &self,
        source: Self::VertexId,
        label: &str,
        target: Self::VertexId,
    ) -> Result<Self::EdgeId, Self::Error>;
    fn remove_vertex(&self, vertex: Self::VertexId) -> Result<(), Self::Error>;
    fn remove_edge(&self, edge: Self::EdgeId) -> Result<(), Self::Error>;

    fn get_vertices(&self) -> Result<Vec<Self::VertexId>, Self::Error>;
    fn get_edges(&self) -> Result<Vec<Self::EdgeId>, Self::Error>;

    fn get_vertex_property(
        &self,
        vertex: Self::VertexId,
        key: &str,
    ) -> Result<Option<String>, Self::Error>;

    /// Enumerate every property key/value pair currently set on `vertex`.
    fn vertex_properties(
        &self,
        vertex: Self::VertexId,
    ) -> Result<Vec<(String, String)>, Self::Error>;

    fn set_vertex_property(
        &self,
        vertex: Self::VertexId,
        key: &str,
        value: String,
    ) -> Result<(), Self::Error>;
    fn remove_vertex_property(&self, vertex: Self::VertexId, key: &str)
        -> Result<(), Self::Error>;

    fn get_edge_property(
        &self,
        edge: Self::EdgeId,
        key: &str,
    ) -> Result<Option<String>, Self::Error>;
    fn set_edge_property(
        &self,
        edge: Self::EdgeId,
        key: &str,
        value: String,
    ) -> Result<(), Self::Error>;

    fn edge_source(&self, edge: Self::EdgeId) -> Result<Self::VertexId, Self::Error>;
    fn edge_target(&self, edge: Self::EdgeId) -> Result<Self::VertexId, Self::Error>;

    fn out_edges(&self, vertex: Self::VertexId) -> Result<Vec<Self::EdgeId>, Self::Error>;
    fn in_edges(&self, vertex: Self::VertexId) -> Result<Vec<Self::EdgeId>, Self::Error>;

    /// Register `name` as an automatic index over vertex property `key`,
    /// reindexed whenever that property is set via `set_vertex_property`.
    /// Implementations must treat this as idempotent.
    fn create_vertex_index(&self, name: &str, key: &str) -> Result<(), Self::Error>;

    /// Register `name` as an automatic index over edge property `key`,
    /// reindexed whenever that property is set via `set_edge_property`.
    /// Implementations must treat this as idempotent.
    fn create_edge_index(&self, name: &str, key: &str) -> Result<(), Self::Error>;

    /// Point lookup against a named vertex automatic index.
    fn vertex_index_lookup(
        &self,
        index_name: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<Self::VertexId>, Self::Error>;

    /// Point lookup against a named edge automatic index.
    fn edge_index_lookup(
        &self,
        index_name: &str,
        key: &str,
        value: &str,
    ) -> Result<Vec<Self::EdgeId>, Self::Error>;

    /// Whether this backing graph supports manual transaction brackets.
    fn supports_manual_transactions(&self) -> bool {
        false
    }

    fn begin(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn commit(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn rollback(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Well-known automatic index names (§6).
pub const EDGES_INDEX: &str = "edges";
pub const VALUES_INDEX: &str = "values";
