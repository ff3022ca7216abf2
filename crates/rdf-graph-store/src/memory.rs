//! In-memory reference backing graph (SPEC_FULL.md component N).
//!
//! The production backing graph is an external collaborator (§1, §6); this
//! is a minimal, dependency-free `IndexableGraph` used by this crate's own
//! unit and integration tests and doc examples. It is not part of the public
//! contract the spec describes — just a stand-in property graph good enough
//! to exercise every matcher path.

use std::collections::HashMap;
use std::convert::Infallible;

use parking_lot::RwLock;

use crate::graph::IndexableGraph;

#[derive(Debug, Default, Clone)]
struct VertexRecord {
    properties: HashMap<String, String>,
    out_edges: Vec<u64>,
    in_edges: Vec<u64>,
}

#[derive(Debug, Clone)]
struct EdgeRecord {
    source: u64,
    target: u64,
    properties: HashMap<String, String>,
}

/// `(index_name, property_key)` -> `value -> element ids`.
type IndexMap<Id> = HashMap<(String, String), HashMap<String, Vec<Id>>>;

#[derive(Default, Clone)]
struct Inner {
    vertices: HashMap<u64, VertexRecord>,
    edges: HashMap<u64, EdgeRecord>,
    next_vertex_id: u64,
    next_edge_id: u64,
    vertex_indexes: IndexMap<u64>,
    edge_indexes: IndexMap<u64>,
    /// `(index_name, property_key)` pairs registered via
    /// `create_vertex_index`/`create_edge_index`, so `set_*_property` knows
    /// which keys to reindex on write.
    tracked_vertex_keys: Vec<(String, String)>,
    tracked_edge_keys: Vec<(String, String)>,
}

/// A minimal in-process property graph: vertices and edges with string
/// properties, plus automatic indexes that reindex on every tracked
/// property write. Not transactional (`supports_manual_transactions` is
/// `false`); every call auto-commits.
#[derive(Default)]
pub struct MemoryGraph {
    inner: RwLock<Inner>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        MemoryGraph::default()
    }

    fn reindex_vertex(inner: &mut Inner, vertex: u64, key: &str, value: &str) {
        for (index_name, tracked_key) in inner.tracked_vertex_keys.clone() {
            if tracked_key != key {
                continue;
            }
            inner
                .vertex_indexes
                .entry((index_name, tracked_key))
                .or_default()
                .entry(value.to_string())
                .or_default()
                .push(vertex);
        }
    }

    fn reindex_edge(inner: &mut Inner, edge: u64, key: &str, value: &str) {
        for (index_name, tracked_key) in inner.tracked_edge_keys.clone() {
            if tracked_key != key {
                continue;
            }
            inner
                .edge_indexes
                .entry((index_name, tracked_key))
                .or_default()
                .entry(value.to_string())
                .or_default()
                .push(edge);
        }
    }

    fn unindex_vertex_property(inner: &mut Inner, vertex: u64, key: &str, old_value: &str) {
        for (index_name, tracked_key) in inner.tracked_vertex_keys.clone() {
            if tracked_key != key {
                continue;
            }
            if let Some(bucket) = inner.vertex_indexes.get_mut(&(index_name, tracked_key)) {
                if let Some(ids) = bucket.get_mut(old_value) {
                    ids.retain(|id| *id != vertex);
                }
            }
        }
    }
}

impl IndexableGraph for MemoryGraph {
    type VertexId = u64;
    type EdgeId = u64;
    type Error = Infallible;

    fn add_vertex(&self) -> Result<u64, Infallible> {
        let mut inner = self.inner.write();
        let id = inner.next_vertex_id;
        inner.next_vertex_id += 1;
        inner.vertices.insert(id, VertexRecord::default());
        Ok(id)
    }

    fn add_edge(&self, source: u64, _label: &str, target: u64) -> Result<u64, Infallible> {
        let mut inner = self.inner.write();
        let id = inner.next_edge_id;
        inner.next_edge_id += 1;
        inner.edges.insert(
            id,
            EdgeRecord {
                source,
                target,
                properties: HashMap::new(),
            },
        );
        if let Some(v) = inner.vertices.get_mut(&source) {
            v.out_edges.push(id);
        }
        if let Some(v) = inner.vertices.get_mut(&target) {
            v.in_edges.push(id);
        }
        Ok(id)
    }

    fn remove_vertex(&self, vertex: u64) -> Result<(), Infallible> {
        let mut inner = self.inner.write();
        if let Some(record) = inner.vertices.remove(&vertex) {
            for (key, value) in record.properties {
                Self::unindex_vertex_property(&mut inner, vertex, &key, &value);
            }
        }
        Ok(())
    }

    fn remove_edge(&self, edge: u64) -> Result<(), Infallible> {
        let mut inner = self.inner.write();
        if let Some(record) = inner.edges.remove(&edge) {
            if let Some(v) = inner.vertices.get_mut(&record.source) {
                v.out_edges.retain(|e| *e != edge);
            }
            if let Some(v) = inner.vertices.get_mut(&record.target) {
                v.in_edges.retain(|e| *e != edge);
            }
            for ((_index_name, _key), buckets) in inner.edge_indexes.iter_mut() {
                for ids in buckets.values_mut() {
                    ids.retain(|id| *id != edge);
                }
            }
        }
        Ok(())
    }

    fn get_vertices(&self) -> Result<Vec<u64>, Infallible> {
        Ok(self.inner.read().vertices.keys().copied().collect())
    }

    fn get_edges(&self) -> Result<Vec<u64>, Infallible> {
        Ok(self.inner.read().edges.keys().copied().collect())
    }

    fn get_vertex_property(&self, vertex: u64, key: &str) -> Result<Option<String>, Infallible> {
        Ok(self
            .inner
            .read()
            .vertices
            .get(&vertex)
            .and_then(|v| v.properties.get(key).cloned()))
    }

    fn vertex_properties(&self, vertex: u64) -> Result<Vec<(String, String)>, Infallible> {
        Ok(self
            .inner
            .read()
            .vertices
            .get(&vertex)
            .map(|v| v.properties.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn set_vertex_property(&self, vertex: u64, key: &str, value: String) -> Result<(), Infallible> {
        let mut inner = self.inner.write();
        let old = inner
            .vertices
            .get_mut(&vertex)
            .map(|v| v.properties.insert(key.to_string(), value.clone()))
            .unwrap_or(None);
        if let Some(old_value) = old {
            Self::unindex_vertex_property(&mut inner, vertex, key, &old_value);
        }
        Self::reindex_vertex(&mut inner, vertex, key, &value);
        Ok(())
    }

    fn remove_vertex_property(&self, vertex: u64, key: &str) -> Result<(), Infallible> {
        let mut inner = self.inner.write();
        let old = inner
            .vertices
            .get_mut(&vertex)
            .and_then(|v| v.properties.remove(key));
        if let Some(old_value) = old {
            Self::unindex_vertex_property(&mut inner, vertex, key, &old_value);
        }
        Ok(())
    }

    fn get_edge_property(&self, edge: u64, key: &str) -> Result<Option<String>, Infallible> {
        Ok(self
            .inner
            .read()
            .edges
            .get(&edge)
            .and_then(|e| e.properties.get(key).cloned()))
    }

    fn set_edge_property(&self, edge: u64, key: &str, value: String) -> Result<(), Infallible> {
        let mut inner = self.inner.write();
        if let Some(e) = inner.edges.get_mut(&edge) {
            e.properties.insert(key.to_string(), value.clone());
        }
        Self::reindex_edge(&mut inner, edge, key, &value);
        Ok(())
    }

    fn edge_source(&self, edge: u64) -> Result<u64, Infallible> {
        Ok(self.inner.read().edges.get(&edge).map(|e| e.source).unwrap_or_default())
    }

    fn edge_target(&self, edge: u64) -> Result<u64, Infallible> {
        Ok(self.inner.read().edges.get(&edge).map(|e| e.target).unwrap_or_default())
    }

    fn out_edges(&self, vertex: u64) -> Result<Vec<u64>, Infallible> {
        Ok(self
            .inner
            .read()
            .vertices
            .get(&vertex)
            .map(|v| v.out_edges.clone())
            .unwrap_or_default())
    }

    fn in_edges(&self, vertex: u64) -> Result<Vec<u64>, Infallible> {
        Ok(self
            .inner
            .read()
            .vertices
            .get(&vertex)
            .map(|v| v.in_edges.clone())
            .unwrap_or_default())
    }

    fn create_vertex_index(&self, name: &str, key: &str) -> Result<(), Infallible> {
        let mut inner = self.inner.write();
        let entry = (name.to_string(), key.to_string());
        if inner.tracked_vertex_keys.contains(&entry) {
            return Ok(());
        }
        inner.tracked_vertex_keys.push(entry.clone());

        let backfill: Vec<(u64, String)> = inner
            .vertices
            .iter()
            .filter_map(|(id, v)| v.properties.get(key).map(|val| (*id, val.clone())))
            .collect();
        for (id, value) in backfill {
            inner
                .vertex_indexes
                .entry(entry.clone())
                .or_default()
                .entry(value)
                .or_default()
                .push(id);
        }
        Ok(())
    }

    fn create_edge_index(&self, name: &str, key: &str) -> Result<(), Infallible> {
        let mut inner = self.inner.write();
        let entry = (name.to_string(), key.to_string());
        if inner.tracked_edge_keys.contains(&entry) {
            return Ok(());
        }
        inner.tracked_edge_keys.push(entry.clone());

        let backfill: Vec<(u64, String)> = inner
            .edges
            .iter()
            .filter_map(|(id, e)| e.properties.get(key).map(|val| (*id, val.clone())))
            .collect();
        for (id, value) in backfill {
            inner
                .edge_indexes
                .entry(entry.clone())
                .or_default()
                .entry(value)
                .or_default()
                .push(id);
        }
        Ok(())
    }

    fn vertex_index_lookup(&self, index_name: &str, key: &str, value: &str) -> Result<Vec<u64>, Infallible> {
        let inner = self.inner.read();
        Ok(inner
            .vertex_indexes
            .get(&(index_name.to_string(), key.to_string()))
            .and_then(|buckets| buckets.get(value))
            .cloned()
            .unwrap_or_default())
    }

    fn edge_index_lookup(&self, index_name: &str, key: &str, value: &str) -> Result<Vec<u64>, Infallible> {
        let inner = self.inner.read();
        Ok(inner
            .edge_indexes
            .get(&(index_name.to_string(), key.to_string()))
            .and_then(|buckets| buckets.get(value))
            .cloned()
            .unwrap_or_default())
    }

    fn supports_manual_transactions(&self) -> bool {
        false
    }
}

/// A transactional test double: wraps a `MemoryGraph`, reports
/// `supports_manual_transactions() -> true`, and implements begin/commit/
/// rollback by snapshotting and restoring the backing `Inner` state. Lets
/// this crate's own tests exercise the manual-transaction bracketing path
/// in `Connection` against a backend that actually has one; not part of
/// the public contract.
#[derive(Default)]
pub struct TransactionalMemoryGraph {
    graph: MemoryGraph,
    snapshot: RwLock<Option<Inner>>,
}

impl TransactionalMemoryGraph {
    pub fn new() -> Self {
        TransactionalMemoryGraph::default()
    }
}

impl IndexableGraph for TransactionalMemoryGraph {
    type VertexId = u64;
    type EdgeId = u64;
    type Error = Infallible;

    fn add_vertex(&self) -> Result<u64, Infallible> {
        self.graph.add_vertex()
    }

    fn add_edge(&self, source: u64, label: &str, target: u64) -> Result<u64, Infallible> {
        self.graph.add_edge(source, label, target)
    }

    fn remove_vertex(&self, vertex: u64) -> Result<(), Infallible> {
        self.graph.remove_vertex(vertex)
    }

    fn remove_edge(&self, edge: u64) -> Result<(), Infallible> {
        self.graph.remove_edge(edge)
    }

    fn get_vertices(&self) -> Result<Vec<u64>, Infallible> {
        self.graph.get_vertices()
    }

    fn get_edges(&self) -> Result<Vec<u64>, Infallible> {
        self.graph.get_edges()
    }

    fn get_vertex_property(&self, vertex: u64, key: &str) -> Result<Option<String>, Infallible> {
        self.graph.get_vertex_property(vertex, key)
    }

    fn vertex_properties(&self, vertex: u64) -> Result<Vec<(String, String)>, Infallible> {
        self.graph.vertex_properties(vertex)
    }

    fn set_vertex_property(&self, vertex: u64, key: &str, value: String) -> Result<(), Infallible> {
        self.graph.set_vertex_property(vertex, key, value)
    }

    fn remove_vertex_property(&self, vertex: u64, key: &str) -> Result<(), Infallible> {
        self.graph.remove_vertex_property(vertex, key)
    }

    fn get_edge_property(&self, edge: u64, key: &str) -> Result<Option<String>, Infallible> {
        self.graph.get_edge_property(edge, key)
    }

    fn set_edge_property(&self, edge: u64, key: &str, value: String) -> Result<(), Infallible> {
        self.graph.set_edge_property(edge, key, value)
    }

    fn edge_source(&self, edge: u64) -> Result<u64, Infallible> {
        self.graph.edge_source(edge)
    }

    fn edge_target(&self, edge: u64) -> Result<u64, Infallible> {
        self.graph.edge_target(edge)
    }

    fn out_edges(&self, vertex: u64) -> Result<Vec<u64>, Infallible> {
        self.graph.out_edges(vertex)
    }

    fn in_edges(&self, vertex: u64) -> Result<Vec<u64>, Infallible> {
        self.graph.in_edges(vertex)
    }

    fn create_vertex_index(&self, name: &str, key: &str) -> Result<(), Infallible> {
        self.graph.create_vertex_index(name, key)
    }

    fn create_edge_index(&self, name: &str, key: &str) -> Result<(), Infallible> {
        self.graph.create_edge_index(name, key)
    }

    fn vertex_index_lookup(&self, index_name: &str, key: &str, value: &str) -> Result<Vec<u64>, Infallible> {
        self.graph.vertex_index_lookup(index_name, key, value)
    }

    fn edge_index_lookup(&self, index_name: &str, key: &str, value: &str) -> Result<Vec<u64>, Infallible> {
        self.graph.edge_index_lookup(index_name, key, value)
    }

    fn supports_manual_transactions(&self) -> bool {
        true
    }

    fn begin(&self) -> Result<(), Infallible> {
        let snapshot = self.graph.inner.read().clone();
        *self.snapshot.write() = Some(snapshot);
        Ok(())
    }

    fn commit(&self) -> Result<(), Infallible> {
        *self.snapshot.write() = None;
        Ok(())
    }

    fn rollback(&self) -> Result<(), Infallible> {
        if let Some(snapshot) = self.snapshot.write().take() {
            *self.graph.inner.write() = snapshot;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_index_backfills_existing_properties() {
        let graph = MemoryGraph::new();
        let v1 = graph.add_vertex().unwrap();
        graph.set_vertex_property(v1, "value", "hello".to_string()).unwrap();
        graph.create_vertex_index("values", "value").unwrap();

        let found = graph.vertex_index_lookup("values", "value", "hello").unwrap();
        assert_eq!(found, vec![v1]);
    }

    #[test]
    fn edge_index_reindexes_on_property_set() {
        let graph = MemoryGraph::new();
        let v1 = graph.add_vertex().unwrap();
        let v2 = graph.add_vertex().unwrap();
        graph.create_edge_index("edges", "p").unwrap();
        let e1 = graph.add_edge(v1, "statement", v2).unwrap();
        graph.set_edge_property(e1, "p", "U p".to_string()).unwrap();

        let found = graph.edge_index_lookup("edges", "p", "U p").unwrap();
        assert_eq!(found, vec![e1]);
    }

    #[test]
    fn removing_edge_drops_it_from_adjacency_and_indexes() {
        let graph = MemoryGraph::new();
        let v1 = graph.add_vertex().unwrap();
        let v2 = graph.add_vertex().unwrap();
        graph.create_edge_index("edges", "p").unwrap();
        let e1 = graph.add_edge(v1, "statement", v2).unwrap();
        graph.set_edge_property(e1, "p", "U p".to_string()).unwrap();

        graph.remove_edge(e1).unwrap();

        assert!(graph.out_edges(v1).unwrap().is_empty());
        assert!(graph.edge_index_lookup("edges", "p", "U p").unwrap().is_empty());
    }
}
