//! The three matcher strategies (§4.D–F) plus the binding they're evaluated
//! against. Dispatch/assignment lives in `dispatcher.rs`.

pub mod dispatcher;

use crate::error::{StoreError, StoreResult};
use crate::graph::{IndexableGraph, EDGES_INDEX};
use crate::pattern::Mask;
use crate::statement::{composite_key, PROP_CONTEXT, PROP_PREDICATE};

pub use dispatcher::MatcherTable;

/// A bound (or unbound) query position: the original value, its canonical
/// encoding, and — for s/o — the vertex it resolves to, if any. A position
/// that does not resolve to an existing vertex can never match anything, so
/// matchers treat a missing vertex as an immediate empty result rather than
/// an error.
#[derive(Debug, Clone, Default)]
pub struct QueryBinding {
    pub s_enc: Option<String>,
    pub p_enc: Option<String>,
    pub o_enc: Option<String>,
    pub c_enc: Option<String>,
}

impl QueryBinding {
    pub fn mask(&self) -> Mask {
        Mask::new(
            self.s_enc.is_some(),
            self.p_enc.is_some(),
            self.o_enc.is_some(),
            self.c_enc.is_some(),
        )
    }
}

/// One of the three matcher strategies, parameterized by the bind-pattern it
/// was built for.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Fully-unbound pattern: scan every statement edge (§4.D).
    Trivial,
    /// Point lookup against a composite-key edge property (§4.E).
    Indexing { mask: Mask },
    /// Pivot on a bound endpoint vertex's adjacency (§4.F).
    GraphBased { mask: Mask },
}

impl Matcher {
    pub fn fetch<G: IndexableGraph>(
        &self,
        graph: &G,
        binding: &QueryBinding,
        s_vertex: Option<G::VertexId>,
        o_vertex: Option<G::VertexId>,
    ) -> StoreResult<Vec<G::EdgeId>> {
        match self {
            Matcher::Trivial => {
                tracing::debug!("dispatching to trivial matcher (full scan)");
                graph.get_edges().map_err(StoreError::store_failure)
            }
            Matcher::Indexing { mask } => {
                tracing::debug!(pattern = %mask.pattern_string(), "dispatching to indexing matcher");
                fetch_indexing(graph, *mask, binding)
            }
            Matcher::GraphBased { mask } => {
                tracing::debug!(pattern = %mask.pattern_string(), "dispatching to graph-based matcher");
                fetch_graph_based(graph, *mask, binding, s_vertex, o_vertex)
            }
        }
    }
}

fn fetch_indexing<G: IndexableGraph>(
    graph: &G,
    mask: Mask,
    binding: &QueryBinding,
) -> StoreResult<Vec<G::EdgeId>> {
    let pattern = mask.pattern_string();
    let key = composite_key(
        mask,
        binding.s_enc.as_deref().unwrap_or_default(),
        binding.p_enc.as_deref().unwrap_or_default(),
        binding.o_enc.as_deref().unwrap_or_default(),
        binding.c_enc.as_deref().unwrap_or_default(),
    );
    let index_key = if pattern == "p" {
        PROP_PREDICATE
    } else if pattern == "c" {
        PROP_CONTEXT
    } else {
        pattern.as_str()
    };
    graph
        .edge_index_lookup(EDGES_INDEX, index_key, &key)
        .map_err(StoreError::store_failure)
}

fn fetch_graph_based<G: IndexableGraph>(
    graph: &G,
    mask: Mask,
    binding: &QueryBinding,
    s_vertex: Option<G::VertexId>,
    o_vertex: Option<G::VertexId>,
) -> StoreResult<Vec<G::EdgeId>> {
    let pivot_on_subject = mask.has_s();
    let pivot = if pivot_on_subject { s_vertex } else { o_vertex };

    let Some(pivot) = pivot else {
        // The pivot endpoint's value has no vertex at all: nothing can match.
        return Ok(Vec::new());
    };

    let candidates = if pivot_on_subject {
        graph.out_edges(pivot).map_err(StoreError::store_failure)?
    } else {
        graph.in_edges(pivot).map_err(StoreError::store_failure)?
    };

    let mut out = Vec::new();
    for edge in candidates {
        let matched = edge_matches(graph, edge, mask, binding, pivot_on_subject, s_vertex, o_vertex)?;
        tracing::trace!(?edge, matched, "graph-based per-edge filter");
        if matched {
            out.push(edge);
        }
    }
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn edge_matches<G: IndexableGraph>(
    graph: &G,
    edge: G::EdgeId,
    mask: Mask,
    binding: &QueryBinding,
    pivot_on_subject: bool,
    s_vertex: Option<G::VertexId>,
    o_vertex: Option<G::VertexId>,
) -> StoreResult<bool> {
    if mask.has_p() {
        let p = graph
            .get_edge_property(edge, PROP_PREDICATE)
            .map_err(StoreError::store_failure)?;
        if p.as_deref() != binding.p_enc.as_deref() {
            return Ok(false);
        }
    }
    if mask.has_c() {
        let c = graph
            .get_edge_property(edge, PROP_CONTEXT)
            .map_err(StoreError::store_failure)?;
        if c.as_deref() != binding.c_enc.as_deref() {
            return Ok(false);
        }
    }

    // Whichever endpoint we didn't pivot on, check its identity directly if
    // it's bound (cheaper and exact, unlike comparing decoded values).
    if pivot_on_subject && mask.has_o() {
        let Some(o_vertex) = o_vertex else {
            return Ok(false);
        };
        let target = graph.edge_target(edge).map_err(StoreError::store_failure)?;
        if target != o_vertex {
            return Ok(false);
        }
    }
    if !pivot_on_subject && mask.has_s() {
        let Some(s_vertex) = s_vertex else {
            return Ok(false);
        };
        let source = graph.edge_source(edge).map_err(StoreError::store_failure)?;
        if source != s_vertex {
            return Ok(false);
        }
    }

    Ok(true)
}
