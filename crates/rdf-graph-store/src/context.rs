//! Store Context (§4.J): shared, immutable-after-open handles a connection
//! is built against — the backing graph, the matcher table, policy flags,
//! and the namespace vertex.

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::graph::{IndexableGraph, EDGES_INDEX, VALUES_INDEX};
use crate::matcher::MatcherTable;
use crate::namespace::NamespaceTable;
use crate::pattern::Mask;
use crate::vertex::PROP_VALUE;

/// Shared state handed out to every `Connection`. Replaces per-component
/// field-bearing objects with a single immutable context passed by
/// reference, per the design note in §9.
pub struct StoreContext<G: IndexableGraph> {
    pub(crate) graph: G,
    pub(crate) config: StoreConfig,
    pub(crate) enabled_patterns: Vec<Mask>,
    pub(crate) matchers: MatcherTable,
    pub(crate) namespaces: NamespaceTable<G>,
    has_manual_transactions: bool,
}

impl<G: IndexableGraph> StoreContext<G> {
    /// Open a store over `graph`: creates the `values`/`edges` automatic
    /// indexes if absent, resolves (or creates) the namespace vertex, and
    /// builds the 16-slot matcher table.
    pub fn open(graph: G, config: StoreConfig) -> StoreResult<Self> {
        let enabled_patterns = config.enabled_patterns()?;

        graph
            .create_vertex_index(VALUES_INDEX, PROP_VALUE)
            .map_err(crate::error::StoreError::store_failure)?;
        for mask in &enabled_patterns {
            let pattern = mask.pattern_string();
            let key = match pattern.as_str() {
                "p" => "p",
                "c" => "c",
                other => other,
            };
            graph
                .create_edge_index(EDGES_INDEX, key)
                .map_err(crate::error::StoreError::store_failure)?;
        }

        let namespaces = NamespaceTable::open(&graph)?;
        let matchers = MatcherTable::build(&enabled_patterns);
        let has_manual_transactions = graph.supports_manual_transactions();

        tracing::debug!(
            patterns = ?enabled_patterns.iter().map(|m| m.pattern_string()).collect::<Vec<_>>(),
            unique_statements = config.unique_statements,
            has_manual_transactions,
            "opened store context"
        );

        Ok(StoreContext {
            graph,
            config,
            enabled_patterns,
            matchers,
            namespaces,
            has_manual_transactions,
        })
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn enabled_patterns(&self) -> &[Mask] {
        &self.enabled_patterns
    }

    pub fn matchers(&self) -> &MatcherTable {
        &self.matchers
    }

    /// Whether the backing graph supports manual transaction brackets,
    /// captured once at `open` time rather than re-checked on every
    /// mutating call (§9 design note).
    pub fn has_manual_transactions(&self) -> bool {
        self.has_manual_transactions
    }
}
