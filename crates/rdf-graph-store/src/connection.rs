//! Connection (§4.H): the per-session façade — add/remove/getStatements,
//! commit/rollback, namespace accessors, and listener notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::StoreContext;
use crate::error::{StoreError, StoreResult};
use crate::graph::IndexableGraph;
use crate::matcher::QueryBinding;
use crate::statement::{decode_edge, edge_properties, encode_statement, Statement};
use crate::value::Value;
use crate::vertex::VertexStore;

/// The edge label used for statement edges. No external contract depends on
/// its value (§4.C step 3); canonical encoding lives entirely in
/// properties.
const STATEMENT_EDGE_LABEL: &str = "statement";

type Listener = Box<dyn Fn(&Statement) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    added: Vec<Listener>,
    removed: Vec<Listener>,
}

/// A session over a shared `StoreContext`. Cheap to create; holds only
/// per-connection mutable state (listeners, transaction status).
pub struct Connection<G: IndexableGraph> {
    context: Arc<StoreContext<G>>,
    listeners: Mutex<Listeners>,
    tx_active: AtomicBool,
}

impl<G: IndexableGraph> Connection<G> {
    pub fn new(context: Arc<StoreContext<G>>) -> Self {
        Connection {
            context,
            listeners: Mutex::new(Listeners::default()),
            tx_active: AtomicBool::new(false),
        }
    }

    pub fn on_statement_added(&self, listener: impl Fn(&Statement) + Send + Sync + 'static) {
        self.listeners.lock().added.push(Box::new(listener));
    }

    pub fn on_statement_removed(&self, listener: impl Fn(&Statement) + Send + Sync + 'static) {
        self.listeners.lock().removed.push(Box::new(listener));
    }

    fn begin_mutation(&self) -> StoreResult<()> {
        if self.context.has_manual_transactions() && !self.tx_active.swap(true, Ordering::SeqCst) {
            self.context
                .graph()
                .begin()
                .map_err(StoreError::store_failure)?;
        }
        Ok(())
    }

    /// `addStatement` (§4.C).
    pub fn add_statement(
        &self,
        subject: Value,
        predicate: Value,
        object: Value,
        context: Option<Value>,
    ) -> StoreResult<()> {
        self.begin_mutation()?;

        let stmt = Statement::new(subject, predicate, object, context);
        let vertices = VertexStore::new(self.context.graph());
        let s_vertex = vertices.find_or_add(&stmt.subject)?;
        let p_vertex = vertices.find_or_add(&stmt.predicate)?;
        let o_vertex = vertices.find_or_add(&stmt.object)?;
        if let Some(ctx) = &stmt.context {
            vertices.find_or_add(ctx)?;
        }
        let _ = p_vertex; // predicate vertex exists for §3 but is not an edge endpoint.

        if self.context.config().unique_statements {
            self.remove_statements(
                Some(stmt.subject.clone()),
                Some(stmt.predicate.clone()),
                Some(stmt.object.clone()),
                stmt.context.clone(),
            )?;
        }

        let (s_enc, p_enc, o_enc, c_enc) = encode_statement(&stmt);
        let edge = self
            .context
            .graph()
            .add_edge(s_vertex, STATEMENT_EDGE_LABEL, o_vertex)
            .map_err(StoreError::store_failure)?;

        for (key, value) in edge_properties(
            self.context.enabled_patterns(),
            &s_enc,
            &p_enc,
            &o_enc,
            &c_enc,
        ) {
            self.context
                .graph()
                .set_edge_property(edge, &key, value)
                .map_err(StoreError::store_failure)?;
        }

        tracing::debug!("added statement");
        for listener in &self.listeners.lock().added {
            listener(&stmt);
        }

        Ok(())
    }

    /// `removeStatements(s?, p?, o?, c?)` (§4.C).
    ///
    /// Dispatches to the matcher for the bind-pattern, materializes the
    /// matches before deleting (avoiding concurrent-modification hazards
    /// while iterating the backing index), then removes each edge.
    pub fn remove_statements(
        &self,
        subject: Option<Value>,
        predicate: Option<Value>,
        object: Option<Value>,
        context: Option<Value>,
    ) -> StoreResult<()> {
        self.begin_mutation()?;

        let matches = self.find_matching_edges(
            subject.as_ref(),
            predicate.as_ref(),
            object.as_ref(),
            context.as_ref(),
        )?;

        for (edge, stmt) in matches {
            self.context
                .graph()
                .remove_edge(edge)
                .map_err(StoreError::store_failure)?;
            for listener in &self.listeners.lock().removed {
                listener(&stmt);
            }
        }

        Ok(())
    }

    /// `getStatements(s?, p?, o?, c?, includeInferred)` (§4.H). This store
    /// performs no inference (§1 Non-goals), so `include_inferred` has no
    /// observable effect; it is accepted for interface parity with the
    /// produced sail contract (§6).
    pub fn get_statements(
        &self,
        subject: Option<Value>,
        predicate: Option<Value>,
        object: Option<Value>,
        context: Option<Value>,
        _include_inferred: bool,
    ) -> StoreResult<StatementCursor> {
        let matches = self.find_matching_edges(
            subject.as_ref(),
            predicate.as_ref(),
            object.as_ref(),
            context.as_ref(),
        )?;
        Ok(StatementCursor::new(
            matches.into_iter().map(|(_, s)| s).collect(),
            self.context.config().volatile_statements,
        ))
    }

    /// Shared plumbing for `getStatements`/`removeStatements`: resolve the
    /// bind-pattern's matcher, run it, then re-check the *full* query
    /// against every yielded edge (the matcher may have under-matched via
    /// the §4.G fallback table).
    fn find_matching_edges(
        &self,
        subject: Option<&Value>,
        predicate: Option<&Value>,
        object: Option<&Value>,
        context: Option<&Value>,
    ) -> StoreResult<Vec<(G::EdgeId, Statement)>> {
        let vertices = VertexStore::new(self.context.graph());

        let s_vertex = subject.map(|v| vertices.find_vertex(v)).transpose()?.flatten();
        let o_vertex = object.map(|v| vertices.find_vertex(v)).transpose()?.flatten();

        // A bound s/o that doesn't resolve to any existing vertex can never
        // match any statement.
        if (subject.is_some() && s_vertex.is_none()) || (object.is_some() && o_vertex.is_none()) {
            return Ok(Vec::new());
        }

        let binding = QueryBinding {
            s_enc: subject.map(crate::value::encode),
            p_enc: predicate.map(crate::value::encode),
            o_enc: object.map(crate::value::encode),
            // `None` here means "unbound" (match any context), matching
            // `spec.md`'s worked examples, which always use the fourth
            // position as a wildcard rather than a request for statements
            // specifically in the default graph (see DESIGN.md).
            c_enc: context.map(crate::value::encode),
        };

        let mask = binding.mask();
        let matcher = self.context.matchers().get(mask);
        tracing::debug!(pattern = %mask.pattern_string(), ?matcher, "resolved matcher for query");
        let edges = matcher.fetch(self.context.graph(), &binding, s_vertex, o_vertex)?;

        let mut out = Vec::with_capacity(edges.len());
        for edge in edges {
            let stmt = decode_edge(self.context.graph(), edge)?;
            let retained = !(subject.is_some_and(|v| &stmt.subject != v)
                || predicate.is_some_and(|v| &stmt.predicate != v)
                || object.is_some_and(|v| &stmt.object != v)
                || (context.is_some() && stmt.context.as_ref() != context));
            tracing::trace!(?edge, retained, "post-match full-tuple filter");
            if retained {
                out.push((edge, stmt));
            }
        }
        Ok(out)
    }

    /// `commit()` (§4.H).
    pub fn commit(&self) -> StoreResult<()> {
        if self.tx_active.swap(false, Ordering::SeqCst) {
            self.context
                .graph()
                .commit()
                .map_err(StoreError::store_failure)?;
            tracing::info!("committed transaction");
        }
        Ok(())
    }

    /// `rollback()` (§4.H).
    pub fn rollback(&self) -> StoreResult<()> {
        if self.tx_active.swap(false, Ordering::SeqCst) {
            self.context
                .graph()
                .rollback()
                .map_err(StoreError::store_failure)?;
            tracing::info!("rolled back transaction");
        }
        Ok(())
    }

    /// `close()`. Statement cursors are independent of the connection and
    /// release their own resources; this just drops per-connection state.
    pub fn close(&self) {
        self.listeners.lock().added.clear();
        self.listeners.lock().removed.clear();
    }

    pub fn set_namespace(&self, prefix: &str, iri: &str) -> StoreResult<()> {
        self.begin_mutation()?;
        self.context.namespaces.set_namespace(self.context.graph(), prefix, iri)
    }

    pub fn get_namespace(&self, prefix: &str) -> StoreResult<Option<String>> {
        self.context.namespaces.get_namespace(self.context.graph(), prefix)
    }

    pub fn remove_namespace(&self, prefix: &str) -> StoreResult<()> {
        self.begin_mutation()?;
        self.context.namespaces.remove_namespace(self.context.graph(), prefix)
    }

    pub fn get_namespaces(&self) -> StoreResult<Vec<(String, String)>> {
        self.context.namespaces.get_namespaces(self.context.graph())
    }
}

/// A closeable, lazy sequence of decoded statements (§4.H, §5 cancellation).
///
/// Backed by a materialized `Vec` rather than a live graph cursor: matchers
/// already materialize their edge sets before this cursor is built (to let
/// `removeStatements` delete safely), so there is no underlying resource to
/// hold open past `fetch` time. `close` is still explicit so callers that
/// treat this as a scoped resource behave correctly regardless of backend.
///
/// `StoreConfig::volatile_statements` (§6, §9 design note) picks which access
/// pattern this cursor supports: the default, non-volatile cursor is driven
/// through the `Iterator` impl, handing out a freshly owned `Statement` per
/// step; a volatile cursor is driven through [`advance`](Self::advance)
/// instead, which overwrites and returns a reference to a single reused
/// buffer. The two are mutually exclusive — a debug assertion catches a
/// caller reaching for the wrong one for how the cursor was configured.
pub struct StatementCursor {
    items: std::vec::IntoIter<Statement>,
    closed: bool,
    volatile: bool,
    buffer: Option<Statement>,
}

impl StatementCursor {
    fn new(items: Vec<Statement>, volatile: bool) -> Self {
        StatementCursor {
            items: items.into_iter(),
            closed: false,
            volatile,
            buffer: None,
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Whether this cursor was opened under `volatile_statements = true`.
    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    /// Advance a volatile cursor. Overwrites the cursor's single internal
    /// buffer with the next statement and returns a reference to it; the
    /// reference is invalidated by the next call to `advance`, so callers
    /// must copy out any fields they need before advancing again.
    ///
    /// Only valid on a cursor opened with `volatile_statements = true` — use
    /// the `Iterator` impl for a non-volatile cursor instead.
    pub fn advance(&mut self) -> Option<&Statement> {
        debug_assert!(
            self.volatile,
            "advance() is for a cursor opened with volatile_statements = true; use the Iterator impl instead"
        );
        if self.closed {
            return None;
        }
        let next = self.items.next()?;
        self.buffer = Some(next);
        self.buffer.as_ref()
    }
}

impl Iterator for StatementCursor {
    type Item = Statement;

    fn next(&mut self) -> Option<Statement> {
        debug_assert!(
            !self.volatile,
            "the Iterator impl is for a cursor opened with volatile_statements = false; use advance() instead"
        );
        if self.closed {
            return None;
        }
        self.items.next()
    }
}

impl Drop for StatementCursor {
    fn drop(&mut self) {
        self.closed = true;
    }
}
