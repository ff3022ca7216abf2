use std::sync::Arc;

use rdf_graph_store::{
    Connection, MemoryGraph, StoreConfig, StoreContext, TransactionalMemoryGraph, Value,
};

/// Surfaces the crate's `tracing` events (matcher dispatch, commit/rollback,
/// namespace mutation) on stdout when a test fails; harmless to call more
/// than once across the test binary.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn open(config: StoreConfig) -> Connection<MemoryGraph> {
    init_tracing();
    let context = StoreContext::open(MemoryGraph::new(), config).unwrap();
    Connection::new(Arc::new(context))
}

fn open_transactional(config: StoreConfig) -> Connection<TransactionalMemoryGraph> {
    init_tracing();
    let context = StoreContext::open(TransactionalMemoryGraph::new(), config).unwrap();
    Connection::new(Arc::new(context))
}

#[test]
fn round_trip_of_plain_literal_with_language() {
    let conn = open(StoreConfig::default());
    conn.add_statement(
        Value::iri("ex:s"),
        Value::iri("ex:p"),
        Value::lang_literal("hello", "en"),
        None,
    )
    .unwrap();

    let results: Vec<_> = conn
        .get_statements(None, None, Some(Value::lang_literal("hello", "en")), None, false)
        .unwrap()
        .collect();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].subject, Value::iri("ex:s"));
    assert_eq!(results[0].predicate, Value::iri("ex:p"));
    assert_eq!(results[0].object, Value::lang_literal("hello", "en"));
    assert_eq!(results[0].context, None);
}

#[test]
fn distinct_typed_vs_plain_literal() {
    let conn = open(StoreConfig::default());
    conn.add_statement(
        Value::iri("ex:s"),
        Value::iri("ex:p"),
        Value::typed_literal("5", "xsd:int"),
        None,
    )
    .unwrap();
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::plain_literal("5"), None)
        .unwrap();

    let all: Vec<_> = conn.get_statements(None, None, None, None, false).unwrap().collect();
    assert_eq!(all.len(), 2);

    conn.remove_statements(None, None, Some(Value::plain_literal("5")), None)
        .unwrap();

    let remaining: Vec<_> = conn.get_statements(None, None, None, None, false).unwrap().collect();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].object, Value::typed_literal("5", "xsd:int"));
}

#[test]
fn context_discrimination() {
    let conn = open(StoreConfig::default());
    conn.add_statement(
        Value::iri("ex:s"),
        Value::iri("ex:p"),
        Value::iri("ex:o"),
        Some(Value::iri("ex:g1")),
    )
    .unwrap();
    conn.add_statement(
        Value::iri("ex:s"),
        Value::iri("ex:p"),
        Value::iri("ex:o"),
        Some(Value::iri("ex:g2")),
    )
    .unwrap();

    let results: Vec<_> = conn
        .get_statements(
            Some(Value::iri("ex:s")),
            Some(Value::iri("ex:p")),
            Some(Value::iri("ex:o")),
            Some(Value::iri("ex:g1")),
            false,
        )
        .unwrap()
        .collect();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].context, Some(Value::iri("ex:g1")));
}

#[test]
fn unique_statements_policy_on_collapses_duplicates() {
    let conn = open(StoreConfig {
        unique_statements: true,
        ..StoreConfig::default()
    });
    for _ in 0..2 {
        conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o"), None)
            .unwrap();
    }
    let results: Vec<_> = conn.get_statements(None, None, None, None, false).unwrap().collect();
    assert_eq!(results.len(), 1);
}

#[test]
fn unique_statements_policy_off_keeps_duplicates() {
    let conn = open(StoreConfig {
        unique_statements: false,
        ..StoreConfig::default()
    });
    for _ in 0..2 {
        conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o"), None)
            .unwrap();
    }
    let results: Vec<_> = conn.get_statements(None, None, None, None, false).unwrap().collect();
    assert_eq!(results.len(), 2);
}

#[test]
fn matcher_fallback_matches_explicit_index_result_set() {
    let fallback_conn = open(StoreConfig {
        indexed_patterns: "p,c".to_string(),
        ..StoreConfig::default()
    });
    let indexed_conn = open(StoreConfig {
        indexed_patterns: "p,c,spoc".to_string(),
        ..StoreConfig::default()
    });

    for conn in [&fallback_conn, &indexed_conn] {
        conn.add_statement(
            Value::iri("ex:s"),
            Value::iri("ex:p"),
            Value::iri("ex:o"),
            Some(Value::iri("ex:g")),
        )
        .unwrap();
        conn.add_statement(Value::iri("ex:other"), Value::iri("ex:p"), Value::iri("ex:o"), None)
            .unwrap();
    }

    let query = |conn: &Connection<MemoryGraph>| -> Vec<_> {
        conn.get_statements(
            Some(Value::iri("ex:s")),
            Some(Value::iri("ex:p")),
            Some(Value::iri("ex:o")),
            Some(Value::iri("ex:g")),
            false,
        )
        .unwrap()
        .collect()
    };

    let fallback_results = query(&fallback_conn);
    let indexed_results = query(&indexed_conn);

    assert_eq!(fallback_results.len(), 1);
    assert_eq!(fallback_results, indexed_results);
}

#[test]
fn rollback_is_a_no_op_on_a_non_transactional_backend() {
    // `MemoryGraph` does not support manual transactions, so `commit`/
    // `rollback` are no-ops here; this exercises the non-transactional path
    // of the same contract (§4.H): without a manual-commit backing graph,
    // every mutation auto-commits immediately, so there is nothing to roll
    // back and the statement remains visible.
    let conn = open(StoreConfig::default());
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o"), None)
        .unwrap();
    conn.rollback().unwrap();

    let results: Vec<_> = conn.get_statements(None, None, None, None, false).unwrap().collect();
    assert_eq!(results.len(), 1);
}

#[test]
fn rollback_discards_added_statement_on_transactional_backend() {
    // §8 Scenario 6: with a backing graph that reports manual-transaction
    // support, `add_statement` opens an implicit transaction and `rollback`
    // restores the pre-transaction state, so the statement never becomes
    // visible to a later query.
    let conn = open_transactional(StoreConfig::default());
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o"), None)
        .unwrap();
    conn.rollback().unwrap();

    let results: Vec<_> = conn.get_statements(None, None, None, None, false).unwrap().collect();
    assert_eq!(results.len(), 0);
}

#[test]
fn commit_on_a_transactional_backend_keeps_the_added_statement() {
    let conn = open_transactional(StoreConfig::default());
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o"), None)
        .unwrap();
    conn.commit().unwrap();

    let results: Vec<_> = conn.get_statements(None, None, None, None, false).unwrap().collect();
    assert_eq!(results.len(), 1);
}

#[test]
fn find_or_add_is_idempotent_across_statements() {
    let conn = open(StoreConfig::default());
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o1"), None)
        .unwrap();
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o2"), None)
        .unwrap();

    let results: Vec<_> = conn
        .get_statements(Some(Value::iri("ex:s")), None, None, None, false)
        .unwrap()
        .collect();
    assert_eq!(results.len(), 2);
}

#[test]
fn unbound_query_scans_every_statement() {
    let conn = open(StoreConfig::default());
    for i in 0..5 {
        conn.add_statement(
            Value::iri(format!("ex:s{i}")),
            Value::iri("ex:p"),
            Value::iri("ex:o"),
            None,
        )
        .unwrap();
    }
    let results: Vec<_> = conn.get_statements(None, None, None, None, false).unwrap().collect();
    assert_eq!(results.len(), 5);
}

#[test]
fn remove_statements_by_predicate_only_removes_matching_edges() {
    let conn = open(StoreConfig::default());
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p1"), Value::iri("ex:o"), None)
        .unwrap();
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p2"), Value::iri("ex:o"), None)
        .unwrap();

    conn.remove_statements(None, Some(Value::iri("ex:p1")), None, None).unwrap();

    let results: Vec<_> = conn.get_statements(None, None, None, None, false).unwrap().collect();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].predicate, Value::iri("ex:p2"));
}

#[test]
fn namespace_roundtrip() {
    let conn = open(StoreConfig::default());
    conn.set_namespace("ex", "http://example.org/").unwrap();
    conn.set_namespace("foaf", "http://xmlns.com/foaf/0.1/").unwrap();

    assert_eq!(
        conn.get_namespace("ex").unwrap(),
        Some("http://example.org/".to_string())
    );

    let all = conn.get_namespaces().unwrap();
    assert_eq!(all.len(), 2);

    conn.remove_namespace("ex").unwrap();
    assert_eq!(conn.get_namespace("ex").unwrap(), None);
}

#[test]
fn statement_listeners_are_notified_on_add_and_remove() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let conn = open(StoreConfig::default());
    let added = Arc::new(AtomicUsize::new(0));
    let removed = Arc::new(AtomicUsize::new(0));

    let added_clone = added.clone();
    conn.on_statement_added(move |_| {
        added_clone.fetch_add(1, Ordering::SeqCst);
    });
    let removed_clone = removed.clone();
    conn.on_statement_removed(move |_| {
        removed_clone.fetch_add(1, Ordering::SeqCst);
    });

    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o"), None)
        .unwrap();
    conn.remove_statements(Some(Value::iri("ex:s")), None, None, None).unwrap();

    assert_eq!(added.load(Ordering::SeqCst), 1);
    assert_eq!(removed.load(Ordering::SeqCst), 1);
}

#[test]
fn cursor_close_stops_further_iteration() {
    let conn = open(StoreConfig::default());
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o"), None)
        .unwrap();

    let mut cursor = conn.get_statements(None, None, None, None, false).unwrap();
    cursor.close();
    assert_eq!(cursor.next(), None);
}

#[test]
fn volatile_cursor_advances_through_a_single_reused_buffer() {
    let conn = open(StoreConfig {
        volatile_statements: true,
        ..StoreConfig::default()
    });
    conn.add_statement(Value::iri("ex:s1"), Value::iri("ex:p"), Value::iri("ex:o"), None)
        .unwrap();
    conn.add_statement(Value::iri("ex:s2"), Value::iri("ex:p"), Value::iri("ex:o"), None)
        .unwrap();

    let mut cursor = conn.get_statements(None, None, None, None, false).unwrap();
    assert!(cursor.is_volatile());

    let mut subjects = Vec::new();
    while let Some(stmt) = cursor.advance() {
        subjects.push(stmt.subject.clone());
    }
    subjects.sort_by_key(|v| v.lexical_form().to_string());
    assert_eq!(subjects, vec![Value::iri("ex:s1"), Value::iri("ex:s2")]);
}

#[test]
#[should_panic(expected = "advance() is for a cursor opened with volatile_statements = true")]
fn advancing_a_non_volatile_cursor_is_rejected_in_debug_builds() {
    let conn = open(StoreConfig::default());
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o"), None)
        .unwrap();
    let mut cursor = conn.get_statements(None, None, None, None, false).unwrap();
    cursor.advance();
}

#[test]
#[should_panic(expected = "the Iterator impl is for a cursor opened with volatile_statements = false")]
fn iterating_a_volatile_cursor_via_iterator_is_rejected_in_debug_builds() {
    let conn = open(StoreConfig {
        volatile_statements: true,
        ..StoreConfig::default()
    });
    conn.add_statement(Value::iri("ex:s"), Value::iri("ex:p"), Value::iri("ex:o"), None)
        .unwrap();
    let mut cursor = conn.get_statements(None, None, None, None, false).unwrap();
    cursor.next();
}

#[test]
fn every_bind_pattern_returns_the_exact_match_set_under_default_config() {
    bind_pattern_exhaustive_check(StoreConfig::default());
}

#[test]
fn every_bind_pattern_returns_the_exact_match_set_with_only_required_indexes() {
    bind_pattern_exhaustive_check(StoreConfig {
        indexed_patterns: "".to_string(),
        ..StoreConfig::default()
    });
}

fn bind_pattern_exhaustive_check(config: StoreConfig) {
    let conn = open(config);
    conn.add_statement(
        Value::iri("ex:s1"),
        Value::iri("ex:p1"),
        Value::iri("ex:o1"),
        Some(Value::iri("ex:g1")),
    )
    .unwrap();
    conn.add_statement(
        Value::iri("ex:s1"),
        Value::iri("ex:p2"),
        Value::iri("ex:o2"),
        Some(Value::iri("ex:g2")),
    )
    .unwrap();
    conn.add_statement(
        Value::iri("ex:s2"),
        Value::iri("ex:p1"),
        Value::iri("ex:o1"),
        None,
    )
    .unwrap();

    for s_bound in [false, true] {
        for p_bound in [false, true] {
            for o_bound in [false, true] {
                for c_bound in [false, true] {
                    let s = if s_bound { Some(Value::iri("ex:s1")) } else { None };
                    let p = if p_bound { Some(Value::iri("ex:p1")) } else { None };
                    let o = if o_bound { Some(Value::iri("ex:o1")) } else { None };
                    let c = if c_bound { Some(Value::iri("ex:g1")) } else { None };

                    let results: Vec<_> = conn
                        .get_statements(s.clone(), p.clone(), o.clone(), c.clone(), false)
                        .unwrap()
                        .collect();

                    for stmt in &results {
                        if let Some(s) = &s {
                            assert_eq!(&stmt.subject, s);
                        }
                        if let Some(p) = &p {
                            assert_eq!(&stmt.predicate, p);
                        }
                        if let Some(o) = &o {
                            assert_eq!(&stmt.object, o);
                        }
                        if c_bound {
                            assert_eq!(stmt.context.as_ref(), c.as_ref());
                        }
                    }

                    // s1/p1/o1/g1 is the only statement matching all four
                    // positions simultaneously.
                    if s_bound && p_bound && o_bound && c_bound {
                        assert_eq!(results.len(), 1);
                    }
                }
            }
        }
    }
}
