//! An RDF triple/quad store adapter over an arbitrary indexable property
//! graph.
//!
//! Statements are stored as vertex/edge pairs on a backing
//! [`IndexableGraph`](graph::IndexableGraph): one vertex per distinct RDF
//! value, one edge per statement, running subject→object. A 16-slot matcher
//! table, built once at [`StoreContext::open`](context::StoreContext::open),
//! picks between a full scan, a composite-key index lookup, or a pivot over
//! a bound endpoint's adjacency depending on which of subject/predicate/
//! object/context a query binds.
//!
//! ```
//! use rdf_graph_store::{Connection, MemoryGraph, StoreConfig, StoreContext, Value};
//! use std::sync::Arc;
//!
//! let context = StoreContext::open(MemoryGraph::new(), StoreConfig::default()).unwrap();
//! let conn = Connection::new(Arc::new(context));
//!
//! conn.add_statement(
//!     Value::iri("http://example.org/alice"),
//!     Value::iri("http://example.org/knows"),
//!     Value::iri("http://example.org/bob"),
//!     None,
//! ).unwrap();
//!
//! let results: Vec<_> = conn
//!     .get_statements(Some(Value::iri("http://example.org/alice")), None, None, None, false)
//!     .unwrap()
//!     .collect();
//! assert_eq!(results.len(), 1);
//! ```

pub mod config;
pub mod connection;
pub mod context;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod memory;
pub mod namespace;
pub mod pattern;
pub mod statement;
pub mod value;
pub mod vertex;

pub use config::StoreConfig;
pub use connection::{Connection, StatementCursor};
pub use context::StoreContext;
pub use error::{StoreError, StoreResult};
pub use graph::IndexableGraph;
pub use memory::{MemoryGraph, TransactionalMemoryGraph};
pub use statement::Statement;
pub use value::Value;
