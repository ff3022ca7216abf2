//! Error kinds surfaced at the store boundary (§7).
//!
//! All errors bubble up wrapped as a single storage-layer error; none are
//! retried internally. Namespace operations and iterator `close` paths log
//! and swallow cleanup failures instead of propagating them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Any failure bubbled up from the backing graph (I/O, index
    /// unavailable, transactional abort).
    #[error("backing graph failure: {0}")]
    StoreFailure(String),

    /// A canonical encoding string did not parse.
    #[error("malformed canonical encoding: {0}")]
    MalformedEncoding(String),

    /// A configured indexed pattern did not match `s?p?o?c?`.
    #[error("invalid indexed pattern {pattern:?}: must match s?p?o?c? with each position at most once, in order")]
    InvalidPattern { pattern: String },

    /// A value of unknown variant was presented at the boundary.
    #[error("illegal value at store boundary: {0}")]
    IllegalValue(String),

    /// Best-effort detection of a mutation racing a live iteration on a
    /// non-transactional backing graph.
    #[error("concurrent modification detected during statement iteration")]
    ConcurrentModification,
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn store_failure(err: impl std::fmt::Display) -> Self {
        StoreError::StoreFailure(err.to_string())
    }
}
