//! DSL error types.
//!
//! Every failure in this crate is local to the call that produced it. Nothing
//! is retried and nothing is partially composed.

use thiserror::Error;

/// Errors that can occur while building, composing or reading search requests.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DslError {
    /// `back()` was called outside any bool/and/or scope.
    #[error("Navigation error: no enclosing rooted filter found")]
    Navigation,

    /// A node that composes a single child had more than one.
    #[error("Composition arity error: expected at most {expected} child filter(s), found {found}")]
    CompositionArity { expected: usize, found: usize },

    /// A non-root member of a bool/and/or family was composed directly.
    #[error("Unsupported root composition: only the root of a {0} filter may be composed")]
    UnsupportedRootComposition(&'static str),

    /// A filter was attached to a bool root instead of one of its clauses.
    #[error("Misplaced bool filter: {found} filter(s) outside must, must_not and should")]
    MisplacedBoolFilter { found: usize },

    /// A node id was used with a tree that did not issue it.
    #[error("Unknown filter node: {0}")]
    UnknownNode(usize),

    /// A property accessor did not describe a field path.
    #[error("Unresolvable property path: {0}")]
    UnresolvablePropertyPath(String),

    /// An operation left for integrators was called without an implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// The requested page size is above the configured maximum.
    #[error("Page size {provided} exceeds maximum {max}")]
    PageSizeExceeded { provided: i64, max: i64 },

    /// A search response did not contain the named aggregation.
    #[error("Aggregation not found: {0}")]
    AggregationNotFound(String),

    /// An aggregation result did not have the expected shape.
    #[error("Result parse error: {0}")]
    ResultParse(String),

    /// A composed document could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The executor failed to run the request.
    #[error("Execution error: {0}")]
    Execution(String),
}

impl DslError {
    /// Create an arity error for a single-child slot.
    pub fn arity(found: usize) -> Self {
        Self::CompositionArity { expected: 1, found }
    }

    /// Create an unresolvable property path error.
    pub fn unresolvable(msg: impl Into<String>) -> Self {
        Self::UnresolvablePropertyPath(msg.into())
    }

    /// Create a not implemented error.
    pub fn not_implemented(what: impl Into<String>) -> Self {
        Self::NotImplemented(what.into())
    }

    /// Create a page size exceeded error.
    pub fn page_size_exceeded(provided: i64, max: i64) -> Self {
        Self::PageSizeExceeded { provided, max }
    }

    /// Create a result parse error.
    pub fn result_parse(msg: impl Into<String>) -> Self {
        Self::ResultParse(msg.into())
    }

    /// Create an execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }
}

impl From<serde_json::Error> for DslError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
