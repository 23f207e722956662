//! Executor error types

use thiserror::Error;

use crate::auth::AuthError;
use crate::types::TypeError;

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Query-level errors.
///
/// End-of-data is not an error: iterators report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// Value could not be converted to the type an expression requires
    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// Authorization failure
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Wrong number of children supplied to a tree rewrite
    #[error("invalid children number for {node}: got {got}, expected {expected}")]
    InvalidChildrenNumber {
        node: String,
        got: usize,
        expected: usize,
    },

    /// Wrong number of arguments supplied to a function factory
    #[error("function {function} expects {expected} arguments, got {got}")]
    InvalidArgumentNumber {
        function: String,
        got: usize,
        expected: usize,
    },

    /// No function registered under this name
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// An order-aware iterator was requested from a node that cannot provide one
    #[error("iterator is not orderable")]
    Unorderable,

    /// Plan has unbound names or types
    #[error("plan is not resolved: {0}")]
    Unresolved(String),

    /// Query was cancelled through its context
    #[error("query cancelled")]
    Cancelled,

    /// `next()` called after `close()`
    #[error("iterator is closed")]
    IteratorClosed,

    /// `next()` called again after the iterator returned an error
    #[error("iterator failed earlier")]
    IteratorFailed,

    /// Column index out of bounds
    #[error("column index {index} out of bounds (row has {row_len} columns)")]
    ColumnIndexOutOfBounds { index: usize, row_len: usize },

    /// Internal executor error
    #[error("internal error: {0}")]
    Internal(String),
}

impl ExecutorError {
    /// Arity error for a node or expression that takes exactly `expected` children
    pub fn invalid_children(node: impl Into<String>, got: usize, expected: usize) -> Self {
        ExecutorError::InvalidChildrenNumber {
            node: node.into(),
            got,
            expected,
        }
    }
}
