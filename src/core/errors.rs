//! Error types for docquery
//!
//! This module defines the errors raised while building a query,
//! compiling it into wire documents, and executing it.

use thiserror::Error;

/// Error type produced by a collection implementation
pub type CollectionError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building, compiling or executing a query
#[derive(Error, Debug)]
pub enum QueryError {
    /// Operator or argument shape the compiler cannot lower
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Sub-query, parameter, template or factory node where a predicate was expected
    #[error("Unsupported expression node: {0}")]
    UnsupportedNode(&'static str),

    /// Rejected at the builder call site
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the collection, passed through untouched
    #[error("Execution error: {0}")]
    Execution(#[source] CollectionError),

    /// Failure reported by a result mapper
    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QueryError {
    /// Build an unsupported-operator error for the given rendering
    pub fn unsupported(what: impl Into<String>) -> Self {
        QueryError::UnsupportedOperator(what.into())
    }
}

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;
