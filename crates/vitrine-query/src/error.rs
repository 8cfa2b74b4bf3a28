//! Error types for query construction.

use thiserror::Error;

/// Errors raised while building query trees from definitions.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The definition names a query type with no compiler case.
    #[error("unsupported query type: {0}")]
    UnsupportedQueryType(String),

    /// The definition names a span clause type with no compiler case.
    #[error("unsupported span query type: {0}")]
    UnsupportedSpanType(String),

    /// The definition is structurally invalid for its query type.
    #[error("invalid {query_type} query: {message}")]
    InvalidQuery {
        /// Query type being built.
        query_type: String,
        /// What is wrong with it.
        message: String,
    },

    /// The definition parameters could not be decoded.
    #[error("invalid {query_type} query definition: {source}")]
    Definition {
        /// Query type being built.
        query_type: String,
        /// Underlying decoding error.
        source: serde_json::Error,
    },
}

impl QueryError {
    /// Creates an `InvalidQuery` error.
    pub fn invalid(query_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            query_type: query_type.into(),
            message: message.into(),
        }
    }

    /// Creates a `Definition` error.
    pub(crate) fn definition(query_type: &str, source: serde_json::Error) -> Self {
        Self::Definition {
            query_type: query_type.to_string(),
            source,
        }
    }
}
