//! Error types for request assembly.

use thiserror::Error;
use vitrine_aggregation::AggregationError;
use vitrine_config::ConfigError;
use vitrine_query::QueryError;

/// Errors raised while assembling a search request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Negative offset or page size.
    #[error("invalid pagination: from={from}, size={size}")]
    InvalidPagination {
        /// Requested offset.
        from: i64,
        /// Requested page size.
        size: i64,
    },

    /// A query definition could not be built.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// An aggregation definition could not be built.
    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    /// The container is not configured.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
