//! Error types for aggregation building.

use thiserror::Error;
use vitrine_query::QueryError;

/// Errors raised while turning bucket definitions into bucket trees.
///
/// Every variant names the definition it was raised for.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// Unknown bucket type.
    #[error("aggregation '{name}': unsupported bucket type '{bucket_type}'")]
    UnsupportedBucketType {
        /// Definition name.
        name: String,
        /// Requested type.
        bucket_type: String,
    },

    /// Unknown metric type.
    #[error("aggregation '{name}': unsupported metric type '{metric_type}'")]
    UnsupportedMetricType {
        /// Metric name.
        name: String,
        /// Requested type.
        metric_type: String,
    },

    /// Unknown pipeline type.
    #[error("aggregation '{name}': unsupported pipeline type '{pipeline_type}'")]
    UnsupportedPipelineType {
        /// Pipeline name.
        name: String,
        /// Requested type.
        pipeline_type: String,
    },

    /// Unknown term bucket sort order.
    #[error("aggregation '{name}': unsupported sort order '{sort_order}'")]
    UnsupportedSortOrder {
        /// Definition name.
        name: String,
        /// Requested order.
        sort_order: String,
    },

    /// The bucket type needs a field and none was given.
    #[error("aggregation '{name}': {bucket_type} bucket requires a field")]
    MissingField {
        /// Definition name.
        name: String,
        /// Bucket type.
        bucket_type: String,
    },

    /// The definition is inconsistent for its type.
    #[error("aggregation '{name}': {message}")]
    InvalidDefinition {
        /// Definition name.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// A query embedded in the definition could not be built.
    #[error("aggregation '{name}': {source}")]
    Query {
        /// Definition name.
        name: String,
        /// Underlying query error.
        source: QueryError,
    },

    /// The inputs of a build could not be serialized for its cache key.
    #[error("aggregations of '{name}': cannot hash cache key: {source}")]
    CacheKey {
        /// Container name.
        name: String,
        /// Underlying serialization error.
        source: serde_json::Error,
    },
}

impl AggregationError {
    /// Creates an `InvalidDefinition` error.
    pub(crate) fn invalid(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Returns the name of the definition the error was raised for.
    pub fn name(&self) -> &str {
        match self {
            Self::UnsupportedBucketType { name, .. }
            | Self::UnsupportedMetricType { name, .. }
            | Self::UnsupportedPipelineType { name, .. }
            | Self::UnsupportedSortOrder { name, .. }
            | Self::MissingField { name, .. }
            | Self::InvalidDefinition { name, .. }
            | Self::Query { name, .. }
            | Self::CacheKey { name, .. } => name,
        }
    }
}
