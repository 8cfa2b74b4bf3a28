//! Aggregation trees for vitrine search requests.
//!
//! Raw [`BucketDefinition`]s (from container configuration or per search
//! call) are built into resolved [`Bucket`] trees against an index
//! [`Mapping`](vitrine_mapping::Mapping), then rendered to the engine's
//! `aggregations` JSON:
//!
//! - **Build**: [`build_aggregations`] resolves fields, derives nested paths,
//!   applies inherited filters (minus the bucket's own field) and validates
//!   metric and pipeline types
//! - **Render**: [`render_aggregations`] emits bodies wrapped in nested and
//!   filter envelopes
//! - **Cache**: [`AggregationCache`] stores built trees by content hash

#![warn(missing_docs)]

mod builder;
mod cache;
mod definition;
mod error;
mod filter;
mod model;
mod render;

pub use builder::{build_aggregations, build_bucket, build_metric, build_pipeline};
pub use cache::{
    AggregationCache, CacheKey, CacheStats, CacheTag, DEFAULT_MAX_ENTRIES, MemoryAggregationCache,
    SharedBuckets,
};
pub use definition::{
    BucketDefinition, DEFAULT_BUCKET_SIZE, DEFAULT_TOP_HITS_SIZE, MetricDefinition,
    PipelineDefinition, SortDefinition,
};
pub use error::AggregationError;
pub use filter::{FilterBuilder, FilterCondition, FilterSet};
pub use model::{
    Bucket, BucketKind, BucketType, BucketsPath, GapPolicy, HistogramBucket, Metric, MetricType,
    Pipeline, PipelineType, QueryGroupBucket, ReverseNestedBucket, SignificanceAlgorithm,
    SignificantTermBucket, TermBucket, TermSortOrder, TopHitsBucket,
};
pub use render::{TERM_RELEVANCE, render_aggregations, render_bucket, render_metric, render_pipeline};
