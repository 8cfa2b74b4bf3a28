//! Bucket trees.
//!
//! A [`Bucket`] is a fully resolved aggregation node: physical field names,
//! nested path derived from the mapping, compiled filters. Kind-specific
//! data lives in [`BucketKind`]; attributes every bucket shares live on the
//! bucket itself.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vitrine_query::{QueryNode, SortOrder};

/// Declares a string-tagged enum with `ALL`, `as_str`, `Display` and a
/// `FromStr` that returns the rejected tag as its error.
macro_rules! tagged_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $tag:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Returns the definition tag, which is also the wire name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| s.to_string())
            }
        }
    };
}

tagged_enum! {
    /// Bucket kinds accepted in definitions.
    BucketType {
        /// Distinct values of a field.
        Term => "term",
        /// Fixed-width numeric ranges.
        Histogram => "histogram",
        /// Calendar ranges.
        DateHistogram => "date_histogram",
        /// One bucket per named query.
        QueryGroup => "query_group",
        /// A single metric.
        Metric => "metric",
        /// Unusually frequent values of a field.
        SignificantTerm => "significant_term",
        /// Back from nested objects to their root documents.
        ReverseNested => "reverse_nested",
        /// Best matching documents per bucket.
        TopHits => "top_hits",
    }
}

tagged_enum! {
    /// Metric aggregation types.
    MetricType {
        /// Average.
        Avg => "avg",
        /// Minimum.
        Min => "min",
        /// Maximum.
        Max => "max",
        /// Sum.
        Sum => "sum",
        /// Count, min, max, avg and sum.
        Stats => "stats",
        /// Stats plus variance and deviation.
        ExtendedStats => "extended_stats",
        /// Approximate distinct count.
        Cardinality => "cardinality",
        /// Percentiles.
        Percentiles => "percentiles",
        /// Number of values.
        ValueCount => "value_count",
    }
}

tagged_enum! {
    /// Pipeline aggregation types.
    PipelineType {
        /// Average over sibling buckets.
        AvgBucket => "avg_bucket",
        /// Maximum over sibling buckets.
        MaxBucket => "max_bucket",
        /// Minimum over sibling buckets.
        MinBucket => "min_bucket",
        /// Sum over sibling buckets.
        SumBucket => "sum_bucket",
        /// Stats over sibling buckets.
        StatsBucket => "stats_bucket",
        /// Extended stats over sibling buckets.
        ExtendedStatsBucket => "extended_stats_bucket",
        /// Percentiles over sibling buckets.
        PercentilesBucket => "percentiles_bucket",
        /// Per-bucket script over parent metrics.
        BucketScript => "bucket_script",
        /// Drops buckets for which a script is false.
        BucketSelector => "bucket_selector",
        /// Sorts and truncates parent buckets.
        BucketSort => "bucket_sort",
        /// Running sum over a histogram.
        CumulativeSum => "cumulative_sum",
        /// Derivative over a histogram.
        Derivative => "derivative",
    }
}

tagged_enum! {
    /// Order of term buckets.
    TermSortOrder {
        /// Most documents first, then by key.
        Count => "count",
        /// Alphabetical by key.
        Term => "term",
        /// Best average score first.
        Relevance => "relevance",
        /// Rendered like `count`; the caller reorders buckets itself.
        Manual => "manual",
    }
}

tagged_enum! {
    /// Scoring heuristics of significant term buckets.
    SignificanceAlgorithm {
        /// JLH score.
        Jlh => "jlh",
        /// Google normalized distance.
        Gnd => "gnd",
        /// Chi square.
        ChiSquare => "chi_square",
        /// Mutual information.
        MutualInformation => "mutual_information",
        /// Percentage score.
        PercentageScore => "percentage",
    }
}

tagged_enum! {
    /// Handling of gaps in pipeline input.
    GapPolicy {
        /// Skip empty buckets.
        Skip => "skip",
        /// Treat empty buckets as zero.
        InsertZeros => "insert_zeros",
    }
}

/// Term bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct TermBucket {
    /// Physical field.
    pub field: String,
    /// Maximum number of buckets.
    pub size: u32,
    /// Minimum document count of a bucket.
    pub min_doc_count: Option<u32>,
    /// Bucket order.
    pub sort_order: TermSortOrder,
    /// Values or pattern to keep.
    pub include: Option<Value>,
    /// Values or pattern to drop.
    pub exclude: Option<Value>,
}

/// Histogram or date histogram bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBucket {
    /// Physical field.
    pub field: String,
    /// Bucket width: a number, or a calendar interval for dates.
    pub interval: Value,
    /// Minimum document count of a bucket.
    pub min_doc_count: u32,
    /// Forced `{min, max}` range of buckets.
    pub extended_bounds: Option<Value>,
}

/// One bucket per named query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryGroupBucket {
    /// Named queries, in declaration order.
    pub queries: IndexMap<String, QueryNode>,
}

/// Significant term bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct SignificantTermBucket {
    /// Physical field.
    pub field: String,
    /// Maximum number of buckets.
    pub size: u32,
    /// Minimum document count of a bucket.
    pub min_doc_count: u32,
    /// Significance heuristic.
    pub algorithm: SignificanceAlgorithm,
}

/// Reverse nested bucket.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReverseNestedBucket {
    /// Target nested path; the root document when unset.
    pub path: Option<String>,
}

/// Top hits bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct TopHitsBucket {
    /// Number of hits per bucket.
    pub size: u32,
    /// Source fields to return; all when empty.
    pub source_fields: Vec<String>,
    /// Hit order.
    pub sort_orders: Vec<SortOrder>,
}

/// A metric, as a child of a bucket or as a bucket of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Aggregation name.
    pub name: String,
    /// Metric type.
    pub metric_type: MetricType,
    /// Physical field.
    pub field: Option<String>,
    /// Script computing the value instead of a field.
    pub script: Option<Value>,
    /// Extra type-specific options, rendered as-is.
    pub config: Map<String, Value>,
}

/// Reference(s) to the metrics a pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BucketsPath {
    /// One sibling path.
    Single(String),
    /// Script variables mapped to paths.
    Named(IndexMap<String, String>),
}

/// A pipeline aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    /// Aggregation name.
    pub name: String,
    /// Pipeline type.
    pub pipeline_type: PipelineType,
    /// Input metric path(s).
    pub buckets_path: Option<BucketsPath>,
    /// Gap handling.
    pub gap_policy: Option<GapPolicy>,
    /// Extra type-specific options, rendered as-is.
    pub config: Map<String, Value>,
}

/// Kind-specific part of a bucket.
#[derive(Debug, Clone, PartialEq)]
pub enum BucketKind {
    /// Distinct values.
    Term(TermBucket),
    /// Numeric ranges.
    Histogram(HistogramBucket),
    /// Calendar ranges.
    DateHistogram(HistogramBucket),
    /// Named queries.
    QueryGroup(QueryGroupBucket),
    /// Single metric.
    Metric(Metric),
    /// Significant values.
    SignificantTerm(SignificantTermBucket),
    /// Back to the root document.
    ReverseNested(ReverseNestedBucket),
    /// Best hits.
    TopHits(TopHitsBucket),
}

impl BucketKind {
    /// Returns the bucket type tag.
    pub fn bucket_type(&self) -> BucketType {
        match self {
            Self::Term(_) => BucketType::Term,
            Self::Histogram(_) => BucketType::Histogram,
            Self::DateHistogram(_) => BucketType::DateHistogram,
            Self::QueryGroup(_) => BucketType::QueryGroup,
            Self::Metric(_) => BucketType::Metric,
            Self::SignificantTerm(_) => BucketType::SignificantTerm,
            Self::ReverseNested(_) => BucketType::ReverseNested,
            Self::TopHits(_) => BucketType::TopHits,
        }
    }

    /// Returns the physical field the bucket reads, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Term(b) => Some(&b.field),
            Self::Histogram(b) | Self::DateHistogram(b) => Some(&b.field),
            Self::SignificantTerm(b) => Some(&b.field),
            Self::Metric(m) => m.field.as_deref(),
            Self::QueryGroup(_) | Self::ReverseNested(_) | Self::TopHits(_) => None,
        }
    }
}

/// A resolved aggregation node.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// Aggregation name.
    pub name: String,
    /// Kind-specific data.
    pub kind: BucketKind,
    /// Nested path of the bucket's field, if nested.
    pub nested_path: Option<String>,
    /// Nested scope of an enclosing bucket when the bucket has no nested
    /// path of its own. Rendering adds no envelope for it.
    pub inherited_nested_path: Option<String>,
    /// Restricts the documents the bucket sees.
    pub filter: Option<QueryNode>,
    /// Restricts the nested objects the bucket sees.
    pub nested_filter: Option<QueryNode>,
    /// Sub-buckets.
    pub child_buckets: Vec<Self>,
    /// Metrics computed per bucket.
    pub metrics: Vec<Metric>,
    /// Pipelines computed per bucket.
    pub pipelines: Vec<Pipeline>,
}

impl Bucket {
    /// Creates a bucket with no nesting, filter or children.
    pub fn new(name: impl Into<String>, kind: BucketKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nested_path: None,
            inherited_nested_path: None,
            filter: None,
            nested_filter: None,
            child_buckets: Vec::new(),
            metrics: Vec::new(),
            pipelines: Vec::new(),
        }
    }

    /// Returns the bucket type tag.
    pub fn bucket_type(&self) -> BucketType {
        self.kind.bucket_type()
    }

    /// Whether the bucket runs on nested objects, its own or an ancestor's.
    pub fn is_nested(&self) -> bool {
        self.nested_path.is_some() || self.inherited_nested_path.is_some()
    }
}
