//! Raw aggregation definitions.
//!
//! Definitions come from container configuration or from the search call,
//! and are string-typed: type names, logical field names and query
//! definitions are only validated when the definition is built into a
//! [`Bucket`](crate::Bucket).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{OneOrMany, serde_as};
use vitrine_mapping::SortDirection;

use crate::{filter::FilterSet, model::BucketsPath};

/// Default number of term buckets.
pub const DEFAULT_BUCKET_SIZE: u32 = 10;

/// Default number of top hits.
pub const DEFAULT_TOP_HITS_SIZE: u32 = 3;

/// Declaration of one aggregation, keyed by name in its parent map.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketDefinition {
    /// Bucket type tag.
    #[serde(rename = "type")]
    pub bucket_type: String,
    /// Logical field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Maximum number of buckets or hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Minimum document count of a bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_doc_count: Option<u32>,
    /// Term bucket order tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    /// Term values or pattern to keep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Value>,
    /// Term values or pattern to drop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Value>,
    /// Histogram interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<Value>,
    /// Histogram forced bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_bounds: Option<Value>,
    /// Query group definitions, by bucket name.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub queries: IndexMap<String, Value>,
    /// Metric type tag, for metric buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    /// Metric script, for metric buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Value>,
    /// Extra metric options, for metric buckets.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
    /// Significance heuristic tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Top hits source fields, as one name or a list.
    #[serde_as(as = "OneOrMany<_>")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_fields: Vec<String>,
    /// Top hits order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort_orders: Vec<SortDefinition>,
    /// Reverse nested target path. Ignored on other kinds: the nested path
    /// of a bucket always comes from the mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<String>,
    /// Filters applied to the bucket, passed down to its children.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub filters: FilterSet,
    /// Filters on nested objects, keyed relative to the nested path.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub nested_filter: FilterSet,
    /// Sub-aggregations.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub child_buckets: IndexMap<String, Self>,
    /// Metrics computed per bucket.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub metrics: IndexMap<String, MetricDefinition>,
    /// Pipelines computed per bucket.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub pipelines: IndexMap<String, PipelineDefinition>,
}

impl BucketDefinition {
    /// Creates a definition of the given type on a field.
    pub fn new(bucket_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            bucket_type: bucket_type.into(),
            field: Some(field.into()),
            ..Self::default()
        }
    }

    /// Creates a term bucket definition.
    pub fn term(field: impl Into<String>) -> Self {
        Self::new("term", field)
    }
}

/// Declaration of a metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricDefinition {
    /// Metric type tag.
    #[serde(rename = "type")]
    pub metric_type: String,
    /// Logical field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Script computing the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Value>,
    /// Extra options.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

/// Declaration of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineDefinition {
    /// Pipeline type tag.
    #[serde(rename = "type")]
    pub pipeline_type: String,
    /// Input metric path(s).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buckets_path: Option<BucketsPath>,
    /// Gap policy tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_policy: Option<String>,
    /// Extra options.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
}

/// One top hits sort entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDefinition {
    /// Logical field name, or `_score`.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::filter::FilterCondition;

    #[test]
    fn decodes_nested_definitions() {
        let definition: BucketDefinition = serde_json::from_value(json!({
            "type": "term",
            "field": "color",
            "size": 20,
            "sort_order": "relevance",
            "filters": { "in_stock": true },
            "child_buckets": {
                "size": { "type": "term", "field": "size" }
            },
            "metrics": {
                "avg_price": { "type": "avg", "field": "price.price" }
            },
            "pipelines": {
                "max_avg": { "type": "max_bucket", "buckets_path": "size>avg_price" }
            }
        }))
        .unwrap();

        assert_eq!(definition.bucket_type, "term");
        assert_eq!(definition.size, Some(20));
        assert_eq!(definition.filters["in_stock"], FilterCondition::value(true));
        assert_eq!(definition.child_buckets["size"], BucketDefinition::term("size"));
        assert_eq!(definition.metrics["avg_price"].metric_type, "avg");
        assert_eq!(
            definition.pipelines["max_avg"].buckets_path,
            Some(BucketsPath::Single("size>avg_price".into()))
        );
    }

    #[test]
    fn serialization_skips_unset_attributes() {
        let value = serde_json::to_value(BucketDefinition::term("color")).unwrap();
        assert_eq!(value, json!({ "type": "term", "field": "color" }));
    }

    #[test]
    fn source_fields_accept_one_or_many() {
        let one: BucketDefinition =
            serde_json::from_value(json!({ "type": "top_hits", "source_fields": "name" })).unwrap();
        let many: BucketDefinition = serde_json::from_value(
            json!({ "type": "top_hits", "source_fields": ["name", "sku"] }),
        )
        .unwrap();
        assert_eq!(one.source_fields, ["name"]);
        assert_eq!(many.source_fields, ["name", "sku"]);
    }

    #[test]
    fn sort_definition_defaults_to_ascending() {
        let sort: SortDefinition = serde_json::from_value(json!({ "field": "name" })).unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);
    }
}
