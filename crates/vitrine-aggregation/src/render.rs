//! Renders bucket trees to the engine's aggregation JSON.
//!
//! Each bucket renders as a body (`terms`, `histogram`, ...) whose
//! `aggregations` hold its children, metrics and pipelines side by side.
//! Filters and nesting add envelopes around the body, all under the
//! bucket's own name, from the outside in:
//!
//! ```text
//! nested { path }  ->  filter (nested_filter)  ->  filter  ->  body
//! ```

use serde_json::{Map, Value, json};
use vitrine_mapping::SortDirection;
use vitrine_query::{SortOrder, compile, render_sort_orders};

use crate::model::{
    Bucket, BucketKind, BucketsPath, HistogramBucket, Metric, Pipeline, TermBucket, TermSortOrder,
    TopHitsBucket,
};

/// Name of the sub-aggregation backing relevance ordering.
pub const TERM_RELEVANCE: &str = "termRelevance";

/// Key of sub-aggregations in a rendered bucket.
const AGGREGATIONS: &str = "aggregations";

/// Renders buckets as an `aggregations` object keyed by bucket name.
pub fn render_aggregations(buckets: &[Bucket]) -> Value {
    let mut aggregations = Map::new();
    for bucket in buckets {
        aggregations.insert(bucket.name.clone(), render_bucket(bucket));
    }
    Value::Object(aggregations)
}

/// Renders one bucket with its envelopes.
pub fn render_bucket(bucket: &Bucket) -> Value {
    let mut rendered = render_body(bucket);

    if let Some(filter) = &bucket.filter {
        rendered = envelope(&bucket.name, json!({ "filter": compile(filter) }), rendered);
    }
    if let Some(path) = &bucket.nested_path {
        if let Some(nested_filter) = &bucket.nested_filter {
            rendered = envelope(
                &bucket.name,
                json!({ "filter": compile(nested_filter) }),
                rendered,
            );
        }
        rendered = envelope(&bucket.name, json!({ "nested": { "path": path } }), rendered);
    }
    rendered
}

/// Wraps `inner` as the single sub-aggregation `name` of `outer`.
fn envelope(name: &str, outer: Value, inner: Value) -> Value {
    let mut outer = match outer {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    outer.insert(AGGREGATIONS.into(), json!({ name: inner }));
    Value::Object(outer)
}

/// Renders the bucket body and its sub-aggregations.
fn render_body(bucket: &Bucket) -> Value {
    let mut sub_aggregations = Map::new();
    for child in &bucket.child_buckets {
        sub_aggregations.insert(child.name.clone(), render_bucket(child));
    }
    for metric in &bucket.metrics {
        sub_aggregations.insert(metric.name.clone(), render_metric(metric));
    }
    for pipeline in &bucket.pipelines {
        sub_aggregations.insert(pipeline.name.clone(), render_pipeline(pipeline));
    }

    let mut body = Map::new();
    match &bucket.kind {
        BucketKind::Term(term) => {
            let by_relevance =
                term.sort_order == TermSortOrder::Relevance && bucket.child_buckets.is_empty();
            body.insert("terms".into(), render_terms(term, by_relevance));
            if by_relevance {
                sub_aggregations.insert(
                    TERM_RELEVANCE.into(),
                    json!({ "avg": { "script": "_score" } }),
                );
            }
        }
        BucketKind::Histogram(histogram) => {
            body.insert("histogram".into(), render_histogram(histogram));
        }
        BucketKind::DateHistogram(histogram) => {
            body.insert("date_histogram".into(), render_histogram(histogram));
        }
        BucketKind::QueryGroup(group) => {
            let filters: Map<String, Value> = group
                .queries
                .iter()
                .map(|(name, query)| (name.clone(), compile(query)))
                .collect();
            body.insert("filters".into(), json!({ "filters": filters }));
        }
        BucketKind::Metric(metric) => {
            body.insert(metric.metric_type.as_str().into(), metric_body(metric));
        }
        BucketKind::SignificantTerm(significant) => {
            let mut terms = Map::new();
            terms.insert("field".into(), Value::String(significant.field.clone()));
            terms.insert("size".into(), json!(significant.size));
            terms.insert("min_doc_count".into(), json!(significant.min_doc_count));
            terms.insert(significant.algorithm.as_str().into(), json!({}));
            body.insert("significant_terms".into(), Value::Object(terms));
        }
        BucketKind::ReverseNested(reverse) => {
            let value = match &reverse.path {
                Some(path) => json!({ "path": path }),
                None => json!({}),
            };
            body.insert("reverse_nested".into(), value);
        }
        BucketKind::TopHits(top_hits) => {
            body.insert("top_hits".into(), render_top_hits(top_hits, bucket.is_nested()));
        }
    }

    if !sub_aggregations.is_empty() {
        body.insert(AGGREGATIONS.into(), Value::Object(sub_aggregations));
    }
    Value::Object(body)
}

/// Renders a `terms` body.
fn render_terms(term: &TermBucket, by_relevance: bool) -> Value {
    let order = if by_relevance {
        json!({ TERM_RELEVANCE: "desc" })
    } else {
        match term.sort_order {
            TermSortOrder::Term => json!({ "_key": "asc" }),
            TermSortOrder::Count | TermSortOrder::Manual | TermSortOrder::Relevance => {
                json!([{ "_count": "desc" }, { "_key": "asc" }])
            }
        }
    };

    let mut body = Map::new();
    body.insert("field".into(), Value::String(term.field.clone()));
    body.insert("size".into(), json!(term.size));
    body.insert("order".into(), order);
    if let Some(min_doc_count) = term.min_doc_count {
        body.insert("min_doc_count".into(), json!(min_doc_count));
    }
    if let Some(include) = &term.include {
        body.insert("include".into(), include.clone());
    }
    if let Some(exclude) = &term.exclude {
        body.insert("exclude".into(), exclude.clone());
    }
    Value::Object(body)
}

/// Renders a `histogram` or `date_histogram` body.
fn render_histogram(histogram: &HistogramBucket) -> Value {
    let mut body = Map::new();
    body.insert("field".into(), Value::String(histogram.field.clone()));
    body.insert("interval".into(), histogram.interval.clone());
    body.insert("min_doc_count".into(), json!(histogram.min_doc_count));
    if let Some(bounds) = &histogram.extended_bounds {
        body.insert("extended_bounds".into(), bounds.clone());
    }
    Value::Object(body)
}

/// Renders a `top_hits` body.
fn render_top_hits(top_hits: &TopHitsBucket, nested: bool) -> Value {
    let mut body = Map::new();
    body.insert("size".into(), json!(top_hits.size));
    if !top_hits.source_fields.is_empty() {
        body.insert(
            "_source".into(),
            json!({ "includes": top_hits.source_fields }),
        );
    }
    if !top_hits.sort_orders.is_empty() {
        body.insert("sort".into(), render_sort_orders(&top_hits.sort_orders));
    } else if !nested {
        body.insert(
            "sort".into(),
            render_sort_orders(&[SortOrder::score(SortDirection::Desc)]),
        );
    }
    Value::Object(body)
}

/// Renders a metric as `{<type>: {...}}`.
pub fn render_metric(metric: &Metric) -> Value {
    json!({ metric.metric_type.as_str(): metric_body(metric) })
}

/// Renders the inner object of a metric.
fn metric_body(metric: &Metric) -> Value {
    let mut body = Map::new();
    if let Some(field) = &metric.field {
        body.insert("field".into(), Value::String(field.clone()));
    } else if let Some(script) = &metric.script {
        body.insert("script".into(), script.clone());
    }
    for (key, value) in &metric.config {
        body.insert(key.clone(), value.clone());
    }
    Value::Object(body)
}

/// Renders a pipeline as `{<type>: {...}}`.
pub fn render_pipeline(pipeline: &Pipeline) -> Value {
    let mut body = Map::new();
    match &pipeline.buckets_path {
        Some(BucketsPath::Single(path)) => {
            body.insert("buckets_path".into(), Value::String(path.clone()));
        }
        Some(BucketsPath::Named(paths)) => {
            let paths: Map<String, Value> = paths
                .iter()
                .map(|(name, path)| (name.clone(), Value::String(path.clone())))
                .collect();
            body.insert("buckets_path".into(), Value::Object(paths));
        }
        None => {}
    }
    if let Some(gap_policy) = pipeline.gap_policy {
        body.insert("gap_policy".into(), Value::String(gap_policy.as_str().into()));
    }
    for (key, value) in &pipeline.config {
        body.insert(key.clone(), value.clone());
    }
    json!({ pipeline.pipeline_type.as_str(): body })
}
