//! The assembled request and its wire rendering.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use vitrine_aggregation::{Bucket, SharedBuckets, render_aggregations};
use vitrine_config::TrackTotalHits;
use vitrine_query::{QueryNode, SortOrder, compile, render_sort_orders, request_hash};

use crate::params::{Collapse, SourceConfig, SpellingType};

/// One compiled search request.
///
/// Built by the assembler once per search call and never modified
/// afterwards; accessors expose its parts.
#[derive(Debug, Clone)]
pub struct Request {
    /// Container the request was built for.
    pub(crate) name: String,
    /// Target index.
    pub(crate) index_name: String,
    /// Main query.
    pub(crate) query: QueryNode,
    /// Post filter: restricts hits without scoping aggregations.
    pub(crate) filter: Option<QueryNode>,
    /// Sort orders.
    pub(crate) sort_orders: Vec<SortOrder>,
    /// Offset of the first hit.
    pub(crate) from: u64,
    /// Page size.
    pub(crate) size: u64,
    /// Scope discriminators.
    pub(crate) dimensions: IndexMap<String, String>,
    /// Aggregation trees.
    pub(crate) buckets: SharedBuckets,
    /// Fuzziness mode of the fulltext query.
    pub(crate) spelling_type: SpellingType,
    /// Hit counting mode.
    pub(crate) track_total_hits: TrackTotalHits,
    /// Minimum relevance score.
    pub(crate) min_score: Option<f32>,
    /// Field collapsing, on a physical field.
    pub(crate) collapse: Option<Collapse>,
    /// Returned fields.
    pub(crate) source: Option<SourceConfig>,
}

impl Request {
    /// Container name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target index name.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Main query.
    pub fn query(&self) -> &QueryNode {
        &self.query
    }

    /// Post filter.
    pub fn filter(&self) -> Option<&QueryNode> {
        self.filter.as_ref()
    }

    /// Sort orders.
    pub fn sort_orders(&self) -> &[SortOrder] {
        &self.sort_orders
    }

    /// Offset of the first hit.
    pub fn from(&self) -> u64 {
        self.from
    }

    /// Page size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the request only counts hits and computes aggregations.
    pub fn is_count_only(&self) -> bool {
        self.size == 0
    }

    /// Scope discriminators.
    pub fn dimensions(&self) -> &IndexMap<String, String> {
        &self.dimensions
    }

    /// Aggregation trees.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Fuzziness mode of the fulltext query.
    pub fn spelling_type(&self) -> SpellingType {
        self.spelling_type
    }

    /// Hit counting mode.
    pub fn track_total_hits(&self) -> TrackTotalHits {
        self.track_total_hits
    }

    /// Minimum relevance score.
    pub fn min_score(&self) -> Option<f32> {
        self.min_score
    }

    /// Field collapsing.
    pub fn collapse(&self) -> Option<&Collapse> {
        self.collapse.as_ref()
    }

    /// Returned fields.
    pub fn source(&self) -> Option<&SourceConfig> {
        self.source.as_ref()
    }

    /// Hash of the rendered body, stable across identical requests.
    pub fn fingerprint(&self) -> String {
        request_hash(&render_request(self))
    }
}

/// Renders the engine request body.
///
/// Count-only requests render an explicit `size: 0`, no sort, no collapse
/// and `_source: false`.
pub fn render_request(request: &Request) -> Value {
    let mut body = Map::new();
    body.insert("from".into(), json!(request.from));
    body.insert("size".into(), json!(request.size));

    if !request.is_count_only() && !request.sort_orders.is_empty() {
        body.insert("sort".into(), render_sort_orders(&request.sort_orders));
    }

    body.insert("query".into(), compile(&request.query));

    if let Some(filter) = &request.filter {
        body.insert("post_filter".into(), compile(filter));
    }

    if !request.buckets.is_empty() {
        body.insert("aggregations".into(), render_aggregations(&request.buckets));
    }

    body.insert("track_total_hits".into(), json!(request.track_total_hits));

    if let Some(min_score) = request.min_score {
        body.insert("min_score".into(), json!(min_score));
    }

    if request.is_count_only() {
        body.insert("_source".into(), Value::Bool(false));
        return Value::Object(body);
    }

    if let Some(collapse) = &request.collapse {
        body.insert("collapse".into(), json!(collapse));
    }

    if let Some(source) = &request.source {
        body.insert("_source".into(), json!(source));
    }

    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vitrine_mapping::SortDirection;

    use super::*;
    use crate::params::InnerHits;

    fn request(size: u64) -> Request {
        Request {
            name: "catalog_view".into(),
            index_name: "catalog_product".into(),
            query: QueryNode::match_all(),
            filter: Some(QueryNode::term("color", "red")),
            sort_orders: vec![SortOrder::score(SortDirection::Desc)],
            from: 0,
            size,
            dimensions: IndexMap::new(),
            buckets: Arc::new(Vec::new()),
            spelling_type: SpellingType::Exact,
            track_total_hits: TrackTotalHits::Enabled(true),
            min_score: None,
            collapse: Some(Collapse {
                field: "sku".into(),
                inner_hits: Some(InnerHits {
                    name: "variants".into(),
                    size: 3,
                }),
            }),
            source: Some(SourceConfig::Fields {
                includes: vec!["name".into()],
                excludes: Vec::new(),
            }),
        }
    }

    #[test]
    fn renders_a_page_of_hits() {
        assert_eq!(
            render_request(&request(20)),
            json!({
                "from": 0,
                "size": 20,
                "sort": [{ "_score": { "order": "desc" } }],
                "query": { "match_all": {} },
                "post_filter": { "term": { "color": { "value": "red" } } },
                "track_total_hits": true,
                "collapse": {
                    "field": "sku",
                    "inner_hits": { "name": "variants", "size": 3 }
                },
                "_source": { "includes": ["name"] }
            })
        );
    }

    #[test]
    fn count_only_skips_fetch() {
        let rendered = render_request(&request(0));
        assert_eq!(rendered["size"], 0);
        assert!(rendered.get("sort").is_none());
        assert!(rendered.get("collapse").is_none());
        assert_eq!(rendered["_source"], false);
    }

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(request(10).fingerprint(), request(10).fingerprint());
        assert_ne!(request(10).fingerprint(), request(20).fingerprint());
    }
}
