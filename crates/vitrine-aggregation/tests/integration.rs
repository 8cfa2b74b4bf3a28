//! Integration tests for vitrine-aggregation.
//!
//! Builds bucket trees from JSON definitions against a catalog mapping and
//! checks the rendered aggregation JSON.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use indexmap::IndexMap;
use serde_json::{Value, json};
use vitrine_aggregation::{
    AggregationCache, AggregationError, BucketDefinition, CacheKey, CacheTag, FilterBuilder,
    FilterCondition, FilterSet, MemoryAggregationCache, build_aggregations, render_aggregations,
};
use vitrine_mapping::{Field, FieldConfig, FieldType, Mapping};
use vitrine_query::{BoolQuery, QueryNode};

/// Resolves each filter through the mapping into a `terms` query.
struct MappingFilters<'a>(&'a Mapping);

impl FilterBuilder for MappingFilters<'_> {
    fn build_filter(&self, filters: &FilterSet, _current_path: Option<&str>) -> Option<QueryNode> {
        let mut query = BoolQuery::new();
        for (name, condition) in filters {
            if let FilterCondition::Values(values) = condition {
                let field = self.0.resolve_for_aggregation(name).field;
                query = query.must(QueryNode::terms(field, values.clone()));
            }
        }
        (!query.is_empty()).then(|| query.into())
    }
}

fn catalog_mapping() -> Mapping {
    let filterable = FieldConfig {
        is_filterable: true,
        ..FieldConfig::default()
    };
    let searchable = FieldConfig {
        is_searchable: true,
        is_filterable: true,
        ..FieldConfig::default()
    };
    Mapping::new(
        "entity_id",
        vec![
            Field::new("name", FieldType::Text, None, searchable).unwrap(),
            Field::new("color", FieldType::Keyword, None, filterable.clone()).unwrap(),
            Field::new("manufacturer", FieldType::Keyword, None, filterable.clone()).unwrap(),
            Field::new("price.price", FieldType::Double, Some("price".into()), filterable.clone())
                .unwrap(),
            Field::new(
                "price.customer_group_id",
                FieldType::Integer,
                Some("price".into()),
                filterable,
            )
            .unwrap(),
        ],
    )
    .unwrap()
}

fn definitions(value: Value) -> IndexMap<String, BucketDefinition> {
    serde_json::from_value(value).unwrap()
}

fn facet_filters(value: Value) -> FilterSet {
    serde_json::from_value(value).unwrap()
}

#[test]
fn facet_is_not_filtered_by_its_own_selection() {
    let mapping = catalog_mapping();
    let buckets = build_aggregations(
        &mapping,
        &definitions(json!({ "color": { "type": "term", "field": "color" } })),
        &facet_filters(json!({ "color": "red" })),
        &MappingFilters(&mapping),
    )
    .unwrap();

    assert_eq!(
        render_aggregations(&buckets),
        json!({ "color": { "terms": {
            "field": "color",
            "size": 10,
            "order": [{ "_count": "desc" }, { "_key": "asc" }]
        } } })
    );
}

#[test]
fn sibling_facets_keep_other_selections() {
    let mapping = catalog_mapping();
    let buckets = build_aggregations(
        &mapping,
        &definitions(json!({
            "color": { "type": "term", "field": "color" },
            "manufacturer": { "type": "term", "field": "manufacturer", "sort_order": "term" }
        })),
        &facet_filters(json!({ "color": ["red", "blue"] })),
        &MappingFilters(&mapping),
    )
    .unwrap();

    let rendered = render_aggregations(&buckets);
    assert!(rendered["color"].get("filter").is_none());
    assert_eq!(
        rendered["manufacturer"],
        json!({
            "filter": { "bool": { "must": [{ "terms": { "color": ["red", "blue"] } }] } },
            "aggregations": { "manufacturer": { "terms": {
                "field": "manufacturer",
                "size": 10,
                "order": { "_key": "asc" }
            } } }
        })
    );
}

#[test]
fn text_field_aggregates_on_untouched_property() {
    let mapping = catalog_mapping();
    let buckets = build_aggregations(
        &mapping,
        &definitions(json!({ "name": { "type": "term", "field": "name", "size": 5 } })),
        &FilterSet::new(),
        &MappingFilters(&mapping),
    )
    .unwrap();
    assert_eq!(
        render_aggregations(&buckets)["name"]["terms"]["field"],
        "name.untouched"
    );
}

#[test]
fn nested_histogram_with_nested_filter() {
    let mapping = catalog_mapping();
    let buckets = build_aggregations(
        &mapping,
        &definitions(json!({
            "price": {
                "type": "histogram",
                "field": "price.price",
                "interval": 10,
                "min_doc_count": 1,
                "nested_filter": { "customer_group_id": 0 },
                "metrics": { "max_price": { "type": "max", "field": "price.price" } }
            }
        })),
        &FilterSet::new(),
        &MappingFilters(&mapping),
    )
    .unwrap();

    assert_eq!(
        render_aggregations(&buckets),
        json!({ "price": {
            "nested": { "path": "price" },
            "aggregations": { "price": {
                "filter": { "bool": { "must": [{ "terms": { "price.customer_group_id": [0] } }] } },
                "aggregations": { "price": {
                    "histogram": { "field": "price.price", "interval": 10, "min_doc_count": 1 },
                    "aggregations": { "max_price": { "max": { "field": "price.price" } } }
                } }
            } }
        } })
    );
}

#[test]
fn query_group_with_one_named_filter() {
    let mapping = catalog_mapping();
    let buckets = build_aggregations(
        &mapping,
        &definitions(json!({
            "promotions": {
                "type": "query_group",
                "queries": { "sales": { "type": "exists", "field": "sale" } }
            }
        })),
        &FilterSet::new(),
        &MappingFilters(&mapping),
    )
    .unwrap();

    let filters = &render_aggregations(&buckets)["promotions"]["filters"]["filters"];
    assert_eq!(filters.as_object().unwrap().len(), 1);
    assert_eq!(filters["sales"], json!({ "exists": { "field": "sale" } }));
}

#[test]
fn unknown_child_metric_names_the_metric() {
    let mapping = catalog_mapping();
    let err = build_aggregations(
        &mapping,
        &definitions(json!({
            "color": {
                "type": "term",
                "field": "color",
                "child_buckets": {
                    "brands": {
                        "type": "term",
                        "field": "manufacturer",
                        "metrics": { "spread": { "type": "variance", "field": "price.price" } }
                    }
                }
            }
        })),
        &FilterSet::new(),
        &MappingFilters(&mapping),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        AggregationError::UnsupportedMetricType { ref name, ref metric_type }
            if name == "spread" && metric_type == "variance"
    ));
}

#[test]
fn cached_trees_render_identically() {
    let mapping = catalog_mapping();
    let cache = MemoryAggregationCache::default();
    let definitions = definitions(json!({
        "color": { "type": "term", "field": "color" },
        "manufacturer": { "type": "term", "field": "manufacturer" }
    }));
    let filters = facet_filters(json!({ "color": "red" }));
    let key = CacheKey::compute("catalog", [("store", "1")], &definitions, &filters).unwrap();
    let tags = [CacheTag::container("catalog")];

    let render = || {
        let buckets = cache
            .get_or_build(key, &tags, &mut || {
                build_aggregations(&mapping, &definitions, &filters, &MappingFilters(&mapping))
            })
            .unwrap();
        render_aggregations(&buckets)
    };
    let first = render();
    let second = render();
    assert_eq!(first, second);

    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.invalidate(&CacheTag::container("catalog")), 1);
    assert_eq!(cache.stats().entry_count, 0);
}
