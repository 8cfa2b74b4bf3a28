//! Builds bucket trees from definitions.
//!
//! Building resolves logical field names through the mapping, derives each
//! bucket's nested path from its field, and compiles filters through the
//! injected [`FilterBuilder`]. Filters inherited from the request exclude
//! the ones keyed by the bucket's own field, so a facet is never narrowed
//! by its own selection.

use indexmap::IndexMap;
use tracing::debug;
use vitrine_mapping::{Mapping, ResolvedField};
use vitrine_query::{QueryFactory, QueryNode, SCORE_FIELD, SortMode, SortOrder};

use crate::{
    definition::{
        BucketDefinition, DEFAULT_BUCKET_SIZE, DEFAULT_TOP_HITS_SIZE, MetricDefinition,
        PipelineDefinition, SortDefinition,
    },
    error::AggregationError,
    filter::{FilterBuilder, FilterSet},
    model::{
        Bucket, BucketKind, BucketType, GapPolicy, HistogramBucket, Metric, MetricType, Pipeline,
        PipelineType, QueryGroupBucket, ReverseNestedBucket, SignificanceAlgorithm,
        SignificantTermBucket, TermBucket, TermSortOrder, TopHitsBucket,
    },
};

/// Default minimum document count of significant term buckets.
const SIGNIFICANT_MIN_DOC_COUNT: u32 = 3;

/// Builds one bucket per definition, in definition order.
///
/// `inherited_filters` are the filters of the enclosing scope (the request's
/// facet filters at the top level, the parent's own filters below it).
pub fn build_aggregations(
    mapping: &Mapping,
    definitions: &IndexMap<String, BucketDefinition>,
    inherited_filters: &FilterSet,
    filter_builder: &dyn FilterBuilder,
) -> Result<Vec<Bucket>, AggregationError> {
    build_scoped(mapping, definitions, inherited_filters, None, filter_builder)
}

/// Builds a single bucket and its sub-tree.
pub fn build_bucket(
    mapping: &Mapping,
    name: &str,
    definition: &BucketDefinition,
    inherited_filters: &FilterSet,
    filter_builder: &dyn FilterBuilder,
) -> Result<Bucket, AggregationError> {
    build_bucket_in(mapping, name, definition, inherited_filters, None, filter_builder)
}

/// Builds sibling buckets running inside the nested scope `parent_path`.
fn build_scoped(
    mapping: &Mapping,
    definitions: &IndexMap<String, BucketDefinition>,
    inherited_filters: &FilterSet,
    parent_path: Option<&str>,
    filter_builder: &dyn FilterBuilder,
) -> Result<Vec<Bucket>, AggregationError> {
    definitions
        .iter()
        .map(|(name, definition)| {
            build_bucket_in(
                mapping,
                name,
                definition,
                inherited_filters,
                parent_path,
                filter_builder,
            )
        })
        .collect()
}

/// Builds a bucket inside the nested scope `parent_path`.
///
/// Buckets on a nested field open their own scope. Buckets without one
/// (top hits, scripted metrics, query groups) run in the parent's scope, so
/// their filters compile relative to it. A reverse nested bucket moves its
/// children to its target path, or back to the root documents.
fn build_bucket_in(
    mapping: &Mapping,
    name: &str,
    definition: &BucketDefinition,
    inherited_filters: &FilterSet,
    parent_path: Option<&str>,
    filter_builder: &dyn FilterBuilder,
) -> Result<Bucket, AggregationError> {
    let bucket_type = definition
        .bucket_type
        .parse::<BucketType>()
        .map_err(|bucket_type| AggregationError::UnsupportedBucketType {
            name: name.to_string(),
            bucket_type,
        })?;
    let resolved = definition
        .field
        .as_deref()
        .map(|field| mapping.resolve_for_aggregation(field));

    let kind = build_kind(mapping, name, bucket_type, definition, resolved.as_ref())?;
    let nested_path = match bucket_type {
        BucketType::QueryGroup | BucketType::ReverseNested => None,
        _ => resolved.and_then(|r| r.nested_path),
    };
    let scope = nested_path.as_deref().or(parent_path);
    let child_scope = match bucket_type {
        BucketType::ReverseNested => definition.nested_path.as_deref(),
        _ => scope,
    };

    let mut bucket = Bucket::new(name, kind);
    bucket.filter = bucket_filter(definition, inherited_filters, scope, filter_builder);
    bucket.nested_filter = nested_filter(name, definition, nested_path.as_deref(), filter_builder);
    bucket.child_buckets = build_scoped(
        mapping,
        &definition.child_buckets,
        &definition.filters,
        child_scope,
        filter_builder,
    )?;
    if nested_path.is_none() {
        bucket.inherited_nested_path = parent_path.map(str::to_string);
    }
    bucket.nested_path = nested_path;
    bucket.metrics = definition
        .metrics
        .iter()
        .map(|(metric_name, metric)| build_metric(mapping, metric_name, metric))
        .collect::<Result<_, _>>()?;
    bucket.pipelines = definition
        .pipelines
        .iter()
        .map(|(pipeline_name, pipeline)| build_pipeline(pipeline_name, pipeline))
        .collect::<Result<_, _>>()?;

    debug!(
        name,
        bucket_type = %bucket_type,
        nested_path = bucket.nested_path.as_deref(),
        parent_path,
        filtered = bucket.filter.is_some(),
        "built aggregation"
    );
    Ok(bucket)
}

/// Builds the kind-specific part of a bucket.
fn build_kind(
    mapping: &Mapping,
    name: &str,
    bucket_type: BucketType,
    definition: &BucketDefinition,
    resolved: Option<&ResolvedField>,
) -> Result<BucketKind, AggregationError> {
    let field = || {
        resolved
            .map(|r| r.field.clone())
            .ok_or_else(|| AggregationError::MissingField {
                name: name.to_string(),
                bucket_type: bucket_type.to_string(),
            })
    };

    Ok(match bucket_type {
        BucketType::Term => {
            let sort_order = match definition.sort_order.as_deref() {
                None => TermSortOrder::Count,
                Some(order) => order.parse::<TermSortOrder>().map_err(|sort_order| {
                    AggregationError::UnsupportedSortOrder {
                        name: name.to_string(),
                        sort_order,
                    }
                })?,
            };
            BucketKind::Term(TermBucket {
                field: field()?,
                size: definition.size.unwrap_or(DEFAULT_BUCKET_SIZE),
                min_doc_count: definition.min_doc_count,
                sort_order,
                include: definition.include.clone(),
                exclude: definition.exclude.clone(),
            })
        }
        BucketType::Histogram | BucketType::DateHistogram => {
            let histogram = HistogramBucket {
                field: field()?,
                interval: definition.interval.clone().ok_or_else(|| {
                    AggregationError::invalid(name, format!("{bucket_type} bucket requires an interval"))
                })?,
                min_doc_count: definition.min_doc_count.unwrap_or(0),
                extended_bounds: definition.extended_bounds.clone(),
            };
            if bucket_type == BucketType::Histogram {
                BucketKind::Histogram(histogram)
            } else {
                BucketKind::DateHistogram(histogram)
            }
        }
        BucketType::QueryGroup => BucketKind::QueryGroup(build_query_group(name, definition)?),
        BucketType::Metric => {
            let metric_type = definition.metric_type.as_deref().ok_or_else(|| {
                AggregationError::invalid(name, "metric bucket requires a metric_type")
            })?;
            let metric = MetricDefinition {
                metric_type: metric_type.to_string(),
                field: definition.field.clone(),
                script: definition.script.clone(),
                config: definition.config.clone(),
            };
            BucketKind::Metric(build_metric(mapping, name, &metric)?)
        }
        BucketType::SignificantTerm => {
            let algorithm = match definition.algorithm.as_deref() {
                None => SignificanceAlgorithm::Jlh,
                Some(algorithm) => algorithm.parse::<SignificanceAlgorithm>().map_err(|algorithm| {
                    AggregationError::invalid(
                        name,
                        format!("unsupported significance algorithm '{algorithm}'"),
                    )
                })?,
            };
            BucketKind::SignificantTerm(SignificantTermBucket {
                field: field()?,
                size: definition.size.unwrap_or(DEFAULT_BUCKET_SIZE),
                min_doc_count: definition.min_doc_count.unwrap_or(SIGNIFICANT_MIN_DOC_COUNT),
                algorithm,
            })
        }
        BucketType::ReverseNested => BucketKind::ReverseNested(ReverseNestedBucket {
            path: definition.nested_path.clone(),
        }),
        BucketType::TopHits => BucketKind::TopHits(TopHitsBucket {
            size: definition.size.unwrap_or(DEFAULT_TOP_HITS_SIZE),
            source_fields: definition.source_fields.clone(),
            sort_orders: definition
                .sort_orders
                .iter()
                .map(|sort| build_sort_order(mapping, sort))
                .collect(),
        }),
    })
}

/// Builds the named queries of a query group.
fn build_query_group(
    name: &str,
    definition: &BucketDefinition,
) -> Result<QueryGroupBucket, AggregationError> {
    if definition.queries.is_empty() {
        return Err(AggregationError::invalid(name, "query_group bucket requires queries"));
    }
    let queries = definition
        .queries
        .iter()
        .map(|(query_name, query)| {
            QueryFactory::from_definition(query.clone())
                .map(|node| (query_name.clone(), node))
                .map_err(|source| AggregationError::Query {
                    name: name.to_string(),
                    source,
                })
        })
        .collect::<Result<_, _>>()?;
    Ok(QueryGroupBucket { queries })
}

/// Compiles the bucket's own and inherited filters into one query.
fn bucket_filter(
    definition: &BucketDefinition,
    inherited_filters: &FilterSet,
    nested_path: Option<&str>,
    filter_builder: &dyn FilterBuilder,
) -> Option<QueryNode> {
    let own_field = definition.field.as_deref();
    let mut filters: FilterSet = inherited_filters
        .iter()
        .filter(|(field, _)| Some(field.as_str()) != own_field)
        .map(|(field, condition)| (field.clone(), condition.clone()))
        .collect();
    for (field, condition) in &definition.filters {
        filters.insert(field.clone(), condition.clone());
    }

    if filters.is_empty() {
        return None;
    }
    filter_builder.build_filter(&filters, nested_path)
}

/// Compiles the nested filter relative to the bucket's nested path.
fn nested_filter(
    name: &str,
    definition: &BucketDefinition,
    nested_path: Option<&str>,
    filter_builder: &dyn FilterBuilder,
) -> Option<QueryNode> {
    if definition.nested_filter.is_empty() {
        return None;
    }
    let Some(path) = nested_path else {
        debug!(name, "ignoring nested filter of a non-nested aggregation");
        return None;
    };

    let prefix = format!("{path}.");
    let filters: FilterSet = definition
        .nested_filter
        .iter()
        .map(|(field, condition)| {
            let field = if field.starts_with(&prefix) {
                field.clone()
            } else {
                format!("{prefix}{field}")
            };
            (field, condition.clone())
        })
        .collect();
    filter_builder.build_filter(&filters, Some(path))
}

/// Builds a metric from its definition.
pub fn build_metric(
    mapping: &Mapping,
    name: &str,
    definition: &MetricDefinition,
) -> Result<Metric, AggregationError> {
    let metric_type = definition
        .metric_type
        .parse::<MetricType>()
        .map_err(|metric_type| AggregationError::UnsupportedMetricType {
            name: name.to_string(),
            metric_type,
        })?;
    if definition.field.is_none() && definition.script.is_none() {
        return Err(AggregationError::MissingField {
            name: name.to_string(),
            bucket_type: metric_type.to_string(),
        });
    }

    Ok(Metric {
        name: name.to_string(),
        metric_type,
        field: definition
            .field
            .as_deref()
            .map(|field| mapping.resolve_for_aggregation(field).field),
        script: definition.script.clone(),
        config: definition.config.clone(),
    })
}

/// Builds a pipeline from its definition.
pub fn build_pipeline(
    name: &str,
    definition: &PipelineDefinition,
) -> Result<Pipeline, AggregationError> {
    let pipeline_type = definition
        .pipeline_type
        .parse::<PipelineType>()
        .map_err(|pipeline_type| AggregationError::UnsupportedPipelineType {
            name: name.to_string(),
            pipeline_type,
        })?;
    if definition.buckets_path.is_none() && pipeline_type != PipelineType::BucketSort {
        return Err(AggregationError::invalid(
            name,
            format!("{pipeline_type} pipeline requires a buckets_path"),
        ));
    }
    let gap_policy = definition
        .gap_policy
        .as_deref()
        .map(|policy| {
            policy.parse::<GapPolicy>().map_err(|policy| {
                AggregationError::invalid(name, format!("unsupported gap policy '{policy}'"))
            })
        })
        .transpose()?;

    Ok(Pipeline {
        name: name.to_string(),
        pipeline_type,
        buckets_path: definition.buckets_path.clone(),
        gap_policy,
        config: definition.config.clone(),
    })
}

/// Resolves a top hits sort entry.
fn build_sort_order(mapping: &Mapping, sort: &SortDefinition) -> SortOrder {
    if sort.field == SCORE_FIELD {
        return SortOrder::score(sort.direction);
    }
    let resolved = mapping.resolve_for_sort(&sort.field, sort.direction);
    match resolved.nested_path {
        Some(nested_path) => SortOrder::Nested {
            field: resolved.field,
            direction: sort.direction,
            missing: resolved.missing,
            nested_path,
            nested_filter: None,
            score_mode: SortMode::default(),
        },
        None => SortOrder::Standard {
            field: resolved.field,
            direction: sort.direction,
            missing: resolved.missing,
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vitrine_mapping::{Field, FieldConfig, FieldType, SortDirection};
    use vitrine_query::BoolQuery;

    use super::*;
    use crate::{filter::FilterCondition, render::render_bucket};

    /// Renders each filter as `term(key, first value)` under a `bool.must`,
    /// recording the current path as the query name.
    struct TermFilters;

    impl FilterBuilder for TermFilters {
        fn build_filter(&self, filters: &FilterSet, current_path: Option<&str>) -> Option<QueryNode> {
            let mut query = BoolQuery::new();
            for (field, condition) in filters {
                let value = match condition {
                    FilterCondition::Values(values) => values[0].clone(),
                    _ => json!(null),
                };
                query = query.must(QueryNode::term(field.clone(), value));
            }
            let query: QueryNode = query.into();
            Some(match current_path {
                Some(path) => query.named(path),
                None => query,
            })
        }
    }

    fn mapping() -> Mapping {
        let filterable = FieldConfig {
            is_filterable: true,
            ..FieldConfig::default()
        };
        Mapping::new(
            "entity_id",
            vec![
                Field::new("color", FieldType::Keyword, None, filterable.clone()).unwrap(),
                Field::new("size", FieldType::Keyword, None, filterable.clone()).unwrap(),
                Field::new("price", FieldType::Double, None, filterable.clone()).unwrap(),
                Field::new("stock.qty", FieldType::Integer, Some("stock".into()), filterable.clone())
                    .unwrap(),
                Field::new("stock.source", FieldType::Keyword, Some("stock".into()), filterable).unwrap(),
            ],
        )
        .unwrap()
    }

    fn filters(entries: &[(&str, &str)]) -> FilterSet {
        entries
            .iter()
            .map(|(field, value)| (field.to_string(), FilterCondition::value(*value)))
            .collect()
    }

    #[test]
    fn term_bucket_defaults() {
        let bucket = build_bucket(
            &mapping(),
            "color",
            &BucketDefinition::term("color"),
            &filters(&[("color", "red")]),
            &TermFilters,
        )
        .unwrap();

        let BucketKind::Term(term) = &bucket.kind else {
            panic!("expected term bucket");
        };
        assert_eq!(term.field, "color");
        assert_eq!(term.size, 10);
        assert_eq!(term.sort_order, TermSortOrder::Count);
        assert_eq!(bucket.filter, None);
        assert_eq!(bucket.nested_path, None);
    }

    #[test]
    fn inherited_filters_exclude_own_field_only() {
        let inherited = filters(&[("color", "red"), ("size", "M")]);
        let mapping = mapping();

        let color = build_bucket(&mapping, "color", &BucketDefinition::term("color"), &inherited, &TermFilters)
            .unwrap();
        let price = build_bucket(&mapping, "price", &BucketDefinition::term("price"), &inherited, &TermFilters)
            .unwrap();

        assert_eq!(
            color.filter,
            Some(BoolQuery::new().must(QueryNode::term("size", "M")).into())
        );
        assert_eq!(
            price.filter,
            Some(
                BoolQuery::new()
                    .must(QueryNode::term("color", "red"))
                    .must(QueryNode::term("size", "M"))
                    .into()
            )
        );
    }

    #[test]
    fn own_filters_override_inherited_ones() {
        let mut definition = BucketDefinition::term("price");
        definition.filters = filters(&[("size", "L")]);

        let bucket = build_bucket(
            &mapping(),
            "price",
            &definition,
            &filters(&[("size", "M")]),
            &TermFilters,
        )
        .unwrap();
        assert_eq!(
            bucket.filter,
            Some(BoolQuery::new().must(QueryNode::term("size", "L")).into())
        );
    }

    #[test]
    fn children_inherit_parent_own_filters() {
        let mut definition = BucketDefinition::term("color");
        definition.filters = filters(&[("size", "S")]);
        definition
            .child_buckets
            .insert("source".into(), BucketDefinition::term("stock.source"));

        let bucket = build_bucket(
            &mapping(),
            "color",
            &definition,
            &filters(&[("price", "10")]),
            &TermFilters,
        )
        .unwrap();

        let child = &bucket.child_buckets[0];
        assert_eq!(child.nested_path.as_deref(), Some("stock"));
        assert_eq!(
            child.filter,
            Some(
                QueryNode::from(BoolQuery::new().must(QueryNode::term("size", "S"))).named("stock")
            )
        );
    }

    #[test]
    fn nested_path_comes_from_mapping() {
        let mut definition = BucketDefinition::term("stock.source");
        definition.nested_path = Some("elsewhere".into());
        let bucket = build_bucket(&mapping(), "source", &definition, &FilterSet::new(), &TermFilters)
            .unwrap();
        assert_eq!(bucket.nested_path.as_deref(), Some("stock"));

        let mut definition = BucketDefinition::term("color");
        definition.nested_path = Some("stock".into());
        let bucket = build_bucket(&mapping(), "color", &definition, &FilterSet::new(), &TermFilters)
            .unwrap();
        assert_eq!(bucket.nested_path, None);
    }

    fn top_hits(size: u32) -> BucketDefinition {
        BucketDefinition {
            bucket_type: "top_hits".into(),
            size: Some(size),
            ..BucketDefinition::default()
        }
    }

    #[test]
    fn top_hits_under_nested_parent_stays_in_its_scope() {
        let mut definition = BucketDefinition::term("stock.source");
        definition.child_buckets.insert("best".into(), top_hits(3));

        let bucket = build_bucket(&mapping(), "source", &definition, &FilterSet::new(), &TermFilters)
            .unwrap();
        let child = &bucket.child_buckets[0];
        assert_eq!(child.nested_path, None);
        assert_eq!(child.inherited_nested_path.as_deref(), Some("stock"));
        assert!(child.is_nested());

        let rendered = render_bucket(&bucket);
        assert_eq!(rendered["nested"], json!({ "path": "stock" }));
        let terms = &rendered["aggregations"]["source"];
        assert_eq!(terms["terms"]["field"], "stock.source");
        assert_eq!(terms["aggregations"]["best"], json!({ "top_hits": { "size": 3 } }));
    }

    #[test]
    fn fieldless_children_compile_filters_in_parent_scope() {
        let mut definition = BucketDefinition::term("stock.source");
        definition.filters = filters(&[("stock.qty", "1")]);
        definition.child_buckets.insert("best".into(), top_hits(1));

        let bucket = build_bucket(&mapping(), "source", &definition, &FilterSet::new(), &TermFilters)
            .unwrap();
        assert_eq!(
            bucket.child_buckets[0].filter,
            Some(
                QueryNode::from(BoolQuery::new().must(QueryNode::term("stock.qty", "1")))
                    .named("stock")
            )
        );
    }

    #[test]
    fn reverse_nested_returns_children_to_root_scope() {
        let mut back = BucketDefinition {
            bucket_type: "reverse_nested".into(),
            ..BucketDefinition::default()
        };
        back.child_buckets.insert("best".into(), top_hits(3));
        let mut definition = BucketDefinition::term("stock.source");
        definition.child_buckets.insert("products".into(), back);

        let bucket = build_bucket(&mapping(), "source", &definition, &FilterSet::new(), &TermFilters)
            .unwrap();
        let products = &bucket.child_buckets[0];
        assert_eq!(products.inherited_nested_path.as_deref(), Some("stock"));
        let best = &products.child_buckets[0];
        assert!(!best.is_nested());
        assert_eq!(
            render_bucket(best)["top_hits"]["sort"],
            json!([{ "_score": { "order": "desc" } }])
        );
    }

    #[test]
    fn nested_filter_keys_are_prefixed() {
        let mut definition = BucketDefinition::term("stock.source");
        definition.nested_filter = filters(&[("qty", "1")]);

        let bucket = build_bucket(&mapping(), "source", &definition, &FilterSet::new(), &TermFilters)
            .unwrap();
        assert_eq!(
            bucket.nested_filter,
            Some(
                QueryNode::from(BoolQuery::new().must(QueryNode::term("stock.qty", "1")))
                    .named("stock")
            )
        );
    }

    #[test]
    fn nested_filter_is_dropped_without_nested_path() {
        let mut definition = BucketDefinition::term("color");
        definition.nested_filter = filters(&[("qty", "1")]);
        let bucket = build_bucket(&mapping(), "color", &definition, &FilterSet::new(), &TermFilters)
            .unwrap();
        assert_eq!(bucket.nested_filter, None);
    }

    #[test]
    fn unknown_types_name_the_node() {
        let mapping = mapping();
        let mut definitions = IndexMap::new();
        definitions.insert("color".to_string(), BucketDefinition::new("geo_grid", "color"));
        let err = build_aggregations(&mapping, &definitions, &FilterSet::new(), &TermFilters)
            .unwrap_err();
        assert!(matches!(
            err,
            AggregationError::UnsupportedBucketType { ref name, ref bucket_type }
                if name == "color" && bucket_type == "geo_grid"
        ));

        let mut definition = BucketDefinition::term("color");
        definition.metrics.insert(
            "median".into(),
            MetricDefinition {
                metric_type: "median".into(),
                field: Some("price".into()),
                ..MetricDefinition::default()
            },
        );
        let err = build_bucket(&mapping, "color", &definition, &FilterSet::new(), &TermFilters)
            .unwrap_err();
        assert_eq!(err.name(), "median");
        assert!(matches!(err, AggregationError::UnsupportedMetricType { .. }));

        let mut definition = BucketDefinition::term("color");
        definition.pipelines.insert(
            "moving".into(),
            PipelineDefinition {
                pipeline_type: "moving_avg".into(),
                ..PipelineDefinition::default()
            },
        );
        let err = build_bucket(&mapping, "color", &definition, &FilterSet::new(), &TermFilters)
            .unwrap_err();
        assert!(matches!(err, AggregationError::UnsupportedPipelineType { ref name, .. } if name == "moving"));
    }

    #[test]
    fn unknown_sort_order_is_rejected() {
        let mut definition = BucketDefinition::term("color");
        definition.sort_order = Some("random".into());
        let err = build_bucket(&mapping(), "color", &definition, &FilterSet::new(), &TermFilters)
            .unwrap_err();
        assert!(matches!(err, AggregationError::UnsupportedSortOrder { ref sort_order, .. } if sort_order == "random"));
    }

    #[test]
    fn field_buckets_require_a_field() {
        let definition = BucketDefinition {
            bucket_type: "histogram".into(),
            interval: Some(json!(10)),
            ..BucketDefinition::default()
        };
        let err = build_bucket(&mapping(), "price", &definition, &FilterSet::new(), &TermFilters)
            .unwrap_err();
        assert!(matches!(err, AggregationError::MissingField { .. }));
    }

    #[test]
    fn query_group_builds_named_queries() {
        let mut definition = BucketDefinition {
            bucket_type: "query_group".into(),
            ..BucketDefinition::default()
        };
        definition
            .queries
            .insert("sales".into(), json!({ "type": "exists", "field": "sale" }));

        let bucket = build_bucket(&mapping(), "promotions", &definition, &FilterSet::new(), &TermFilters)
            .unwrap();
        let BucketKind::QueryGroup(group) = &bucket.kind else {
            panic!("expected query group");
        };
        assert_eq!(group.queries.len(), 1);
        assert_eq!(group.queries["sales"], QueryNode::exists("sale"));
    }

    #[test]
    fn query_group_errors_carry_bucket_name() {
        let mut definition = BucketDefinition {
            bucket_type: "query_group".into(),
            ..BucketDefinition::default()
        };
        definition
            .queries
            .insert("sales".into(), json!({ "type": "fuzzy_like_this" }));
        let err = build_bucket(&mapping(), "promotions", &definition, &FilterSet::new(), &TermFilters)
            .unwrap_err();
        assert_eq!(err.name(), "promotions");
        assert!(matches!(err, AggregationError::Query { .. }));
    }

    #[test]
    fn top_hits_resolves_sort_fields() {
        let definition = BucketDefinition {
            bucket_type: "top_hits".into(),
            sort_orders: vec![
                SortDefinition {
                    field: "stock.qty".into(),
                    direction: SortDirection::Desc,
                },
                SortDefinition {
                    field: "_score".into(),
                    direction: SortDirection::Desc,
                },
            ],
            ..BucketDefinition::default()
        };
        let bucket = build_bucket(&mapping(), "best", &definition, &FilterSet::new(), &TermFilters)
            .unwrap();
        let BucketKind::TopHits(top_hits) = &bucket.kind else {
            panic!("expected top hits");
        };
        assert_eq!(top_hits.size, 3);
        assert!(matches!(
            &top_hits.sort_orders[0],
            SortOrder::Nested { field, nested_path, .. } if field == "stock.qty" && nested_path == "stock"
        ));
        assert_eq!(
            top_hits.sort_orders[1],
            SortOrder::score(SortDirection::Desc)
        );
    }
}
