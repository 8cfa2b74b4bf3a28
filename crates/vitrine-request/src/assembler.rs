//! Request assembler.
//!
//! Combines a container's configuration with the parameters of one search
//! call into a [`Request`]:
//!
//! - filters keyed by a facet field become the post filter and the
//!   aggregations' inherited filters, so each facet keeps counting the
//!   values the user did not select yet
//! - other filters, container filters and query filters restrict the main
//!   query
//! - aggregation trees are built through the injected cache

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;
use vitrine_aggregation::{
    AggregationCache, BucketDefinition, CacheKey, CacheTag, FilterBuilder, FilterSet,
    SharedBuckets, build_aggregations,
};
use vitrine_config::{Config, ContainerConfig};
use vitrine_mapping::Mapping;
use vitrine_query::{BoolQuery, QueryNode};

use crate::{
    RequestError,
    filter::FilterQueryBuilder,
    fulltext::FulltextQueryBuilder,
    params::{Collapse, SearchParams},
    request::Request,
    sort::SortOrderBuilder,
};

/// Builds requests for the containers of one configuration.
pub struct RequestAssembler<'a> {
    /// Loaded configuration.
    config: &'a Config,
    /// Cache of built aggregation trees.
    cache: &'a dyn AggregationCache,
}

impl<'a> RequestAssembler<'a> {
    /// Creates an assembler.
    pub fn new(config: &'a Config, cache: &'a dyn AggregationCache) -> Self {
        Self { config, cache }
    }

    /// Builds the request of one search call on a container.
    pub fn assemble(&self, container: &str, params: &SearchParams) -> Result<Request, RequestError> {
        let container = self.config.container(container)?;
        let (from, size) = pagination(params)?;
        let mapping: &Mapping = &self.config.mapping;
        let filters = FilterQueryBuilder::new(mapping);

        let facets = merge_facets(&container.aggregations, &params.facets);
        let (facet_filters, query_filters) = split_filters(&params.filters, &facets);

        let text = params.query_text.as_deref().unwrap_or_default();
        let fulltext =
            FulltextQueryBuilder::new(mapping, &container.relevance).build(text, params.spelling_type);
        let query = match main_filter(&filters, container, &query_filters, &params.query_filters) {
            Some(filter) => QueryNode::filtered(Some(fulltext), Some(filter)),
            None => fulltext,
        };

        let buckets = self.buckets(container, params, &facets, &facet_filters, &filters)?;

        let sort_orders = if size == 0 {
            Vec::new()
        } else {
            SortOrderBuilder::new(mapping).build(&params.sort_orders)
        };

        let collapse = params.collapse.as_ref().map(|collapse| Collapse {
            field: mapping.resolve_for_aggregation(&collapse.field).field,
            inner_hits: collapse.inner_hits.clone(),
        });

        debug!(
            container = %container.name,
            from,
            size,
            facets = facets.len(),
            post_filters = facet_filters.len(),
            "assembled request"
        );

        Ok(Request {
            name: container.name.clone(),
            index_name: self.config.index.name.clone(),
            query,
            filter: filters.build_filter(&facet_filters, None),
            sort_orders,
            from,
            size,
            dimensions: params.dimensions.clone(),
            buckets,
            spelling_type: params.spelling_type,
            track_total_hits: params.track_total_hits.unwrap_or(container.track_total_hits),
            min_score: params.min_score.or(container.min_score),
            collapse,
            source: params.source.clone(),
        })
    }

    /// Builds or fetches the aggregation trees.
    fn buckets(
        &self,
        container: &ContainerConfig,
        params: &SearchParams,
        facets: &IndexMap<String, BucketDefinition>,
        facet_filters: &FilterSet,
        filters: &dyn FilterBuilder,
    ) -> Result<SharedBuckets, RequestError> {
        if facets.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }

        let key = CacheKey::compute(
            &container.name,
            params
                .dimensions
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
            facets,
            facet_filters,
        )?;
        let tags = [CacheTag::container(&container.name)];
        let buckets = self.cache.get_or_build(key, &tags, &mut || {
            build_aggregations(&self.config.mapping, facets, facet_filters, filters)
        })?;
        Ok(buckets)
    }
}

/// Validates and converts the requested offset and page size.
fn pagination(params: &SearchParams) -> Result<(u64, u64), RequestError> {
    let invalid = || RequestError::InvalidPagination {
        from: params.from,
        size: params.size,
    };
    let from = u64::try_from(params.from).map_err(|_| invalid())?;
    let size = u64::try_from(params.size).map_err(|_| invalid())?;
    Ok((from, size))
}

/// Merges ad-hoc facets over the container's aggregations, by name.
fn merge_facets(
    container: &IndexMap<String, BucketDefinition>,
    ad_hoc: &IndexMap<String, BucketDefinition>,
) -> IndexMap<String, BucketDefinition> {
    let mut facets = container.clone();
    for (name, definition) in ad_hoc {
        facets.insert(name.clone(), definition.clone());
    }
    facets
}

/// Splits call filters into facet filters and query filters.
///
/// A filter is a facet filter when its field is the field of a facet.
fn split_filters(
    filters: &FilterSet,
    facets: &IndexMap<String, BucketDefinition>,
) -> (FilterSet, FilterSet) {
    let is_facet = |field: &str| {
        facets
            .values()
            .any(|definition| definition.field.as_deref() == Some(field))
    };

    filters
        .iter()
        .map(|(field, condition)| (field.clone(), condition.clone()))
        .partition(|(field, _)| is_facet(field.as_str()))
}

/// Builds the filter of the main query.
///
/// Call filters override container filters on the same field; prebuilt query
/// filters are appended.
fn main_filter(
    builder: &FilterQueryBuilder<'_>,
    container: &ContainerConfig,
    call_filters: &FilterSet,
    query_filters: &[QueryNode],
) -> Option<QueryNode> {
    let mut filters = container.filters.clone();
    for (field, condition) in call_filters {
        filters.insert(field.clone(), condition.clone());
    }

    let mut queries: Vec<QueryNode> = builder.build_filter(&filters, None).into_iter().collect();
    queries.extend(query_filters.iter().cloned());

    match queries.len() {
        0 => None,
        1 => queries.pop(),
        _ => Some(
            queries
                .into_iter()
                .fold(BoolQuery::new(), BoolQuery::must)
                .into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use vitrine_aggregation::FilterCondition;

    use super::*;

    fn facets(names: &[(&str, Option<&str>)]) -> IndexMap<String, BucketDefinition> {
        names
            .iter()
            .map(|(name, field)| {
                let definition = BucketDefinition {
                    bucket_type: "term".into(),
                    field: field.map(str::to_string),
                    ..BucketDefinition::default()
                };
                ((*name).to_string(), definition)
            })
            .collect()
    }

    #[test]
    fn facet_filters_are_split_by_field() {
        let facets = facets(&[("colors", Some("color")), ("promotions", None)]);
        let mut filters = FilterSet::new();
        filters.insert("color".into(), FilterCondition::value("red"));
        filters.insert("status".into(), FilterCondition::value(1));
        filters.insert("promotions".into(), FilterCondition::value("sale"));

        let (facet, query) = split_filters(&filters, &facets);
        assert_eq!(facet.keys().collect::<Vec<_>>(), ["color"]);
        assert_eq!(query.keys().collect::<Vec<_>>(), ["status", "promotions"]);
    }

    #[test]
    fn ad_hoc_facets_win_by_name() {
        let container = facets(&[("color", Some("color")), ("size", Some("size"))]);
        let mut ad_hoc = IndexMap::new();
        ad_hoc.insert("color".to_string(), BucketDefinition::new("term", "color_code"));
        ad_hoc.insert("brand".to_string(), BucketDefinition::term("manufacturer"));

        let merged = merge_facets(&container, &ad_hoc);
        assert_eq!(merged.keys().collect::<Vec<_>>(), ["color", "size", "brand"]);
        assert_eq!(merged["color"].field.as_deref(), Some("color_code"));
    }

    #[test]
    fn negative_pagination_is_rejected() {
        let params = SearchParams::new().with_page(-1, 10);
        assert!(matches!(
            pagination(&params),
            Err(RequestError::InvalidPagination { from: -1, size: 10 })
        ));
        let params = SearchParams::new().with_page(0, -5);
        assert!(pagination(&params).is_err());
        assert_eq!(pagination(&SearchParams::new().with_page(40, 0)).unwrap(), (40, 0));
    }
}
