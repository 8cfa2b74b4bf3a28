//! Filter query builder.
//!
//! Turns [`FilterSet`]s into query trees through the index mapping. The
//! same builder serves the main query, the post filter, bucket filters and
//! nested sort filters; only the nested context differs between them.

use serde_json::Value;
use tracing::debug;
use vitrine_aggregation::{FilterBuilder, FilterCondition, FilterSet};
use vitrine_mapping::{DATE_FORMAT, Field, FieldType, LogicalOperator, Mapping};
use vitrine_query::{BoolQuery, MinimumShouldMatch, QueryNode, RangeBounds};

/// Share of terms a text filter must match.
const TEXT_FILTER_MINIMUM_SHOULD_MATCH: &str = "100%";

/// Builds filter queries against a mapping.
#[derive(Debug, Clone, Copy)]
pub struct FilterQueryBuilder<'a> {
    /// Mapping used to resolve field names.
    mapping: &'a Mapping,
}

impl<'a> FilterQueryBuilder<'a> {
    /// Creates a builder over a mapping.
    pub fn new(mapping: &'a Mapping) -> Self {
        Self { mapping }
    }

    /// Builds the query of a single condition.
    ///
    /// The query is wrapped in a nested query when the field is nested and
    /// `current_path` is not its nested path.
    pub fn build_condition(
        &self,
        name: &str,
        condition: &FilterCondition,
        current_path: Option<&str>,
    ) -> QueryNode {
        let field = self.mapping.field(name).ok();
        let query = match condition {
            FilterCondition::QueryText { query_text } => text_query(name, field, query_text),
            FilterCondition::Range(bounds) => self.range_query(name, field, bounds),
            FilterCondition::Values(values) => self.values_query(name, field, values),
        };

        match field.and_then(Field::nested_path) {
            Some(path) if current_path != Some(path) => QueryNode::nested(path, query),
            _ => query,
        }
    }

    /// Builds a value condition on the untouched property.
    fn values_query(&self, name: &str, field: Option<&Field>, values: &[Value]) -> QueryNode {
        let property = self.mapping.resolve_for_aggregation(name).field;
        let operator = field.map_or(LogicalOperator::default(), Field::filter_logical_operator);

        match (values, operator) {
            ([value], _) => QueryNode::term(property, value.clone()),
            (values, LogicalOperator::And) => values
                .iter()
                .fold(BoolQuery::new(), |query, value| {
                    query.must(QueryNode::term(property.clone(), value.clone()))
                })
                .into(),
            (values, LogicalOperator::Or) => QueryNode::terms(property, values.to_vec()),
        }
    }

    /// Builds a range condition on the untouched property.
    fn range_query(&self, name: &str, field: Option<&Field>, bounds: &RangeBounds) -> QueryNode {
        let property = self.mapping.resolve_for_aggregation(name).field;
        let mut query = QueryNode::range(property, bounds.clone());
        if let QueryNode::Range(ref mut range) = query
            && field.is_some_and(|f| f.field_type() == FieldType::Date)
        {
            range.format = Some(DATE_FORMAT.to_string());
        }
        query
    }
}

/// Builds a text condition on the field's default analyzed property.
fn text_query(name: &str, field: Option<&Field>, text: &str) -> QueryNode {
    let property = field
        .and_then(|f| f.mapping_property(Some(f.default_search_analyzer())))
        .unwrap_or_else(|| {
            debug!(field = name, "text filter on raw field name");
            name.to_string()
        });

    let mut query = QueryNode::match_text(property, text);
    if let QueryNode::Match(ref mut matched) = query {
        matched.minimum_should_match = Some(MinimumShouldMatch::from(
            TEXT_FILTER_MINIMUM_SHOULD_MATCH,
        ));
    }
    query
}

impl FilterBuilder for FilterQueryBuilder<'_> {
    fn build_filter(&self, filters: &FilterSet, current_path: Option<&str>) -> Option<QueryNode> {
        let mut queries: Vec<QueryNode> = filters
            .iter()
            .map(|(name, condition)| self.build_condition(name, condition, current_path))
            .collect();

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
}
