//! Builds query trees from tagged JSON definitions.
//!
//! A definition is an object whose `type` key names the variant; the other
//! keys are the variant's parameters. Compound variants (`bool`, `filtered`,
//! `nested`, `not`) hold sub-definitions of the same shape, which are built
//! recursively.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    ast::{
        BoolQuery, FilteredQuery, MinimumShouldMatch, NestedQuery, NotQuery, QueryNode, QueryType,
        ScoreMode, SpanClause,
    },
    error::QueryError,
};

/// Definition key holding the variant tag.
const TYPE_KEY: &str = "type";

/// Entry point for building [`QueryNode`]s from definitions.
pub struct QueryFactory;

impl QueryFactory {
    /// Builds a query of type `tag` from its parameters.
    pub fn create(tag: &str, params: Value) -> Result<QueryNode, QueryError> {
        let query_type: QueryType = tag
            .parse()
            .map_err(|_| QueryError::UnsupportedQueryType(tag.to_string()))?;
        let mut params = match params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(QueryError::invalid(
                    tag,
                    format!("parameters must be an object, got {other}"),
                ));
            }
        };
        params.remove(TYPE_KEY);

        Ok(match query_type {
            QueryType::Term => QueryNode::Term(decode(tag, params)?),
            QueryType::Terms => QueryNode::Terms(decode(tag, params)?),
            QueryType::Match => QueryNode::Match(decode(tag, params)?),
            QueryType::MultiMatch => QueryNode::MultiMatch(decode(tag, params)?),
            QueryType::Common => QueryNode::Common(decode(tag, params)?),
            QueryType::Exists => QueryNode::Exists(decode(tag, params)?),
            QueryType::Missing => QueryNode::Missing(decode(tag, params)?),
            QueryType::Range => QueryNode::Range(decode(tag, params)?),
            QueryType::Ids => QueryNode::Ids(decode(tag, params)?),
            QueryType::Prefix => QueryNode::Prefix(decode(tag, params)?),
            QueryType::Regexp => QueryNode::Regexp(decode(tag, params)?),
            QueryType::MatchPhrasePrefix => QueryNode::MatchPhrasePrefix(decode(tag, params)?),
            QueryType::MatchAll => QueryNode::MatchAll(decode(tag, params)?),
            QueryType::Span => {
                check_span_types(&Value::Object(params.clone()))?;
                QueryNode::Span(decode(tag, params)?)
            }
            QueryType::Bool => QueryNode::Bool(Self::bool_query(tag, params)?),
            QueryType::Filtered => QueryNode::Filtered(FilteredQuery {
                query: optional_child(&mut params, "query")?.map(Box::new),
                filter: optional_child(&mut params, "filter")?.map(Box::new),
                name: take(tag, &mut params, "name")?,
                boost: take(tag, &mut params, "boost")?,
            }),
            QueryType::Nested => {
                let path: Option<String> = take(tag, &mut params, "path")?;
                let path = path.ok_or_else(|| QueryError::invalid(tag, "missing path"))?;
                let query = optional_child(&mut params, "query")?
                    .ok_or_else(|| QueryError::invalid(tag, "missing query"))?;
                let score_mode: Option<ScoreMode> = take(tag, &mut params, "score_mode")?;
                QueryNode::Nested(NestedQuery {
                    path,
                    query: Box::new(query),
                    score_mode: score_mode.unwrap_or_default(),
                    name: take(tag, &mut params, "name")?,
                    boost: take(tag, &mut params, "boost")?,
                })
            }
            QueryType::Not => {
                let query = optional_child(&mut params, "query")?
                    .ok_or_else(|| QueryError::invalid(tag, "missing query"))?;
                QueryNode::Not(NotQuery {
                    query: Box::new(query),
                    name: take(tag, &mut params, "name")?,
                    boost: take(tag, &mut params, "boost")?,
                })
            }
        })
    }

    /// Builds a query from a single definition carrying its own `type` key.
    pub fn from_definition(definition: Value) -> Result<QueryNode, QueryError> {
        let tag = definition
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| QueryError::invalid("unknown", "definition has no type"))?;
        Self::create(&tag, definition)
    }

    /// Builds a boolean query from its clause lists.
    fn bool_query(tag: &str, mut params: Map<String, Value>) -> Result<BoolQuery, QueryError> {
        let mut clauses = |key: &str| -> Result<Vec<QueryNode>, QueryError> {
            match params.remove(key) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Array(items)) => {
                    items.into_iter().map(Self::from_definition).collect()
                }
                Some(single @ Value::Object(_)) => Ok(vec![Self::from_definition(single)?]),
                Some(other) => Err(QueryError::invalid(
                    tag,
                    format!("{key} must be a list of queries, got {other}"),
                )),
            }
        };
        let must = clauses("must")?;
        let should = clauses("should")?;
        let must_not = clauses("must_not")?;
        let filter = clauses("filter")?;
        let minimum_should_match: Option<MinimumShouldMatch> =
            take(tag, &mut params, "minimum_should_match")?;

        Ok(BoolQuery {
            must,
            should,
            must_not,
            filter,
            minimum_should_match,
            name: take(tag, &mut params, "name")?,
            boost: take(tag, &mut params, "boost")?,
        })
    }
}

/// Decodes leaf parameters into a variant struct.
fn decode<T: DeserializeOwned>(tag: &str, params: Map<String, Value>) -> Result<T, QueryError> {
    serde_json::from_value(Value::Object(params)).map_err(|e| QueryError::definition(tag, e))
}

/// Removes and decodes an optional parameter.
fn take<T: DeserializeOwned>(
    tag: &str,
    params: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<T>, QueryError> {
    match params.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| QueryError::definition(tag, e)),
    }
}

/// Removes and builds an optional sub-query definition.
fn optional_child(
    params: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<QueryNode>, QueryError> {
    match params.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(definition) => QueryFactory::from_definition(definition).map(Some),
    }
}

/// Rejects span clauses with an unknown `span_type`, at any depth.
fn check_span_types(value: &Value) -> Result<(), QueryError> {
    match value {
        Value::Object(map) => {
            if let Some(span_type) = map.get("span_type") {
                let span_type = span_type.as_str().unwrap_or_default();
                if !SpanClause::TYPES.contains(&span_type) {
                    return Err(QueryError::UnsupportedSpanType(span_type.to_string()));
                }
            }
            map.values().try_for_each(check_span_types)
        }
        Value::Array(items) => items.iter().try_for_each(check_span_types),
        _ => Ok(()),
    }
}

impl<'de> Deserialize<'de> for QueryNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let definition = Value::deserialize(deserializer)?;
        QueryFactory::from_definition(definition).map_err(serde::de::Error::custom)
    }
}
