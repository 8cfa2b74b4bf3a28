//! Query compiler.
//!
//! Turns a [`QueryNode`] tree into the engine's JSON query DSL. Compilation
//! is total: every variant of the closed union has exactly one rendering, so
//! there is no error path here. Unsupported types are rejected earlier, when
//! definitions are turned into trees.
//!
//! Optional attributes (`boost`, `_name`, `minimum_should_match`, ...) are
//! only emitted when set.

use serde_json::{Map, Value, json};

use crate::ast::{
    BoolQuery, Fuzziness, MinimumShouldMatch, MultiMatchQuery, QueryNode, SpanClause,
    WeightedField,
};

/// Compiles a query tree into its wire JSON.
pub fn compile(query: &QueryNode) -> Value {
    let name = query.name();
    let boost = query.boost();

    match query {
        QueryNode::Term(q) => {
            let mut body = Map::new();
            body.insert("value".into(), q.value.clone());
            decorate(&mut body, name, boost);
            json!({ "term": { q.field.clone(): body } })
        }
        QueryNode::Terms(q) => {
            let mut body = Map::new();
            body.insert(q.field.clone(), Value::Array(q.values.clone()));
            decorate(&mut body, name, boost);
            json!({ "terms": body })
        }
        QueryNode::Match(q) => {
            let mut body = Map::new();
            body.insert("query".into(), Value::String(q.query_text.clone()));
            insert_msm(&mut body, q.minimum_should_match.as_ref());
            insert_fuzziness(&mut body, q.fuzziness.as_ref());
            decorate(&mut body, name, boost);
            json!({ "match": { q.field.clone(): body } })
        }
        QueryNode::MultiMatch(q) => json!({ "multi_match": multi_match_body(q) }),
        QueryNode::Common(q) => {
            let mut body = Map::new();
            body.insert("query".into(), Value::String(q.query_text.clone()));
            body.insert("cutoff_frequency".into(), json!(q.cutoff_frequency));
            insert_msm(&mut body, q.minimum_should_match.as_ref());
            decorate(&mut body, name, boost);
            json!({ "common": { q.field.clone(): body } })
        }
        QueryNode::Bool(q) => json!({ "bool": bool_body(q) }),
        QueryNode::Filtered(q) => {
            let mut body = Map::new();
            if let Some(filter) = &q.filter {
                body.insert("filter".into(), json!([compile(filter)]));
            }
            if let Some(inner) = &q.query {
                body.insert("must".into(), json!([compile(inner)]));
            }
            decorate(&mut body, name, boost);
            json!({ "bool": body })
        }
        QueryNode::Nested(q) => {
            let mut body = Map::new();
            body.insert("path".into(), Value::String(q.path.clone()));
            body.insert("score_mode".into(), Value::String(q.score_mode.as_str().into()));
            body.insert("query".into(), compile(&q.query));
            decorate(&mut body, name, boost);
            json!({ "nested": body })
        }
        QueryNode::Not(q) => {
            let mut body = Map::new();
            body.insert("must_not".into(), json!([compile(&q.query)]));
            decorate(&mut body, name, boost);
            json!({ "bool": body })
        }
        QueryNode::Exists(q) => {
            let mut body = Map::new();
            body.insert("field".into(), Value::String(q.field.clone()));
            decorate(&mut body, name, boost);
            json!({ "exists": body })
        }
        QueryNode::Missing(q) => {
            let mut body = Map::new();
            body.insert(
                "must_not".into(),
                json!([{ "exists": { "field": q.field.clone() } }]),
            );
            decorate(&mut body, name, boost);
            json!({ "bool": body })
        }
        QueryNode::Span(q) => {
            let mut rendered = span_clause(&q.clause);
            if let Some(body) = rendered
                .as_object_mut()
                .and_then(|root| root.values_mut().next())
                .and_then(Value::as_object_mut)
            {
                decorate(body, name, boost);
            }
            rendered
        }
        QueryNode::Range(q) => {
            let mut body = Map::new();
            for (key, bound) in [
                ("gt", &q.bounds.gt),
                ("gte", &q.bounds.gte),
                ("lt", &q.bounds.lt),
                ("lte", &q.bounds.lte),
            ] {
                if let Some(bound) = bound {
                    body.insert(key.into(), bound.clone());
                }
            }
            if let Some(format) = &q.format {
                body.insert("format".into(), Value::String(format.clone()));
            }
            decorate(&mut body, name, boost);
            json!({ "range": { q.field.clone(): body } })
        }
        QueryNode::Ids(q) => {
            let mut body = Map::new();
            body.insert("values".into(), Value::Array(q.values.clone()));
            decorate(&mut body, name, boost);
            json!({ "ids": body })
        }
        QueryNode::Prefix(q) => {
            let mut body = Map::new();
            body.insert("value".into(), Value::String(q.value.clone()));
            decorate(&mut body, name, boost);
            json!({ "prefix": { q.field.clone(): body } })
        }
        QueryNode::Regexp(q) => {
            let mut body = Map::new();
            body.insert("value".into(), Value::String(q.value.clone()));
            decorate(&mut body, name, boost);
            json!({ "regexp": { q.field.clone(): body } })
        }
        QueryNode::MatchPhrasePrefix(q) => {
            let mut body = Map::new();
            body.insert("query".into(), Value::String(q.query_text.clone()));
            if let Some(max) = q.max_expansions {
                body.insert("max_expansions".into(), json!(max));
            }
            decorate(&mut body, name, boost);
            json!({ "match_phrase_prefix": { q.field.clone(): body } })
        }
        QueryNode::MatchAll(_) => {
            let mut body = Map::new();
            decorate(&mut body, name, boost);
            json!({ "match_all": body })
        }
    }
}

/// Renders the body of a boolean query.
fn bool_body(query: &BoolQuery) -> Map<String, Value> {
    let mut body = Map::new();
    for (key, clauses) in [
        ("must", &query.must),
        ("should", &query.should),
        ("must_not", &query.must_not),
        ("filter", &query.filter),
    ] {
        if !clauses.is_empty() {
            body.insert(key.into(), clauses.iter().map(compile).collect());
        }
    }
    if !query.should.is_empty() {
        insert_msm(&mut body, query.minimum_should_match.as_ref());
    }
    decorate(&mut body, query.name.as_deref(), query.boost);
    body
}

/// Renders the body of a multi-match query.
fn multi_match_body(query: &MultiMatchQuery) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("query".into(), Value::String(query.query_text.clone()));
    body.insert(
        "fields".into(),
        query.fields.iter().map(|f| Value::String(weighted(f))).collect(),
    );
    if let Some(match_type) = query.match_type {
        body.insert("type".into(), Value::String(match_type.as_str().into()));
    }
    insert_msm(&mut body, query.minimum_should_match.as_ref());
    if let Some(tie_breaker) = query.tie_breaker {
        body.insert("tie_breaker".into(), json!(tie_breaker));
    }
    if let Some(cutoff) = query.cutoff_frequency {
        body.insert("cutoff_frequency".into(), json!(cutoff));
    }
    insert_fuzziness(&mut body, query.fuzziness.as_ref());
    decorate(&mut body, query.name.as_deref(), query.boost);
    body
}

/// Renders a weighted field as `field^weight`, or bare for weight 1.
fn weighted(field: &WeightedField) -> String {
    if (field.weight - 1.0).abs() < f32::EPSILON {
        field.field.clone()
    } else {
        format!("{}^{}", field.field, field.weight)
    }
}

/// Renders a span clause, recursively.
fn span_clause(clause: &SpanClause) -> Value {
    match clause {
        SpanClause::Term { field, value } => {
            json!({ "span_term": { field.clone(): { "value": value.clone() } } })
        }
        SpanClause::Near {
            clauses,
            slop,
            in_order,
        } => json!({
            "span_near": {
                "clauses": clauses.iter().map(span_clause).collect::<Vec<_>>(),
                "slop": slop,
                "in_order": in_order,
            }
        }),
        SpanClause::First { inner, end } => {
            json!({ "span_first": { "match": span_clause(inner), "end": end } })
        }
        SpanClause::Or { clauses } => json!({
            "span_or": { "clauses": clauses.iter().map(span_clause).collect::<Vec<_>>() }
        }),
        SpanClause::Not { include, exclude } => json!({
            "span_not": { "include": span_clause(include), "exclude": span_clause(exclude) }
        }),
        SpanClause::Containing { big, little } => json!({
            "span_containing": { "big": span_clause(big), "little": span_clause(little) }
        }),
        SpanClause::Within { big, little } => json!({
            "span_within": { "big": span_clause(big), "little": span_clause(little) }
        }),
    }
}

/// Adds `minimum_should_match` when set.
fn insert_msm(body: &mut Map<String, Value>, msm: Option<&MinimumShouldMatch>) {
    let Some(msm) = msm else { return };
    let value = match msm {
        MinimumShouldMatch::Count(count) => json!(count),
        MinimumShouldMatch::Expression(expr) => Value::String(expr.clone()),
    };
    body.insert("minimum_should_match".into(), value);
}

/// Adds fuzzy matching options when set.
fn insert_fuzziness(body: &mut Map<String, Value>, fuzziness: Option<&Fuzziness>) {
    let Some(fuzziness) = fuzziness else { return };
    body.insert("fuzziness".into(), Value::String(fuzziness.value.clone()));
    body.insert("prefix_length".into(), json!(fuzziness.prefix_length));
    body.insert("max_expansions".into(), json!(fuzziness.max_expansions));
}

/// Adds `boost` and `_name` when set.
fn decorate(body: &mut Map<String, Value>, name: Option<&str>, boost: Option<f32>) {
    if let Some(boost) = boost {
        body.insert("boost".into(), json!(boost));
    }
    if let Some(name) = name {
        body.insert("_name".into(), Value::String(name.to_string()));
    }
}
