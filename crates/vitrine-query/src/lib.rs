//! Query tree model and wire compiler.
//!
//! Queries are built bottom-up as [`QueryNode`] trees, either directly or
//! from tagged JSON definitions through [`QueryFactory`], then compiled to
//! the engine's JSON DSL with [`compile`].
//!
//! ```
//! use serde_json::json;
//! use vitrine_query::{BoolQuery, QueryNode, compile};
//!
//! let query: QueryNode = BoolQuery::new()
//!     .must(QueryNode::term("color", "red"))
//!     .must(QueryNode::exists("sale"))
//!     .into();
//! assert_eq!(
//!     compile(&query),
//!     json!({ "bool": { "must": [
//!         { "term": { "color": { "value": "red" } } },
//!         { "exists": { "field": "sale" } }
//!     ] } })
//! );
//! ```

#![warn(missing_docs)]

mod ast;
mod compile;
mod error;
mod factory;
mod hash;
mod sort;

pub use ast::{
    BoolQuery, CommonQuery, ExistsQuery, FilteredQuery, Fuzziness, IdsQuery, MatchAllQuery,
    MatchPhrasePrefixQuery, MatchQuery, MinimumShouldMatch, MissingQuery, MultiMatchQuery,
    MultiMatchType, NestedQuery, NotQuery, PrefixQuery, QueryNode, QueryType, RangeBounds,
    RangeQuery, RegexpQuery, ScoreMode, SpanClause, SpanQuery, TermQuery, TermsQuery,
    WeightedField,
};
pub use compile::compile;
pub use error::QueryError;
pub use factory::QueryFactory;
pub use hash::{request_hash, value_hash};
pub use sort::{SCORE_FIELD, SortMode, SortOrder, render_sort_order, render_sort_orders};
