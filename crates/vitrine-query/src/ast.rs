//! Query tree.
//!
//! A [`QueryNode`] is a closed tagged union: each variant carries only the
//! data relevant to it, plus the optional `name` (reported back by the
//! engine as a matched query) and `boost` every query accepts. Trees are
//! built bottom-up and never mutated once handed to a request.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `minimum_should_match` value, carried to the wire unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum MinimumShouldMatch {
    /// Absolute number of clauses.
    Count(i64),
    /// Expression such as `75%` or `3<90%`.
    Expression(String),
}

impl From<i64> for MinimumShouldMatch {
    fn from(count: i64) -> Self {
        Self::Count(count)
    }
}

impl From<&str> for MinimumShouldMatch {
    fn from(expr: &str) -> Self {
        Self::Expression(expr.to_string())
    }
}

/// Fuzzy matching options of match-like queries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Fuzziness {
    /// Edit distance, or `AUTO`.
    pub value: String,
    /// Number of leading characters that must match exactly.
    pub prefix_length: u32,
    /// Maximum number of term expansions.
    pub max_expansions: u32,
}

impl Default for Fuzziness {
    fn default() -> Self {
        Self {
            value: "AUTO".to_string(),
            prefix_length: 1,
            max_expansions: 10,
        }
    }
}

/// Exact value match on one field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TermQuery {
    /// Physical field.
    pub field: String,
    /// Value to match.
    pub value: Value,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Match of any of several exact values on one field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TermsQuery {
    /// Physical field.
    pub field: String,
    /// Accepted values.
    pub values: Vec<Value>,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Analyzed fulltext match on one field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchQuery {
    /// Physical field.
    pub field: String,
    /// Text to match.
    pub query_text: String,
    /// Minimum number of matching terms.
    #[serde(default)]
    pub minimum_should_match: Option<MinimumShouldMatch>,
    /// Fuzzy matching options.
    #[serde(default)]
    pub fuzziness: Option<Fuzziness>,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// A field with its fulltext weight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightedField {
    /// Physical field.
    pub field: String,
    /// Weight, rendered as `field^weight` when not 1.
    #[serde(default = "default_weight")]
    pub weight: f32,
}

/// Default weight of a [`WeightedField`].
fn default_weight() -> f32 {
    1.0
}

impl WeightedField {
    /// Creates a weighted field.
    pub fn new(field: impl Into<String>, weight: f32) -> Self {
        Self {
            field: field.into(),
            weight,
        }
    }
}

/// How a multi-match query combines per-field scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchType {
    /// Best single field wins.
    #[default]
    BestFields,
    /// Scores of all fields add up.
    MostFields,
    /// Fields are treated as one big field.
    CrossFields,
    /// Phrase match on each field.
    Phrase,
    /// Phrase-prefix match on each field.
    PhrasePrefix,
}

impl MultiMatchType {
    /// Returns the wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BestFields => "best_fields",
            Self::MostFields => "most_fields",
            Self::CrossFields => "cross_fields",
            Self::Phrase => "phrase",
            Self::PhrasePrefix => "phrase_prefix",
        }
    }
}

/// Analyzed fulltext match across several weighted fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiMatchQuery {
    /// Text to match.
    pub query_text: String,
    /// Weighted fields, in rendering order.
    pub fields: Vec<WeightedField>,
    /// Minimum number of matching terms.
    #[serde(default)]
    pub minimum_should_match: Option<MinimumShouldMatch>,
    /// Weight of non-best fields in `best_fields` mode.
    #[serde(default)]
    pub tie_breaker: Option<f32>,
    /// Score combination mode.
    #[serde(default)]
    pub match_type: Option<MultiMatchType>,
    /// Common-terms cutoff frequency.
    #[serde(default)]
    pub cutoff_frequency: Option<f32>,
    /// Fuzzy matching options.
    #[serde(default)]
    pub fuzziness: Option<Fuzziness>,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Common-terms query: frequent terms only contribute to scoring.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommonQuery {
    /// Physical field.
    pub field: String,
    /// Text to match.
    pub query_text: String,
    /// Document frequency above which a term is considered common.
    pub cutoff_frequency: f32,
    /// Minimum number of matching low-frequency terms.
    #[serde(default)]
    pub minimum_should_match: Option<MinimumShouldMatch>,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Boolean combination of clauses.
///
/// Clause order is preserved exactly; clauses are never flattened into
/// their parent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    /// Clauses that must match and score.
    pub must: Vec<QueryNode>,
    /// Clauses of which `minimum_should_match` must match.
    pub should: Vec<QueryNode>,
    /// Clauses that must not match.
    pub must_not: Vec<QueryNode>,
    /// Clauses that must match without scoring.
    pub filter: Vec<QueryNode>,
    /// Minimum number of `should` clauses to match.
    pub minimum_should_match: Option<MinimumShouldMatch>,
    /// Query name.
    pub name: Option<String>,
    /// Score multiplier.
    pub boost: Option<f32>,
}

impl BoolQuery {
    /// Creates an empty boolean query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `must` clause.
    pub fn must(mut self, query: QueryNode) -> Self {
        self.must.push(query);
        self
    }

    /// Appends a `should` clause.
    pub fn should(mut self, query: QueryNode) -> Self {
        self.should.push(query);
        self
    }

    /// Appends a `must_not` clause.
    pub fn must_not(mut self, query: QueryNode) -> Self {
        self.must_not.push(query);
        self
    }

    /// Appends a `filter` clause.
    pub fn filter(mut self, query: QueryNode) -> Self {
        self.filter.push(query);
        self
    }

    /// Sets `minimum_should_match`.
    pub fn minimum_should_match(mut self, value: impl Into<MinimumShouldMatch>) -> Self {
        self.minimum_should_match = Some(value.into());
        self
    }

    /// Whether the query has no clause at all.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
            && self.filter.is_empty()
    }
}

/// A scoring query restricted by a non-scoring filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredQuery {
    /// Scoring part.
    pub query: Option<Box<QueryNode>>,
    /// Non-scoring restriction.
    pub filter: Option<Box<QueryNode>>,
    /// Query name.
    pub name: Option<String>,
    /// Score multiplier.
    pub boost: Option<f32>,
}

/// How matching nested documents contribute to the root score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// Average score.
    Avg,
    /// Sum of scores.
    Sum,
    /// Minimum score.
    Min,
    /// Maximum score.
    Max,
    /// Nested matches do not score.
    #[default]
    None,
}

impl ScoreMode {
    /// Returns the wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Avg => "avg",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::None => "none",
        }
    }
}

/// A query evaluated against the objects of a nested path.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedQuery {
    /// Nested object group.
    pub path: String,
    /// Query on the nested objects.
    pub query: Box<QueryNode>,
    /// Score propagation mode.
    pub score_mode: ScoreMode,
    /// Query name.
    pub name: Option<String>,
    /// Score multiplier.
    pub boost: Option<f32>,
}

/// Negation of a query, rendered as a `must_not` boolean clause.
#[derive(Debug, Clone, PartialEq)]
pub struct NotQuery {
    /// Negated query.
    pub query: Box<QueryNode>,
    /// Query name.
    pub name: Option<String>,
    /// Score multiplier.
    pub boost: Option<f32>,
}

/// Documents having a value for a field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExistsQuery {
    /// Physical field.
    pub field: String,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Documents without a value for a field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MissingQuery {
    /// Physical field.
    pub field: String,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Bounds of a range query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RangeBounds {
    /// Strictly greater than.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    /// Greater than or equal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    /// Strictly lower than.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    /// Lower than or equal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
}

impl RangeBounds {
    /// Whether no bound is set.
    pub fn is_empty(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }
}

/// Values of a field within bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RangeQuery {
    /// Physical field.
    pub field: String,
    /// Bounds.
    pub bounds: RangeBounds,
    /// Date format of the bounds.
    #[serde(default)]
    pub format: Option<String>,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Documents by identifier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdsQuery {
    /// Document identifiers.
    pub values: Vec<Value>,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Terms starting with a prefix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrefixQuery {
    /// Physical field.
    pub field: String,
    /// Prefix.
    pub value: String,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Terms matching a regular expression.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegexpQuery {
    /// Physical field.
    pub field: String,
    /// Regular expression.
    pub value: String,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Phrase whose last term is a prefix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchPhrasePrefixQuery {
    /// Physical field.
    pub field: String,
    /// Text to match.
    pub query_text: String,
    /// Maximum number of prefix expansions.
    #[serde(default)]
    pub max_expansions: Option<u32>,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Every document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchAllQuery {
    /// Query name.
    pub name: Option<String>,
    /// Score multiplier.
    pub boost: Option<f32>,
}

/// Position-aware span clause.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "span_type", rename_all = "snake_case")]
pub enum SpanClause {
    /// A single term.
    Term {
        /// Physical field.
        field: String,
        /// Term value.
        value: Value,
    },
    /// Clauses within `slop` positions of each other.
    Near {
        /// Sub-clauses.
        clauses: Vec<Self>,
        /// Maximum number of intervening positions.
        #[serde(default)]
        slop: u32,
        /// Whether clauses must appear in order.
        #[serde(default = "default_in_order")]
        in_order: bool,
    },
    /// A clause matching within the first `end` positions.
    First {
        /// Sub-clause.
        #[serde(rename = "match")]
        inner: Box<Self>,
        /// Maximum end position.
        end: u32,
    },
    /// Any of several clauses.
    Or {
        /// Sub-clauses.
        clauses: Vec<Self>,
    },
    /// `include` spans not overlapping `exclude` spans.
    Not {
        /// Spans to keep.
        include: Box<Self>,
        /// Spans to remove.
        exclude: Box<Self>,
    },
    /// `big` spans containing a `little` span.
    Containing {
        /// Enclosing spans.
        big: Box<Self>,
        /// Enclosed spans.
        little: Box<Self>,
    },
    /// `little` spans enclosed in a `big` span.
    Within {
        /// Enclosing spans.
        big: Box<Self>,
        /// Enclosed spans.
        little: Box<Self>,
    },
}

/// Default `in_order` of a near clause.
fn default_in_order() -> bool {
    true
}

impl SpanClause {
    /// Span clause type names accepted in definitions.
    pub const TYPES: [&'static str; 7] =
        ["term", "near", "first", "or", "not", "containing", "within"];
}

/// Span query root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpanQuery {
    /// Root clause.
    #[serde(flatten)]
    pub clause: SpanClause,
    /// Query name.
    #[serde(default)]
    pub name: Option<String>,
    /// Score multiplier.
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Query variant tags, as used in definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// `term`
    Term,
    /// `terms`
    Terms,
    /// `match`
    Match,
    /// `multi_match`
    MultiMatch,
    /// `common`
    Common,
    /// `bool`
    Bool,
    /// `filtered`
    Filtered,
    /// `nested`
    Nested,
    /// `not`
    Not,
    /// `exists`
    Exists,
    /// `missing`
    Missing,
    /// `span`
    Span,
    /// `range`
    Range,
    /// `ids`
    Ids,
    /// `prefix`
    Prefix,
    /// `regexp`
    Regexp,
    /// `match_phrase_prefix`
    MatchPhrasePrefix,
    /// `match_all`
    MatchAll,
}

impl QueryType {
    /// Every query type.
    pub const ALL: [Self; 18] = [
        Self::Term,
        Self::Terms,
        Self::Match,
        Self::MultiMatch,
        Self::Common,
        Self::Bool,
        Self::Filtered,
        Self::Nested,
        Self::Not,
        Self::Exists,
        Self::Missing,
        Self::Span,
        Self::Range,
        Self::Ids,
        Self::Prefix,
        Self::Regexp,
        Self::MatchPhrasePrefix,
        Self::MatchAll,
    ];

    /// Returns the definition tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Term => "term",
            Self::Terms => "terms",
            Self::Match => "match",
            Self::MultiMatch => "multi_match",
            Self::Common => "common",
            Self::Bool => "bool",
            Self::Filtered => "filtered",
            Self::Nested => "nested",
            Self::Not => "not",
            Self::Exists => "exists",
            Self::Missing => "missing",
            Self::Span => "span",
            Self::Range => "range",
            Self::Ids => "ids",
            Self::Prefix => "prefix",
            Self::Regexp => "regexp",
            Self::MatchPhrasePrefix => "match_phrase_prefix",
            Self::MatchAll => "match_all",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A node of the query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Exact value.
    Term(TermQuery),
    /// Any of several exact values.
    Terms(TermsQuery),
    /// Analyzed match on one field.
    Match(MatchQuery),
    /// Analyzed match on several fields.
    MultiMatch(MultiMatchQuery),
    /// Common-terms match.
    Common(CommonQuery),
    /// Boolean combination.
    Bool(BoolQuery),
    /// Query plus non-scoring filter.
    Filtered(FilteredQuery),
    /// Query on nested objects.
    Nested(NestedQuery),
    /// Negation.
    Not(NotQuery),
    /// Field has a value.
    Exists(ExistsQuery),
    /// Field has no value.
    Missing(MissingQuery),
    /// Position-aware span query.
    Span(SpanQuery),
    /// Value within bounds.
    Range(RangeQuery),
    /// Documents by id.
    Ids(IdsQuery),
    /// Term prefix.
    Prefix(PrefixQuery),
    /// Term regular expression.
    Regexp(RegexpQuery),
    /// Phrase with prefix last term.
    MatchPhrasePrefix(MatchPhrasePrefixQuery),
    /// Every document.
    MatchAll(MatchAllQuery),
}

impl QueryNode {
    /// Returns the variant tag.
    pub fn query_type(&self) -> QueryType {
        match self {
            Self::Term(_) => QueryType::Term,
            Self::Terms(_) => QueryType::Terms,
            Self::Match(_) => QueryType::Match,
            Self::MultiMatch(_) => QueryType::MultiMatch,
            Self::Common(_) => QueryType::Common,
            Self::Bool(_) => QueryType::Bool,
            Self::Filtered(_) => QueryType::Filtered,
            Self::Nested(_) => QueryType::Nested,
            Self::Not(_) => QueryType::Not,
            Self::Exists(_) => QueryType::Exists,
            Self::Missing(_) => QueryType::Missing,
            Self::Span(_) => QueryType::Span,
            Self::Range(_) => QueryType::Range,
            Self::Ids(_) => QueryType::Ids,
            Self::Prefix(_) => QueryType::Prefix,
            Self::Regexp(_) => QueryType::Regexp,
            Self::MatchPhrasePrefix(_) => QueryType::MatchPhrasePrefix,
            Self::MatchAll(_) => QueryType::MatchAll,
        }
    }

    /// Returns the query name, if any.
    pub fn name(&self) -> Option<&str> {
        let (name, _) = self.common();
        name.as_deref()
    }

    /// Returns the boost, if any.
    pub fn boost(&self) -> Option<f32> {
        let (_, boost) = self.common();
        *boost
    }

    /// Returns a copy of the query with a name set.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        *self.common_mut().0 = Some(name.into());
        self
    }

    /// Returns a copy of the query with a boost set.
    pub fn boosted(mut self, boost: f32) -> Self {
        *self.common_mut().1 = Some(boost);
        self
    }

    /// Shared attributes of every variant.
    fn common(&self) -> (&Option<String>, &Option<f32>) {
        match self {
            Self::Term(q) => (&q.name, &q.boost),
            Self::Terms(q) => (&q.name, &q.boost),
            Self::Match(q) => (&q.name, &q.boost),
            Self::MultiMatch(q) => (&q.name, &q.boost),
            Self::Common(q) => (&q.name, &q.boost),
            Self::Bool(q) => (&q.name, &q.boost),
            Self::Filtered(q) => (&q.name, &q.boost),
            Self::Nested(q) => (&q.name, &q.boost),
            Self::Not(q) => (&q.name, &q.boost),
            Self::Exists(q) => (&q.name, &q.boost),
            Self::Missing(q) => (&q.name, &q.boost),
            Self::Span(q) => (&q.name, &q.boost),
            Self::Range(q) => (&q.name, &q.boost),
            Self::Ids(q) => (&q.name, &q.boost),
            Self::Prefix(q) => (&q.name, &q.boost),
            Self::Regexp(q) => (&q.name, &q.boost),
            Self::MatchPhrasePrefix(q) => (&q.name, &q.boost),
            Self::MatchAll(q) => (&q.name, &q.boost),
        }
    }

    /// Mutable access to the shared attributes.
    fn common_mut(&mut self) -> (&mut Option<String>, &mut Option<f32>) {
        match self {
            Self::Term(q) => (&mut q.name, &mut q.boost),
            Self::Terms(q) => (&mut q.name, &mut q.boost),
            Self::Match(q) => (&mut q.name, &mut q.boost),
            Self::MultiMatch(q) => (&mut q.name, &mut q.boost),
            Self::Common(q) => (&mut q.name, &mut q.boost),
            Self::Bool(q) => (&mut q.name, &mut q.boost),
            Self::Filtered(q) => (&mut q.name, &mut q.boost),
            Self::Nested(q) => (&mut q.name, &mut q.boost),
            Self::Not(q) => (&mut q.name, &mut q.boost),
            Self::Exists(q) => (&mut q.name, &mut q.boost),
            Self::Missing(q) => (&mut q.name, &mut q.boost),
            Self::Span(q) => (&mut q.name, &mut q.boost),
            Self::Range(q) => (&mut q.name, &mut q.boost),
            Self::Ids(q) => (&mut q.name, &mut q.boost),
            Self::Prefix(q) => (&mut q.name, &mut q.boost),
            Self::Regexp(q) => (&mut q.name, &mut q.boost),
            Self::MatchPhrasePrefix(q) => (&mut q.name, &mut q.boost),
            Self::MatchAll(q) => (&mut q.name, &mut q.boost),
        }
    }

    /// Creates a term query.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term(TermQuery {
            field: field.into(),
            value: value.into(),
            name: None,
            boost: None,
        })
    }

    /// Creates a terms query.
    pub fn terms(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::Terms(TermsQuery {
            field: field.into(),
            values,
            name: None,
            boost: None,
        })
    }

    /// Creates a match query.
    pub fn match_text(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Match(MatchQuery {
            field: field.into(),
            query_text: text.into(),
            minimum_should_match: None,
            fuzziness: None,
            name: None,
            boost: None,
        })
    }

    /// Creates an exists query.
    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists(ExistsQuery {
            field: field.into(),
            name: None,
            boost: None,
        })
    }

    /// Creates a missing query.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(MissingQuery {
            field: field.into(),
            name: None,
            boost: None,
        })
    }

    /// Creates a range query.
    pub fn range(field: impl Into<String>, bounds: RangeBounds) -> Self {
        Self::Range(RangeQuery {
            field: field.into(),
            bounds,
            format: None,
            name: None,
            boost: None,
        })
    }

    /// Wraps a query in a nested query on `path`.
    pub fn nested(path: impl Into<String>, query: Self) -> Self {
        Self::Nested(NestedQuery {
            path: path.into(),
            query: Box::new(query),
            score_mode: ScoreMode::default(),
            name: None,
            boost: None,
        })
    }

    /// Negates a query.
    pub fn not(query: Self) -> Self {
        Self::Not(NotQuery {
            query: Box::new(query),
            name: None,
            boost: None,
        })
    }

    /// Combines an optional scoring query with an optional filter.
    pub fn filtered(query: Option<Self>, filter: Option<Self>) -> Self {
        Self::Filtered(FilteredQuery {
            query: query.map(Box::new),
            filter: filter.map(Box::new),
            name: None,
            boost: None,
        })
    }

    /// Creates a match-all query.
    pub fn match_all() -> Self {
        Self::MatchAll(MatchAllQuery::default())
    }
}

impl From<BoolQuery> for QueryNode {
    fn from(query: BoolQuery) -> Self {
        Self::Bool(query)
    }
}
