//! Per-call search parameters.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vitrine_aggregation::{BucketDefinition, FilterCondition, FilterSet};
use vitrine_config::TrackTotalHits;
use vitrine_mapping::SortDirection;
use vitrine_query::{QueryFactory, QueryNode};

use crate::RequestError;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Fuzziness mode of the fulltext query, as decided by the spellchecker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellingType {
    /// Every term is known: exact matching.
    #[default]
    Exact,
    /// Some terms are misspelled.
    Fuzzy,
    /// Every term is misspelled.
    MostFuzzy,
}

impl SpellingType {
    /// Whether the fulltext query should tolerate misspellings.
    pub fn is_fuzzy(self) -> bool {
        matches!(self, Self::Fuzzy | Self::MostFuzzy)
    }
}

/// A requested sort, by logical field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Logical field name, or `_score`.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
    /// Restricts which nested objects take part in sorting, keyed relative
    /// to the field's nested path.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub nested_filter: FilterSet,
}

impl SortSpec {
    /// Creates a sort on a field.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
            nested_filter: FilterSet::new(),
        }
    }

    /// Adds a nested filter condition.
    pub fn with_nested_filter(
        mut self,
        field: impl Into<String>,
        condition: FilterCondition,
    ) -> Self {
        self.nested_filter.insert(field.into(), condition);
        self
    }
}

/// Inner hits returned per collapsed group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerHits {
    /// Name of the inner hits section.
    pub name: String,
    /// Hits per group.
    pub size: u32,
}

/// Field collapsing: one hit per distinct field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collapse {
    /// Logical field to collapse on.
    pub field: String,
    /// Optional inner hits per group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_hits: Option<InnerHits>,
}

/// Which document fields the engine returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceConfig {
    /// Whole source (`true`) or none (`false`).
    Enabled(bool),
    /// Field selection.
    Fields {
        /// Returned fields.
        includes: Vec<String>,
        /// Fields dropped from the returned ones.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        excludes: Vec<String>,
    },
}

/// Parameters of one search call.
///
/// Container settings (filters, aggregations, relevance, hit counting) are
/// combined with these by the assembler.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Free-text query.
    pub query_text: Option<String>,
    /// Structured filters by logical field.
    pub filters: FilterSet,
    /// Prebuilt query filters, added to the main query.
    pub query_filters: Vec<QueryNode>,
    /// Requested sort.
    pub sort_orders: Vec<SortSpec>,
    /// Offset of the first hit.
    pub from: i64,
    /// Page size; zero requests counts and aggregations only.
    pub size: i64,
    /// Scope discriminators (store, locale, ...).
    pub dimensions: IndexMap<String, String>,
    /// Ad-hoc aggregations, merged over the container's by name.
    pub facets: IndexMap<String, BucketDefinition>,
    /// Fuzziness mode of the fulltext query.
    pub spelling_type: SpellingType,
    /// Minimum relevance score, overriding the container's.
    pub min_score: Option<f32>,
    /// Field collapsing.
    pub collapse: Option<Collapse>,
    /// Returned fields.
    pub source: Option<SourceConfig>,
    /// Hit counting mode, overriding the container's.
    pub track_total_hits: Option<TrackTotalHits>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query_text: None,
            filters: FilterSet::new(),
            query_filters: Vec::new(),
            sort_orders: Vec::new(),
            from: 0,
            size: DEFAULT_PAGE_SIZE,
            dimensions: IndexMap::new(),
            facets: IndexMap::new(),
            spelling_type: SpellingType::default(),
            min_score: None,
            collapse: None,
            source: None,
            track_total_hits: None,
        }
    }
}

impl SearchParams {
    /// Creates default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-text query.
    pub fn with_query_text(mut self, text: impl Into<String>) -> Self {
        self.query_text = Some(text.into());
        self
    }

    /// Adds a structured filter.
    pub fn with_filter(mut self, field: impl Into<String>, condition: FilterCondition) -> Self {
        self.filters.insert(field.into(), condition);
        self
    }

    /// Adds a prebuilt query filter.
    pub fn with_query_filter(mut self, query: QueryNode) -> Self {
        self.query_filters.push(query);
        self
    }

    /// Adds a query filter from a tagged definition.
    pub fn with_query_filter_definition(mut self, definition: Value) -> Result<Self, RequestError> {
        self.query_filters
            .push(QueryFactory::from_definition(definition)?);
        Ok(self)
    }

    /// Appends a sort.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort_orders.push(sort);
        self
    }

    /// Sets the offset and page size.
    pub fn with_page(mut self, from: i64, size: i64) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    /// Adds a scope dimension.
    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(name.into(), value.into());
        self
    }

    /// Adds an ad-hoc aggregation.
    pub fn with_facet(mut self, name: impl Into<String>, definition: BucketDefinition) -> Self {
        self.facets.insert(name.into(), definition);
        self
    }

    /// Sets the fuzziness mode.
    pub fn with_spelling_type(mut self, spelling_type: SpellingType) -> Self {
        self.spelling_type = spelling_type;
        self
    }

    /// Sets the minimum relevance score.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Collapses hits on a field.
    pub fn with_collapse(mut self, collapse: Collapse) -> Self {
        self.collapse = Some(collapse);
        self
    }

    /// Sets the returned fields.
    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the hit counting mode.
    pub fn with_track_total_hits(mut self, track_total_hits: TrackTotalHits) -> Self {
        self.track_total_hits = Some(track_total_hits);
        self
    }
}
