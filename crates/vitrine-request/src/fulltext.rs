//! Fulltext query builder.
//!
//! Exact searches match the weighted searchable properties, restricted to
//! documents whose `spelling` catch-all matches the uncommon terms. Fuzzy
//! searches match the `spelling` sub-fields with edit distance and phonetic
//! encoding instead.

use vitrine_config::RelevanceSettings;
use vitrine_mapping::{Analyzer, DEFAULT_SEARCH_FIELD, DEFAULT_SPELLING_FIELD, Field, Mapping};
use vitrine_query::{
    BoolQuery, CommonQuery, Fuzziness, MinimumShouldMatch, MultiMatchQuery, MultiMatchType,
    QueryNode, WeightedField,
};

use crate::params::SpellingType;

/// Builds fulltext queries from a mapping and relevance settings.
#[derive(Debug, Clone, Copy)]
pub struct FulltextQueryBuilder<'a> {
    /// Mapping listing the searchable fields.
    mapping: &'a Mapping,
    /// Matching and fuzziness tuning.
    relevance: &'a RelevanceSettings,
}

impl<'a> FulltextQueryBuilder<'a> {
    /// Creates a builder.
    pub fn new(mapping: &'a Mapping, relevance: &'a RelevanceSettings) -> Self {
        Self { mapping, relevance }
    }

    /// Builds the query for `text`.
    ///
    /// Blank text matches every document.
    pub fn build(&self, text: &str, spelling_type: SpellingType) -> QueryNode {
        let text = text.trim();
        if text.is_empty() {
            return QueryNode::match_all();
        }

        if spelling_type.is_fuzzy() {
            self.spellchecked_query(text)
        } else {
            self.exact_query(text)
        }
    }

    /// Weighted match over searchable properties, with an optional phrase
    /// boost on shingle properties, filtered by a cutoff query on `spelling`.
    fn exact_query(&self, text: &str) -> QueryNode {
        let mut query = self.weighted_search_query(text);

        if let Some(boost) = self.relevance.phrase_match_boost {
            let fields = self.mapping.weighted_search_properties(
                Some(Analyzer::Shingle),
                Some(DEFAULT_SEARCH_FIELD),
                boost,
                Field::is_searchable,
            );
            let phrase = self.multi_match(text, fields, None);
            query = BoolQuery::new().must(query).should(phrase).into();
        }

        let cutoff = QueryNode::Common(CommonQuery {
            field: DEFAULT_SPELLING_FIELD.to_string(),
            query_text: text.to_string(),
            cutoff_frequency: self.relevance.cutoff_frequency,
            minimum_should_match: Some(self.minimum_should_match()),
            name: None,
            boost: None,
        });

        QueryNode::filtered(Some(query), Some(cutoff))
    }

    /// Match over the default-analyzer searchable properties.
    fn weighted_search_query(&self, text: &str) -> QueryNode {
        let fields = self.mapping.weighted_search_properties(
            None,
            Some(DEFAULT_SEARCH_FIELD),
            1,
            Field::is_searchable,
        );
        self.multi_match(text, fields, None)
    }

    /// Any of the enabled misspelling-tolerant queries.
    ///
    /// Falls back to the weighted search query when both fuzzy and phonetic
    /// matching are disabled.
    fn spellchecked_query(&self, text: &str) -> QueryNode {
        let mut query = BoolQuery::new();

        if self.relevance.fuzziness_enabled {
            let fields = self.mapping.weighted_search_properties(
                Some(Analyzer::Whitespace),
                Some(DEFAULT_SPELLING_FIELD),
                1,
                Field::is_used_in_spellcheck,
            );
            let fuzziness = Fuzziness {
                value: self.relevance.fuzziness.clone(),
                prefix_length: self.relevance.fuzziness_prefix_length,
                max_expansions: self.relevance.fuzziness_max_expansions,
            };
            query = query.should(self.multi_match(text, fields, Some(fuzziness)));
        }

        if self.relevance.phonetic_enabled {
            let field = format!("{DEFAULT_SPELLING_FIELD}.{}", Analyzer::Phonetic);
            let mut phonetic = QueryNode::match_text(field, text);
            if let QueryNode::Match(ref mut matched) = phonetic {
                matched.minimum_should_match = Some(self.minimum_should_match());
            }
            query = query.should(phonetic);
        }

        if query.is_empty() {
            return self.weighted_search_query(text);
        }
        query.minimum_should_match(1_i64).into()
    }

    /// Builds a best-fields multi-match.
    fn multi_match(
        &self,
        text: &str,
        fields: Vec<(String, u32)>,
        fuzziness: Option<Fuzziness>,
    ) -> QueryNode {
        QueryNode::MultiMatch(MultiMatchQuery {
            query_text: text.to_string(),
            fields: fields
                .into_iter()
                .map(|(field, weight)| WeightedField::new(field, weight as f32))
                .collect(),
            minimum_should_match: Some(self.minimum_should_match()),
            tie_breaker: Some(self.relevance.tie_breaker),
            match_type: Some(MultiMatchType::BestFields),
            cutoff_frequency: None,
            fuzziness,
            name: None,
            boost: None,
        })
    }

    /// Configured minimum share of matching terms.
    fn minimum_should_match(&self) -> MinimumShouldMatch {
        MinimumShouldMatch::from(self.relevance.minimum_should_match.as_str())
    }
}
