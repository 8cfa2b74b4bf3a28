//! Analyzer and field type vocabularies.
//!
//! Analyzers name the sub-field variants a text field is indexed under. The
//! analysis chains themselves live in the index settings, so here they are
//! only identifiers with a stable wire spelling.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Name of a text analysis chain, used as the sub-field suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    /// Default full-text analyzer.
    #[default]
    Standard,
    /// Whitespace-only tokenization, used for exact word matches.
    Whitespace,
    /// Word n-grams, used for phrase matching boosts.
    Shingle,
    /// Normalized single token, used for sorting.
    Sortable,
    /// Phonetic encoding, used by the spellchecker.
    Phonetic,
    /// Not analyzed: the keyword variant used for term-level operations.
    Untouched,
    /// Edge n-grams, used for autocomplete.
    StandardEdgeNgram,
    /// Reference (sku-like) analyzer.
    Reference,
    /// Keyword analyzer.
    Keyword,
}

impl Analyzer {
    /// Every analyzer, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Standard,
        Self::Whitespace,
        Self::Shingle,
        Self::Sortable,
        Self::Phonetic,
        Self::Untouched,
        Self::StandardEdgeNgram,
        Self::Reference,
        Self::Keyword,
    ];

    /// Returns the wire name of the analyzer (also its sub-field suffix).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Whitespace => "whitespace",
            Self::Shingle => "shingle",
            Self::Sortable => "sortable",
            Self::Phonetic => "phonetic",
            Self::Untouched => "untouched",
            Self::StandardEdgeNgram => "standard_edge_ngram",
            Self::Reference => "reference",
            Self::Keyword => "keyword",
        }
    }
}

impl fmt::Display for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Analyzer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|analyzer| analyzer.as_str() == name)
            .ok_or_else(|| format!("unknown analyzer: {s}"))
    }
}

/// Storage type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-token string.
    Keyword,
    /// Analyzed text with sub-field variants.
    #[default]
    Text,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// Double precision float.
    Double,
    /// Boolean.
    Boolean,
    /// Date or datetime.
    Date,
    /// Token count of an analyzed value.
    TokenCount,
}

impl FieldType {
    /// Returns the wire name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::TokenCount => "token_count",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
