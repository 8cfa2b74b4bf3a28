//! Configuration file parsing.
//!
//! Parses individual TOML files into `RawConfig` structures that keep every
//! value optional, so partial files can be layered before resolution.

use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::Deserialize;
use vitrine_aggregation::{BucketDefinition, FilterSet};
use vitrine_mapping::FieldOverrides;

use crate::{ConfigError, TrackTotalHits};

/// Raw configuration as parsed directly from a TOML file.
///
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Index section.
    pub index: Option<RawIndexSettings>,
    /// Field declarations: name -> partial field.
    pub field: Option<IndexMap<String, FieldOverrides>>,
    /// Global fulltext relevance settings.
    pub relevance: Option<RawRelevanceSettings>,
    /// Container declarations: name -> container.
    pub container: Option<IndexMap<String, RawContainer>>,
}

/// Raw index settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawIndexSettings {
    /// Index name.
    pub name: Option<String>,
    /// Identifier field.
    pub id_field: Option<String>,
}

/// Raw relevance settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRelevanceSettings {
    /// Minimum share of query terms a document must match.
    pub minimum_should_match: Option<String>,
    /// Weight of non-best fields in multi-field matches.
    pub tie_breaker: Option<f32>,
    /// Boost of whole-phrase matches on shingle fields (0 disables).
    pub phrase_match_boost: Option<u32>,
    /// Frequency above which a term is considered common.
    pub cutoff_frequency: Option<f32>,
    /// Whether fuzzy matching is used for misspelled queries.
    pub fuzziness_enabled: Option<bool>,
    /// Edit distance (`AUTO`, `1`, `2`).
    pub fuzziness: Option<String>,
    /// Leading characters excluded from fuzzy matching.
    pub fuzziness_prefix_length: Option<u32>,
    /// Maximum number of fuzzy expansions.
    pub fuzziness_max_expansions: Option<u32>,
    /// Whether phonetic matching is used for misspelled queries.
    pub phonetic_enabled: Option<bool>,
}

/// Raw container declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawContainer {
    /// Hit counting mode.
    pub track_total_hits: Option<TrackTotalHits>,
    /// Minimum relevance score of a hit.
    pub min_score: Option<f32>,
    /// Container-specific relevance overrides.
    pub relevance: Option<RawRelevanceSettings>,
    /// Filters applied to every search of the container.
    pub filters: Option<FilterSet>,
    /// Aggregations computed by every search of the container.
    pub aggregations: Option<IndexMap<String, BucketDefinition>>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use vitrine_aggregation::FilterCondition;
    use vitrine_mapping::{Analyzer, FieldType};

    use super::*;

    fn parse(contents: &str) -> RawConfig {
        parse_config_str(contents, &PathBuf::from("test.toml")).unwrap()
    }

    #[test]
    fn parse_empty_config() {
        let config = parse("");
        assert!(config.index.is_none());
        assert!(config.field.is_none());
        assert!(config.container.is_none());
    }

    #[test]
    fn parse_fields_in_declaration_order() {
        let config = parse(
            r#"
[field.name]
type = "text"
searchable = true
search_weight = 5
default_search_analyzer = "whitespace"

[field."price.price"]
type = "double"
nested_path = "price"
filterable = true

[field.color]
filterable = true
"#,
        );

        let fields = config.field.unwrap();
        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            ["name", "price.price", "color"]
        );
        assert_eq!(fields["name"].field_type, Some(FieldType::Text));
        assert_eq!(fields["name"].search_weight, Some(5));
        assert_eq!(
            fields["name"].default_search_analyzer,
            Some(Analyzer::Whitespace)
        );
        assert_eq!(fields["price.price"].nested_path.as_deref(), Some("price"));
        assert_eq!(fields["color"].field_type, None);
    }

    #[test]
    fn parse_container_with_filters_and_aggregations() {
        let config = parse(
            r#"
[container.catalog_view]
track_total_hits = 10000
min_score = 0.5

[container.catalog_view.filters]
visibility = [2, 4]
status = 1

[container.catalog_view.aggregations.color]
type = "term"
field = "color"
size = 20

[container.catalog_view.aggregations.color.metrics.avg_price]
type = "avg"
field = "price.price"
"#,
        );

        let containers = config.container.unwrap();
        let catalog = &containers["catalog_view"];
        assert_eq!(catalog.track_total_hits, Some(TrackTotalHits::UpTo(10_000)));
        assert_eq!(catalog.min_score, Some(0.5));

        let filters = catalog.filters.as_ref().unwrap();
        assert_eq!(
            filters["visibility"],
            FilterCondition::Values(vec![2.into(), 4.into()])
        );
        assert_eq!(filters["status"], FilterCondition::value(1));

        let aggregations = catalog.aggregations.as_ref().unwrap();
        assert_eq!(aggregations["color"].size, Some(20));
        assert_eq!(aggregations["color"].metrics["avg_price"].metric_type, "avg");
    }

    #[test]
    fn parse_track_total_hits_flag() {
        let config = parse("[container.quick_search]\ntrack_total_hits = false\n");
        assert_eq!(
            config.container.unwrap()["quick_search"].track_total_hits,
            Some(TrackTotalHits::Enabled(false))
        );
    }

    #[test]
    fn parse_relevance() {
        let config = parse(
            r#"
[relevance]
minimum_should_match = "75%"
phrase_match_boost = 10
fuzziness_enabled = false
"#,
        );
        let relevance = config.relevance.unwrap();
        assert_eq!(relevance.minimum_should_match.as_deref(), Some("75%"));
        assert_eq!(relevance.phrase_match_boost, Some(10));
        assert_eq!(relevance.fuzziness_enabled, Some(false));
        assert_eq!(relevance.tie_breaker, None);
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = parse_config_str("[field.name\n", &PathBuf::from("broken.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn unknown_field_type_is_a_parse_error() {
        let err = parse_config_str("[field.name]\ntype = \"geo_point\"\n", &PathBuf::from("x.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }
}
