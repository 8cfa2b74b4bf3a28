//! Container configuration for vitrine.
//!
//! Configuration is written in TOML and may be split over several files that
//! layer on top of each other: the first file has the highest precedence.
//! Loading produces an index [`Mapping`] built from the merged field
//! declarations, global relevance settings, and one [`ContainerConfig`] per
//! search container (default filters, aggregations, hit counting).
//!
//! ```toml
//! [index]
//! name = "catalog_product"
//!
//! [field.name]
//! searchable = true
//! search_weight = 5
//!
//! [field.color]
//! type = "keyword"
//! filterable = true
//!
//! [container.catalog_view.filters]
//! visibility = [2, 4]
//!
//! [container.catalog_view.aggregations.color]
//! type = "term"
//! field = "color"
//! ```

#![warn(missing_docs)]

mod error;
mod merge;
mod parse;
mod validate;

use std::{path::PathBuf, sync::Arc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vitrine_aggregation::{BucketDefinition, FilterSet};
use vitrine_mapping::Mapping;

pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawContainer, RawIndexSettings, RawRelevanceSettings, parse_config_file,
    parse_config_str,
};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Default index name.
pub const DEFAULT_INDEX_NAME: &str = "vitrine";

/// Default identifier field.
pub const DEFAULT_ID_FIELD: &str = "entity_id";

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Index settings.
    pub index: IndexSettings,
    /// Index mapping built from every declared field.
    pub mapping: Arc<Mapping>,
    /// Global relevance settings.
    pub relevance: RelevanceSettings,
    /// Containers by name, in declaration order.
    pub containers: IndexMap<String, ContainerConfig>,
}

impl Config {
    /// Loads configuration from a list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    /// An empty list yields a configuration with an id-only mapping and no
    /// containers.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Looks up a container by name.
    pub fn container(&self, name: &str) -> Result<&ContainerConfig, ConfigError> {
        self.containers
            .get(name)
            .ok_or_else(|| ConfigError::UndefinedContainer(name.to_string()))
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Empty configuration (no containers defined)
    /// - Container filters on undeclared or non-filterable fields
    /// - Aggregations on undeclared fields
    /// - Unknown bucket, metric and pipeline types
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }
}

/// Index-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Name of the index requests target.
    pub name: String,
    /// Document identifier field.
    pub id_field: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            name: String::from(DEFAULT_INDEX_NAME),
            id_field: String::from(DEFAULT_ID_FIELD),
        }
    }
}

/// Fulltext relevance settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceSettings {
    /// Minimum share of query terms a document must match.
    pub minimum_should_match: String,
    /// Weight of non-best fields in multi-field matches.
    pub tie_breaker: f32,
    /// Boost of whole-phrase matches on shingle fields, if enabled.
    pub phrase_match_boost: Option<u32>,
    /// Frequency above which a term is considered common.
    pub cutoff_frequency: f32,
    /// Whether fuzzy matching is used for misspelled queries.
    pub fuzziness_enabled: bool,
    /// Edit distance.
    pub fuzziness: String,
    /// Leading characters excluded from fuzzy matching.
    pub fuzziness_prefix_length: u32,
    /// Maximum number of fuzzy expansions.
    pub fuzziness_max_expansions: u32,
    /// Whether phonetic matching is used for misspelled queries.
    pub phonetic_enabled: bool,
}

impl Default for RelevanceSettings {
    fn default() -> Self {
        Self {
            minimum_should_match: String::from("100%"),
            tie_breaker: 1.0,
            phrase_match_boost: None,
            cutoff_frequency: 0.15,
            fuzziness_enabled: true,
            fuzziness: String::from("AUTO"),
            fuzziness_prefix_length: 1,
            fuzziness_max_expansions: 10,
            phonetic_enabled: true,
        }
    }
}

/// How the engine counts total hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackTotalHits {
    /// Count exactly (`true`) or not at all (`false`).
    Enabled(bool),
    /// Count exactly up to this many hits.
    UpTo(u64),
}

impl Default for TrackTotalHits {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

/// A named search context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerConfig {
    /// Container name.
    pub name: String,
    /// Hit counting mode.
    pub track_total_hits: TrackTotalHits,
    /// Minimum relevance score of a hit.
    pub min_score: Option<f32>,
    /// Relevance settings (global settings with container overrides).
    pub relevance: RelevanceSettings,
    /// Filters applied to every search of the container.
    pub filters: FilterSet,
    /// Aggregations computed by every search of the container.
    pub aggregations: IndexMap<String, BucketDefinition>,
}

impl ContainerConfig {
    /// Creates an empty container with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            track_total_hits: TrackTotalHits::default(),
            min_score: None,
            relevance: RelevanceSettings::default(),
            filters: FilterSet::new(),
            aggregations: IndexMap::new(),
        }
    }
}
