//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and building the index mapping.

use std::{path::PathBuf, sync::Arc};

use indexmap::IndexMap;
use tracing::debug;
use vitrine_mapping::{Field, FieldConfig, FieldType, Mapping};

use crate::{
    Config, ConfigError, ContainerConfig, IndexSettings, RelevanceSettings,
    parse::{RawConfig, RawContainer, RawIndexSettings, RawRelevanceSettings},
};

/// A parsed config file with its source path.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first,
/// lowest precedence last.
///
/// Merge rules:
/// - Scalar settings: first defined value wins (highest precedence)
/// - Fields: merged by name, attribute by attribute
/// - Containers: merged by name; filters merge by key, aggregations are
///   replaced whole by name
/// - Container relevance: the merged global settings, overridden by the
///   container's own relevance sections
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    let index = merge_index_settings(configs);
    let fields = merge_fields(configs)?;
    let mapping = Mapping::new(index.id_field.clone(), fields)?;
    let relevance = merge_relevance(configs);
    let containers = merge_containers(configs, &relevance);

    debug!(
        files = configs.len(),
        fields = mapping.fields().len(),
        containers = containers.len(),
        "merged configuration"
    );

    Ok(Config {
        index,
        mapping: Arc::new(mapping),
        relevance,
        containers,
    })
}

/// Iterates raw configs from lowest to highest precedence.
fn lowest_first(configs: &[ParsedConfig]) -> impl Iterator<Item = &RawConfig> {
    configs.iter().rev().map(|parsed| &parsed.config)
}

/// Merges index settings, taking first defined value for each field.
fn merge_index_settings(configs: &[ParsedConfig]) -> IndexSettings {
    let mut result = IndexSettings::default();

    for raw in lowest_first(configs) {
        if let Some(ref index) = raw.index {
            apply_raw_index(&mut result, index);
        }
    }

    result
}

/// Applies raw index settings to result, overwriting any present values.
fn apply_raw_index(result: &mut IndexSettings, raw: &RawIndexSettings) {
    if let Some(ref v) = raw.name {
        result.name = v.clone();
    }
    if let Some(ref v) = raw.id_field {
        result.id_field = v.clone();
    }
}

/// Merges field declarations by name.
///
/// A field first seen in a lower-precedence file keeps its position; later
/// layers refine it through [`Field::merge_config`].
fn merge_fields(configs: &[ParsedConfig]) -> Result<Vec<Field>, ConfigError> {
    let mut fields: IndexMap<String, Field> = IndexMap::new();

    for raw in lowest_first(configs) {
        let Some(ref declared) = raw.field else {
            continue;
        };
        for (name, overrides) in declared {
            let merged = match fields.get(name) {
                Some(existing) => existing.merge_config(overrides)?,
                None => Field::new(
                    name.clone(),
                    FieldType::default(),
                    None,
                    FieldConfig::default(),
                )?
                .merge_config(overrides)?,
            };
            fields.insert(name.clone(), merged);
        }
    }

    Ok(fields.into_values().collect())
}

/// Merges global relevance settings.
fn merge_relevance(configs: &[ParsedConfig]) -> RelevanceSettings {
    let mut result = RelevanceSettings::default();

    for raw in lowest_first(configs) {
        if let Some(ref relevance) = raw.relevance {
            apply_raw_relevance(&mut result, relevance);
        }
    }

    result
}

/// Applies raw relevance settings to result.
///
/// A phrase match boost of zero disables phrase matching.
fn apply_raw_relevance(result: &mut RelevanceSettings, raw: &RawRelevanceSettings) {
    if let Some(ref v) = raw.minimum_should_match {
        result.minimum_should_match = v.clone();
    }
    if let Some(v) = raw.tie_breaker {
        result.tie_breaker = v;
    }
    if let Some(v) = raw.phrase_match_boost {
        result.phrase_match_boost = (v > 0).then_some(v);
    }
    if let Some(v) = raw.cutoff_frequency {
        result.cutoff_frequency = v;
    }
    if let Some(v) = raw.fuzziness_enabled {
        result.fuzziness_enabled = v;
    }
    if let Some(ref v) = raw.fuzziness {
        result.fuzziness = v.clone();
    }
    if let Some(v) = raw.fuzziness_prefix_length {
        result.fuzziness_prefix_length = v;
    }
    if let Some(v) = raw.fuzziness_max_expansions {
        result.fuzziness_max_expansions = v;
    }
    if let Some(v) = raw.phonetic_enabled {
        result.phonetic_enabled = v;
    }
}

/// Merges containers by name.
fn merge_containers(
    configs: &[ParsedConfig],
    relevance: &RelevanceSettings,
) -> IndexMap<String, ContainerConfig> {
    let mut result: IndexMap<String, ContainerConfig> = IndexMap::new();

    for raw in lowest_first(configs) {
        let Some(ref containers) = raw.container else {
            continue;
        };
        for (name, container) in containers {
            let entry = result.entry(name.clone()).or_insert_with(|| ContainerConfig {
                relevance: relevance.clone(),
                ..ContainerConfig::new(name.clone())
            });
            apply_raw_container(entry, container);
        }
    }

    result
}

/// Applies a raw container section to result.
fn apply_raw_container(result: &mut ContainerConfig, raw: &RawContainer) {
    if let Some(v) = raw.track_total_hits {
        result.track_total_hits = v;
    }
    if let Some(v) = raw.min_score {
        result.min_score = Some(v);
    }
    if let Some(ref v) = raw.relevance {
        apply_raw_relevance(&mut result.relevance, v);
    }
    if let Some(ref filters) = raw.filters {
        for (field, condition) in filters {
            result.filters.insert(field.clone(), condition.clone());
        }
    }
    if let Some(ref aggregations) = raw.aggregations {
        for (name, definition) in aggregations {
            result.aggregations.insert(name.clone(), definition.clone());
        }
    }
}
