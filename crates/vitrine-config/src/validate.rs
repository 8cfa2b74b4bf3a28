//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.
//! None of these stop a request from compiling: unknown fields degrade to
//! their raw name, and unknown types fail only when the container is used.

use std::fmt;

use indexmap::IndexMap;
use tracing::warn;
use vitrine_aggregation::{BucketDefinition, BucketType, MetricType, PipelineType};
use vitrine_mapping::Mapping;

use crate::{Config, ContainerConfig};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// No containers are defined.
    NoContainersDefined,
    /// A container filter names an undeclared field.
    FilterOnUnknownField {
        /// Name of the container.
        container: String,
        /// Filtered field.
        field: String,
    },
    /// A container filter names a field that is not filterable.
    FilterOnNonFilterableField {
        /// Name of the container.
        container: String,
        /// Filtered field.
        field: String,
    },
    /// An aggregation names an undeclared field.
    AggregationOnUnknownField {
        /// Name of the container.
        container: String,
        /// Name of the aggregation.
        aggregation: String,
        /// Aggregated field.
        field: String,
    },
    /// An aggregation has an unknown bucket type.
    UnsupportedBucketType {
        /// Name of the container.
        container: String,
        /// Name of the aggregation.
        aggregation: String,
        /// The unknown type.
        bucket_type: String,
    },
    /// A metric has an unknown type.
    UnsupportedMetricType {
        /// Name of the container.
        container: String,
        /// Name of the metric.
        metric: String,
        /// The unknown type.
        metric_type: String,
    },
    /// A pipeline has an unknown type.
    UnsupportedPipelineType {
        /// Name of the container.
        container: String,
        /// Name of the pipeline.
        pipeline: String,
        /// The unknown type.
        pipeline_type: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContainersDefined => {
                write!(f, "no containers are defined in configuration")
            }
            Self::FilterOnUnknownField { container, field } => {
                write!(f, "container '{container}' filters on undeclared field '{field}'")
            }
            Self::FilterOnNonFilterableField { container, field } => {
                write!(
                    f,
                    "container '{container}' filters on field '{field}' which is not filterable"
                )
            }
            Self::AggregationOnUnknownField {
                container,
                aggregation,
                field,
            } => {
                write!(
                    f,
                    "aggregation '{aggregation}' in container '{container}' uses undeclared field '{field}'"
                )
            }
            Self::UnsupportedBucketType {
                container,
                aggregation,
                bucket_type,
            } => {
                write!(
                    f,
                    "aggregation '{aggregation}' in container '{container}' has unknown type '{bucket_type}'"
                )
            }
            Self::UnsupportedMetricType {
                container,
                metric,
                metric_type,
            } => {
                write!(
                    f,
                    "metric '{metric}' in container '{container}' has unknown type '{metric_type}'"
                )
            }
            Self::UnsupportedPipelineType {
                container,
                pipeline,
                pipeline_type,
            } => {
                write!(
                    f,
                    "pipeline '{pipeline}' in container '{container}' has unknown type '{pipeline_type}'"
                )
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
///
/// Every warning is also emitted as a `warn!` event.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.containers.is_empty() {
        warnings.push(ConfigWarning::NoContainersDefined);
    }

    for container in config.containers.values() {
        warnings.extend(validate_container(&config.mapping, container));
    }

    for warning in &warnings {
        warn!("{warning}");
    }

    warnings
}

/// Validates the filters and aggregations of one container.
fn validate_container(mapping: &Mapping, container: &ContainerConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    for field in container.filters.keys() {
        match mapping.field(field) {
            Ok(declared) if !declared.is_filterable() => {
                warnings.push(ConfigWarning::FilterOnNonFilterableField {
                    container: container.name.clone(),
                    field: field.clone(),
                });
            }
            Ok(_) => {}
            Err(_) => warnings.push(ConfigWarning::FilterOnUnknownField {
                container: container.name.clone(),
                field: field.clone(),
            }),
        }
    }

    validate_aggregations(mapping, &container.name, &container.aggregations, &mut warnings);
    warnings
}

/// Validates aggregation definitions recursively.
fn validate_aggregations(
    mapping: &Mapping,
    container: &str,
    definitions: &IndexMap<String, BucketDefinition>,
    warnings: &mut Vec<ConfigWarning>,
) {
    for (name, definition) in definitions {
        if definition.bucket_type.parse::<BucketType>().is_err() {
            warnings.push(ConfigWarning::UnsupportedBucketType {
                container: container.to_string(),
                aggregation: name.clone(),
                bucket_type: definition.bucket_type.clone(),
            });
        }

        if let Some(ref field) = definition.field
            && !mapping.has_field(field)
        {
            warnings.push(ConfigWarning::AggregationOnUnknownField {
                container: container.to_string(),
                aggregation: name.clone(),
                field: field.clone(),
            });
        }

        if let Some(ref metric_type) = definition.metric_type
            && metric_type.parse::<MetricType>().is_err()
        {
            warnings.push(ConfigWarning::UnsupportedMetricType {
                container: container.to_string(),
                metric: name.clone(),
                metric_type: metric_type.clone(),
            });
        }

        for (metric, metric_definition) in &definition.metrics {
            if metric_definition.metric_type.parse::<MetricType>().is_err() {
                warnings.push(ConfigWarning::UnsupportedMetricType {
                    container: container.to_string(),
                    metric: metric.clone(),
                    metric_type: metric_definition.metric_type.clone(),
                });
            }
        }

        for (pipeline, pipeline_definition) in &definition.pipelines {
            if pipeline_definition.pipeline_type.parse::<PipelineType>().is_err() {
                warnings.push(ConfigWarning::UnsupportedPipelineType {
                    container: container.to_string(),
                    pipeline: pipeline.clone(),
                    pipeline_type: pipeline_definition.pipeline_type.clone(),
                });
            }
        }

        validate_aggregations(mapping, container, &definition.child_buckets, warnings);
    }
}
