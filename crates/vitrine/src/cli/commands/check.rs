//! Implementation of `vitrine check`.

use std::process::ExitCode;

use serde::Serialize;
use vitrine_config::ConfigWarning;

use crate::cli::{args::CheckCommand, context::CommandContext};

/// Exit codes for `vitrine check`.
mod exit_codes {
    use std::process::ExitCode;

    /// Configuration is valid with no warnings.
    pub const OK: ExitCode = ExitCode::SUCCESS;
    /// Configuration has warnings but is usable.
    pub const WARNINGS: ExitCode = ExitCode::FAILURE;
}

/// JSON output of `vitrine check`.
#[derive(Serialize)]
struct JsonCheckOutput {
    /// Configuration files, highest precedence first.
    config_files: Vec<String>,
    /// Index name.
    index: String,
    /// Number of declared fields, the identifier included.
    fields: usize,
    /// Container names.
    containers: Vec<String>,
    /// Validation warnings.
    warnings: Vec<String>,
}

/// Validates the configuration and reports warnings.
pub fn run(ctx: &CommandContext, cmd: &CheckCommand) -> ExitCode {
    let config = &ctx.config;
    let warnings = config.validate();
    let code = if warnings.is_empty() {
        exit_codes::OK
    } else {
        exit_codes::WARNINGS
    };

    if cmd.json {
        let output = JsonCheckOutput {
            config_files: ctx
                .config_files
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
            index: config.index.name.clone(),
            fields: config.mapping.fields().len(),
            containers: config.containers.keys().cloned().collect(),
            warnings: warnings.iter().map(ToString::to_string).collect(),
        };
        return match serde_json::to_string_pretty(&output) {
            Ok(json) => {
                println!("{json}");
                code
            }
            Err(e) => {
                eprintln!("error: failed to serialize JSON: {e}");
                ExitCode::FAILURE
            }
        };
    }

    println!("Checking configuration...");
    println!();

    println!("Config files:");
    for path in &ctx.config_files {
        println!("  {}", path.display());
    }
    println!();

    println!("Index: {}", config.index.name);
    println!("Fields: {}", config.mapping.fields().len());
    println!();

    println!("Containers:");
    if config.containers.is_empty() {
        println!("  (none defined)");
    } else {
        for container in config.containers.values() {
            println!(
                "  {} ({} filters, {} aggregations)",
                container.name,
                container.filters.len(),
                container.aggregations.len()
            );
        }
    }
    println!();

    if warnings.is_empty() {
        println!("No issues found.");
        return code;
    }

    println!("Warnings ({}):", warnings.len());
    for warning in &warnings {
        println!("  - {warning}");
    }
    println!();

    print_hints(&warnings);

    code
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings.iter().map(hint).collect();
    hints.sort_unstable();
    hints.dedup();

    println!("Hints:");
    for hint in hints {
        println!("  - {hint}");
    }
}

/// Hint for one warning.
fn hint(warning: &ConfigWarning) -> &'static str {
    match warning {
        ConfigWarning::NoContainersDefined => {
            "Add a [container.<name>] section to define a search container."
        }
        ConfigWarning::FilterOnUnknownField { .. }
        | ConfigWarning::AggregationOnUnknownField { .. } => {
            "Declare the field in a [field.<name>] section, or fix its name."
        }
        ConfigWarning::FilterOnNonFilterableField { .. } => {
            "Set filterable = true on fields used by container filters."
        }
        ConfigWarning::UnsupportedBucketType { .. }
        | ConfigWarning::UnsupportedMetricType { .. }
        | ConfigWarning::UnsupportedPipelineType { .. } => {
            "Use one of the supported aggregation types; requests on this container will fail."
        }
    }
}
