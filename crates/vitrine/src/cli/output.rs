//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use vitrine_mapping::{Analyzer, Field};

/// Prints a value as JSON, pretty unless `compact`.
pub fn print_json<T: Serialize>(value: &T, compact: bool) -> ExitCode {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the field listing table.
///
/// One row per field: its type, nested path, usage flags and the physical
/// property of each analyzer variant.
pub fn field_table(fields: &[Field]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Field", "Type", "Nested", "Usage", "Weight", "Properties"]);

    for field in fields {
        table.add_row(vec![
            Cell::new(field.name()),
            Cell::new(field.field_type().to_string()),
            Cell::new(field.nested_path().unwrap_or("-")),
            Cell::new(usage_flags(field)),
            Cell::new(field.search_weight().to_string()),
            Cell::new(properties(field).join("\n")),
        ]);
    }

    table
}

/// Short usage flags of a field, e.g. `search,filter`.
pub fn usage_flags(field: &Field) -> String {
    let flags = [
        (field.is_searchable(), "search"),
        (field.is_filterable(), "filter"),
        (field.is_used_for_sort_by(), "sort"),
        (field.is_used_in_spellcheck(), "spellcheck"),
        (field.is_used_in_autocomplete(), "autocomplete"),
    ];
    let used: Vec<&str> = flags
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, name)| *name)
        .collect();
    if used.is_empty() {
        "-".to_string()
    } else {
        used.join(",")
    }
}

/// Physical property of each analyzer variant of a field.
fn properties(field: &Field) -> Vec<String> {
    let analyzers = field.analyzers();
    if analyzers.is_empty() {
        return vec![field.name().to_string()];
    }
    analyzers
        .into_iter()
        .filter_map(|analyzer| property_line(field, analyzer))
        .collect()
}

/// Formats `property (analyzer)`.
fn property_line(field: &Field, analyzer: Analyzer) -> Option<String> {
    field
        .mapping_property(Some(analyzer))
        .map(|property| format!("{property} ({analyzer})"))
}
