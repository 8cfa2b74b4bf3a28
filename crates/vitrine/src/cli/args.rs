//! Clap argument definitions for the `vitrine` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use vitrine_aggregation::FilterCondition;
use vitrine_mapping::SortDirection;
use vitrine_request::{SortSpec, SpellingType};

/// Parse a `FIELD=VALUE` filter.
///
/// The value is read as JSON when it parses (`[1,2]`, `{"gte":10}`, `4`),
/// and as a plain string otherwise.
fn parse_filter(s: &str) -> Result<(String, FilterCondition), String> {
    let (field, raw) = split_pair(s)?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    let condition = FilterCondition::from_value(value)?;
    Ok((field.to_string(), condition))
}

/// Parse a `FIELD[:asc|desc]` sort.
fn parse_sort(s: &str) -> Result<SortSpec, String> {
    let (field, direction) = match s.rsplit_once(':') {
        Some((field, "asc")) => (field, SortDirection::Asc),
        Some((field, "desc")) => (field, SortDirection::Desc),
        Some((_, other)) => return Err(format!("invalid sort direction '{other}'")),
        None => (s, SortDirection::Asc),
    };
    if field.is_empty() {
        return Err("sort field cannot be empty".to_string());
    }
    Ok(SortSpec::new(field, direction))
}

/// Parse a `NAME=VALUE` dimension.
fn parse_dimension(s: &str) -> Result<(String, String), String> {
    let (name, value) = split_pair(s)?;
    Ok((name.to_string(), value.to_string()))
}

/// Splits `KEY=VALUE` at the first `=`.
fn split_pair(s: &str) -> Result<(&str, &str), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Storefront search request compiler")]
pub struct Cli {
    /// Configuration files, highest precedence first
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Vec<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported `vitrine` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Compile the search request of a container
    Compile(CompileCommand),

    /// Show declared fields and their physical properties
    Mapping(MappingCommand),

    /// Validate configuration and diagnose issues
    Check(CheckCommand),
}

/// Spelling type of the fulltext query.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SpellingArg {
    /// Exact matching
    Exact,
    /// Misspelling-tolerant matching
    Fuzzy,
    /// Misspelling-tolerant matching, every term misspelled
    MostFuzzy,
}

impl From<SpellingArg> for SpellingType {
    fn from(arg: SpellingArg) -> Self {
        match arg {
            SpellingArg::Exact => Self::Exact,
            SpellingArg::Fuzzy => Self::Fuzzy,
            SpellingArg::MostFuzzy => Self::MostFuzzy,
        }
    }
}

/// Arguments for `vitrine compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileCommand {
    /// Container to compile the request for
    pub container: String,

    /// Search parameters as a JSON file; flags below override it
    #[arg(short = 'p', long)]
    pub params: Option<PathBuf>,

    /// Free-text query
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Filter as FIELD=VALUE, VALUE being JSON or a string (repeatable)
    #[arg(short = 'f', long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, FilterCondition)>,

    /// Sort as FIELD[:asc|desc] (repeatable)
    #[arg(short = 's', long = "sort", value_parser = parse_sort)]
    pub sorts: Vec<SortSpec>,

    /// Offset of the first hit [default: 0]
    #[arg(long)]
    pub from: Option<i64>,

    /// Page size; 0 computes counts and facets only [default: 10]
    #[arg(short = 'n', long)]
    pub size: Option<i64>,

    /// Spelling type of the fulltext query [default: exact]
    #[arg(long, value_enum)]
    pub spelling: Option<SpellingArg>,

    /// Scope dimension as NAME=VALUE (repeatable)
    #[arg(short = 'd', long = "dimension", value_parser = parse_dimension)]
    pub dimensions: Vec<(String, String)>,

    /// Minimum relevance score
    #[arg(long)]
    pub min_score: Option<f32>,

    /// Print the request fingerprint instead of the body
    #[arg(long)]
    pub fingerprint: bool,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for `vitrine mapping`.
#[derive(Args, Debug, Clone, Default)]
pub struct MappingCommand {
    /// Print the wire mapping properties as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `vitrine check`.
#[derive(Args, Debug, Clone, Default)]
pub struct CheckCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
