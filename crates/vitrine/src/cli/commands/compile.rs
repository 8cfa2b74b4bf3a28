//! Implementation of `vitrine compile`.

use std::{fs, path::Path, process::ExitCode};

use tracing::debug;
use vitrine_aggregation::MemoryAggregationCache;
use vitrine_request::{RequestAssembler, SearchParams, render_request};

use crate::cli::{args::CompileCommand, context::CommandContext, output::print_json};

/// Compiles and prints the request of one search call.
pub fn run(ctx: &CommandContext, cmd: &CompileCommand) -> ExitCode {
    let params = match build_params(cmd) {
        Ok(params) => params,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cache = MemoryAggregationCache::default();
    let assembler = RequestAssembler::new(&ctx.config, &cache);
    let request = match assembler.assemble(&cmd.container, &params) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    debug!(
        container = %cmd.container,
        index = request.index_name(),
        count_only = request.is_count_only(),
        "compiled request"
    );

    if cmd.fingerprint {
        println!("{}", request.fingerprint());
        return ExitCode::SUCCESS;
    }

    print_json(&render_request(&request), cmd.compact)
}

/// Builds search parameters from the params file, then the flags.
fn build_params(cmd: &CompileCommand) -> Result<SearchParams, String> {
    let mut params = match &cmd.params {
        Some(path) => read_params(path)?,
        None => SearchParams::new(),
    };

    if let Some(query) = &cmd.query {
        params = params.with_query_text(query.clone());
    }
    for (field, condition) in &cmd.filters {
        params = params.with_filter(field.clone(), condition.clone());
    }
    for sort in &cmd.sorts {
        params = params.with_sort(sort.clone());
    }
    if cmd.from.is_some() || cmd.size.is_some() {
        let from = cmd.from.unwrap_or(params.from);
        let size = cmd.size.unwrap_or(params.size);
        params = params.with_page(from, size);
    }
    if let Some(spelling) = cmd.spelling {
        params = params.with_spelling_type(spelling.into());
    }
    for (name, value) in &cmd.dimensions {
        params = params.with_dimension(name.clone(), value.clone());
    }
    if let Some(min_score) = cmd.min_score {
        params = params.with_min_score(min_score);
    }

    Ok(params)
}

/// Reads search parameters from a JSON file.
fn read_params(path: &Path) -> Result<SearchParams, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("invalid search parameters in {}: {e}", path.display()))
}
