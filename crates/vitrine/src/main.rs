//! Command-line interface for the `vitrine` request compiler.

use std::{io, process::ExitCode};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vitrine::cli::{CommandContext, args::Cli, commands};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "VITRINE_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let ctx = match CommandContext::load(cli.config) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    commands::run(cli.command, &ctx)
}

/// Installs the stderr log subscriber, filtered by `VITRINE_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}
