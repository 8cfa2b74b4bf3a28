//! Command implementations and dispatch.

pub mod check;
pub mod compile;
pub mod mapping;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Compile(cmd) => compile::run(ctx, &cmd),
        Commands::Mapping(cmd) => mapping::run(ctx, &cmd),
        Commands::Check(cmd) => check::run(ctx, &cmd),
    }
}
