//! Implementation of `vitrine mapping`.

use std::process::ExitCode;

use crate::cli::{
    args::MappingCommand,
    context::CommandContext,
    output::{field_table, print_json},
};

/// Lists declared fields, or prints the wire mapping properties.
pub fn run(ctx: &CommandContext, cmd: &MappingCommand) -> ExitCode {
    let mapping = &ctx.config.mapping;

    if cmd.json {
        return print_json(&mapping.properties(), false);
    }

    println!("Index: {}", ctx.config.index.name);
    println!("{}", field_table(mapping.fields()));
    ExitCode::SUCCESS
}
