//! Command implementations and dispatch.

pub mod check;
pub mod config;
pub mod parse;
pub mod tokens;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands) -> ExitCode {
    match command {
        Commands::Tokens(cmd) => tokens::run(&cmd),
        Commands::Parse(cmd) => with_context(|ctx| parse::run(ctx, &cmd)),
        Commands::Config => with_context(config::run),
        Commands::Check => with_context(check::run),
    }
}

/// Loads the command context and runs `command` with it.
fn with_context(command: impl FnOnce(&CommandContext) -> ExitCode) -> ExitCode {
    match CommandContext::load() {
        Ok(ctx) => command(&ctx),
        Err(code) => code,
    }
}
