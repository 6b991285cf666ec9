//! Implementation of `spanq parse`.

use std::process::ExitCode;

use spanq_analysis::FieldAnalyzers;
use spanq_query::QueryParser;
use tracing::debug;

use crate::cli::{
    args::{ParseCommand, TreeFormat},
    context::CommandContext,
};

/// Parses a query with the configured analyzers and prints the tree.
pub fn run(ctx: &CommandContext, cmd: &ParseCommand) -> ExitCode {
    let config = &ctx.config;
    let analyzers = match FieldAnalyzers::from_config(config) {
        Ok(analyzers) => analyzers,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let field = cmd
        .field
        .as_deref()
        .unwrap_or(&config.parser.default_field);
    debug!(field, cwd = %ctx.cwd.display(), "parsing with configured analyzers");

    let parser = QueryParser::new(config.parser_config().clone(), analyzers);
    let node = match parser.parse(&cmd.query, field) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match cmd.mode() {
        TreeFormat::Tree => print!("{node}"),
        TreeFormat::QueryString => println!("{}", node.to_query_string(field)),
        TreeFormat::Json => match serde_json::to_string_pretty(&node) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize tree: {e}");
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}
