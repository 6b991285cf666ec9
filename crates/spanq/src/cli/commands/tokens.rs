//! Implementation of `spanq tokens`.

use std::process::ExitCode;

use spanq_query::tokenize;

use crate::cli::{
    args::TokensCommand,
    output::{tokens_json, tokens_table},
};

/// Prints the token sequence of a query.
pub fn run(cmd: &TokensCommand) -> ExitCode {
    let tokens = match tokenize(&cmd.query) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        match tokens_json(&tokens) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize tokens: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", tokens_table(&tokens));
    }

    ExitCode::SUCCESS
}
