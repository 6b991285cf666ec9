//! Command-line interface for the `spanq` query inspector.

use std::process::ExitCode;

use clap::Parser;
use spanq::cli::{args::Cli, commands, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    commands::run(cli.command)
}
