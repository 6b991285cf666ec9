//! Clap argument definitions for the `spanq` CLI.

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "spanq")]
#[command(about = "Inspect how proximity queries are tokenized and parsed")]
pub struct Cli {
    /// Verbosity level (-v for debug logs, -vv for trace logs)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported `spanq` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the token sequence of a query
    Tokens(TokensCommand),

    /// Parse a query and print the resulting tree
    Parse(ParseCommand),

    /// Show the effective configuration
    Config,

    /// Validate configuration and report warnings
    Check,
}

/// Arguments for `spanq tokens`.
#[derive(Args, Debug, Clone)]
pub struct TokensCommand {
    /// Query to tokenize
    pub query: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `spanq parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query to parse
    pub query: String,

    /// Field for terms without a field prefix [default: from config]
    #[arg(short = 'f', long)]
    pub field: Option<String>,

    /// Output in JSON format
    #[arg(long, conflicts_with = "query_string")]
    pub json: bool,

    /// Print the tree back as a query string
    #[arg(long)]
    pub query_string: bool,
}

impl ParseCommand {
    /// The requested output form.
    pub fn mode(&self) -> TreeFormat {
        if self.json {
            TreeFormat::Json
        } else if self.query_string {
            TreeFormat::QueryString
        } else {
            TreeFormat::Tree
        }
    }
}

/// How `spanq parse` prints a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    /// Indented tree.
    Tree,
    /// Tagged JSON.
    Json,
    /// Query language text.
    QueryString,
}
