//! Implementation of `spanq check`.

use std::process::ExitCode;

use spanq_config::{ConfigWarning, STEMMER_LANGUAGES, discover_config_files};

use crate::cli::context::CommandContext;

/// Reports discovered config files and configuration warnings.
///
/// Load failures exit before this runs; warnings alone do not fail the command.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let config_files = discover_config_files(&ctx.cwd);

    if config_files.is_empty() {
        println!("No configuration files found; using defaults.");
    } else {
        println!("Config files (highest precedence first):");
        for path in &config_files {
            println!("  {}", path.display());
        }
    }
    println!();

    println!("Fields:");
    for (name, field) in &ctx.config.fields {
        let stemmer = field.stemmer.as_deref().unwrap_or("none");
        println!(
            "  {name} (stemmer: {stemmer}, stop words: {})",
            field.stop_words.len()
        );
    }
    println!();

    let warnings = ctx.config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("Warnings ({}):", warnings.len());
    for warning in &warnings {
        println!("  - {warning}");
    }
    println!();
    print_hints(&warnings);

    ExitCode::SUCCESS
}

/// Prints hints for resolving the reported warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<String> = warnings
        .iter()
        .map(|warning| match warning {
            ConfigWarning::DefaultFieldUndefined { field } => {
                format!("Add a [fields.{field}] section or change default_field.")
            }
            ConfigWarning::UnknownStemmer { .. } => {
                format!("Supported stemmers: {}.", STEMMER_LANGUAGES.join(", "))
            }
            ConfigWarning::PhraseSlopExceedsMaxNear { .. } => {
                "Lower phrase_slop or raise max_near_distance.".to_string()
            }
            ConfigWarning::ZeroMaxTokenLength { .. } => {
                "Set max_token_length to at least 1.".to_string()
            }
        })
        .collect();

    hints.sort_unstable();
    hints.dedup();

    println!("Hints:");
    for hint in hints {
        println!("  - {hint}");
    }
}
