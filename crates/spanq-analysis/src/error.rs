//! Error types for the spanq-analysis crate.

use thiserror::Error;

/// Errors that can occur while building field analyzers.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A field names a stemmer language tantivy does not support.
    #[error("unsupported stemmer language for field '{field}': {language}")]
    InvalidLanguage {
        /// Field whose settings name the language.
        field: String,
        /// The unsupported language name.
        language: String,
    },
}
