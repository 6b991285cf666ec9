//! Tantivy-backed text analysis for spanq.
//!
//! [`FieldAnalyzers`] implements the query parser's [`Analyzer`](spanq_query::Analyzer) trait
//! with one tantivy pipeline per configured field, so query terms are normalized the same way
//! the indexed text is.

#![warn(missing_docs)]

mod analyzer;
mod error;
mod language;

pub use analyzer::FieldAnalyzers;
pub use error::AnalyzerError;
pub use language::parse_language;
