//! The analyzer collaborator consulted while building leaf nodes.

use std::sync::Arc;

use crate::error::AnalysisError;

/// Normalizes query text for a field.
///
/// Implementations map field names to their text pipelines. The parser never inspects an index;
/// everything it knows about a field comes through this trait.
pub trait Analyzer: Send + Sync {
    /// Runs the full analysis chain over a plain term.
    ///
    /// An empty result marks a stop word. More than one token means the term expands into a
    /// sequence of sub-terms.
    fn whole_term(&self, field: &str, text: &str) -> Result<Vec<String>, AnalysisError>;

    /// Normalizes the text of a wildcard, prefix, fuzzy, regex, literal, or range bound.
    ///
    /// The result must be a single token. The default passes the text through unmodified.
    fn multiterm(&self, field: &str, text: &str) -> Result<String, AnalysisError> {
        let _ = field;
        Ok(text.to_string())
    }
}

impl<A: Analyzer + ?Sized> Analyzer for &A {
    fn whole_term(&self, field: &str, text: &str) -> Result<Vec<String>, AnalysisError> {
        (**self).whole_term(field, text)
    }

    fn multiterm(&self, field: &str, text: &str) -> Result<String, AnalysisError> {
        (**self).multiterm(field, text)
    }
}

impl<A: Analyzer + ?Sized> Analyzer for Arc<A> {
    fn whole_term(&self, field: &str, text: &str) -> Result<Vec<String>, AnalysisError> {
        (**self).whole_term(field, text)
    }

    fn multiterm(&self, field: &str, text: &str) -> Result<String, AnalysisError> {
        (**self).multiterm(field, text)
    }
}

/// Accepts every field and leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughAnalyzer;

impl Analyzer for PassThroughAnalyzer {
    fn whole_term(&self, _field: &str, text: &str) -> Result<Vec<String>, AnalysisError> {
        Ok(vec![text.to_string()])
    }
}

/// Checks that a multiterm pipeline produced exactly one component.
pub fn single_component(
    field: &str,
    text: &str,
    mut components: Vec<String>,
) -> Result<String, AnalysisError> {
    match components.len() {
        0 => Err(AnalysisError::EmptyMultiterm {
            field: field.to_string(),
            text: text.to_string(),
        }),
        1 => Ok(components.remove(0)),
        _ => Err(AnalysisError::MultitermComponents {
            text: text.to_string(),
            components,
        }),
    }
}
