//! Error types for tokenizing and parsing queries.
//!
//! Every failure is a [`ParseError`]: a message, the category it belongs to, and, when the
//! lexer knows it, the byte position in the original query.

use std::{error::Error, fmt};

use thiserror::Error;

/// The category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Malformed input text: literals, brackets, escapes, numeric suffixes.
    Lexical,
    /// Well-formed tokens in an illegal arrangement.
    Structural,
    /// Tokens that cannot be resolved against the analyzer or the clause rules.
    Semantic,
}

impl ParseErrorKind {
    /// Short label used as the prefix of rendered errors.
    fn label(self) -> &'static str {
        match self {
            Self::Lexical => "query syntax error",
            Self::Structural => "query structure error",
            Self::Semantic => "query error",
        }
    }
}

/// A failure to tokenize or parse a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The category of the failure.
    pub kind: ParseErrorKind,
    /// Human readable message.
    pub message: String,
    /// Byte position in the query where the failure was detected.
    pub position: Option<usize>,
    /// The original query string, when known.
    pub query: Option<String>,
}

impl ParseError {
    /// Creates an error of the given kind with no position.
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
            query: None,
        }
    }

    /// Creates a lexical error.
    pub fn lexical(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::Lexical, message)
    }

    /// Creates a structural error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::Structural, message)
    }

    /// Creates a semantic error.
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::new(ParseErrorKind::Semantic, message)
    }

    /// Sets the byte position, keeping an already recorded one.
    pub fn at(mut self, position: usize) -> Self {
        self.position.get_or_insert(position);
        self
    }

    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        let message = self.message.as_str();
        match self.kind {
            ParseErrorKind::Lexical if message.contains("unclosed '\"'") => {
                Some("Add a closing quote (\") to complete the phrase")
            }
            ParseErrorKind::Lexical if message.contains("negative boost") => {
                Some("Boosts must be zero or greater, e.g. 'term^0.5'")
            }
            ParseErrorKind::Structural if message.contains("adjacent boolean operators") => {
                Some("AND and OR need terms on both sides, e.g. 'cat OR dog'")
            }
            ParseErrorKind::Structural if message.contains("leading wildcard") => {
                Some("Escape the wildcard (\\*) or enable allow_leading_wildcard")
            }
            ParseErrorKind::Semantic if message.contains("unknown field") => {
                Some("Define the field under [fields.<name>] in .spanq.toml")
            }
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)?;

        if let Some(query) = &self.query {
            write!(f, "\n  {query}")?;
            if let Some(pos) = self.position {
                let column = query
                    .char_indices()
                    .take_while(|&(index, _)| index < pos)
                    .count();
                write!(f, "\n  {}^", " ".repeat(column))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "\nhint: {suggestion}")?;
        }

        Ok(())
    }
}

impl Error for ParseError {}

/// A failure reported by an [`Analyzer`](crate::Analyzer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// No analyzer is registered for the field.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Multiterm normalization produced no token.
    #[error("no component found in multiterm '{text}' for field '{field}'")]
    EmptyMultiterm {
        /// Field being analyzed.
        field: String,
        /// Text that analyzed to nothing.
        text: String,
    },

    /// Multiterm normalization produced more than one token.
    #[error("found more than one component in a multiterm: '{text}' analyzed to {components:?}")]
    MultitermComponents {
        /// Text that was split.
        text: String,
        /// The tokens it was split into.
        components: Vec<String>,
    },
}

impl From<AnalysisError> for ParseError {
    fn from(err: AnalysisError) -> Self {
        Self::semantic(err.to_string())
    }
}
