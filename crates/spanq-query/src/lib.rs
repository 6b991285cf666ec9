//! Lexer and parser for the spanq proximity query language.
//!
//! Queries compile to a [`QueryNode`] tree for a span-aware search engine:
//!
//! - **Terms**: `rust`, escaped syntax `c\+\+`, literals `'a (b)'`
//! - **Booleans**: `a AND b`, `a OR b`, `NOT a`, `+required -prohibited`
//! - **Groups**: `(a b c)`, minimum-should-match `(a b c)~2`
//! - **Fields**: `title:guide`, `title:(a b)`, match-all `*:*`
//! - **Phrases and near clauses**: `"a b"`, `"a b"~3`, `[a b]~>3`, nested `[[a b]~3 c]~>4`
//! - **Span alternatives**: `[a (b c)]~2`
//! - **Not-near**: `"fever bieber"!~3,5`
//! - **Multiterms**: `fev*`, `f?ver`, `fever~1,2`, `fever~>1`, `/fe.*r/`
//! - **Ranges**: `[abc TO def]`, `{abc TO *]`
//! - **Boosts and positions**: `rust^2.5`, `bieber@1..5`
//!
//! Field text is normalized through an [`Analyzer`]; [`PassThroughAnalyzer`] leaves it as is.
//!
//! # Example
//!
//! ```
//! use spanq_query::{ParserConfig, PassThroughAnalyzer, QueryNode, QueryParser};
//!
//! let parser = QueryParser::new(ParserConfig::default(), PassThroughAnalyzer);
//! let node = parser.parse("\"fever bieber\"~2", "body").unwrap();
//! assert!(matches!(node, QueryNode::SpanNear { slop: 2, .. }));
//! ```

#![warn(missing_docs)]

mod analysis;
mod ast;
mod clause;
mod config;
mod error;
mod lexer;
mod occur;
mod parser;
mod span;
mod suffix;
mod token;

pub use analysis::{Analyzer, PassThroughAnalyzer, single_component};
pub use ast::{BooleanClause, Occur, QueryNode};
pub use clause::{Resolution, resolve_clause};
pub use config::{
    DEFAULT_MAX_NEAR_DISTANCE, DEFAULT_MAX_NOT_NEAR_DISTANCE, DefaultOperator, ParserConfig,
};
pub use error::{AnalysisError, ParseError, ParseErrorKind};
pub use lexer::tokenize;
pub use occur::{Conjunction, Modifier, add_clause};
pub use parser::{QueryParser, parse};
pub use suffix::{Suffix, Tilde, escape, parse_suffix, unescape};
pub use token::{
    Annotation, BooleanOp, Clause, ClauseKind, Delimiter, OpenMarker, PositionRange, Token,
    count_children,
};
