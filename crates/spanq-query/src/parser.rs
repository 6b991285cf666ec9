//! Query parser.
//!
//! Builds a [`QueryNode`] tree from a lexed token sequence by recursive descent over clause
//! ranges.
//!
//! # Structure
//!
//! ```text
//! query   → boolean                         (implicit top-level group)
//! boolean → (modifier? field? operand conjunction?)*
//! operand → terminal | or_clause | span_clause
//! ```
//!
//! Field switches and modifiers apply to the next operand only. Each operand is folded into the
//! enclosing group with [`add_clause`]; near and not-near clauses are handed to the span
//! builder.

use std::ops::Range;

use tracing::{debug, trace};

use crate::{
    analysis::{Analyzer, PassThroughAnalyzer},
    ast::{BooleanClause, Occur, QueryNode},
    config::ParserConfig,
    error::ParseError,
    lexer::tokenize_with_positions,
    occur::{Conjunction, Modifier, add_clause},
    span::SpanBuilder,
    suffix::unescape,
    token::{Annotation, BooleanOp, Clause, ClauseKind, Token},
};

/// Parses queries against a fixed configuration and analyzer.
///
/// The parser holds no per-query state, so a single instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct QueryParser<A> {
    /// Settings read during every parse.
    config: ParserConfig,
    /// Field analysis collaborator.
    analyzer: A,
}

impl<A: Analyzer> QueryParser<A> {
    /// Creates a parser.
    pub fn new(config: ParserConfig, analyzer: A) -> Self {
        Self { config, analyzer }
    }

    /// The parser's configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The parser's analyzer.
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Tokenizes and parses `query`, searching `default_field` where no field is given.
    pub fn parse(&self, query: &str, default_field: &str) -> Result<QueryNode, ParseError> {
        let (tokens, positions) = tokenize_with_positions(query)?;
        debug!(query, tokens = tokens.len(), "tokenized query");
        self.build(&tokens, &positions, default_field)
            .map_err(|err| err.with_query(query))
    }

    /// Parses an already lexed token sequence.
    ///
    /// Errors carry no position, since the tokens are not tied to a query string.
    pub fn parse_tokens(
        &self,
        tokens: &[Token],
        default_field: &str,
    ) -> Result<QueryNode, ParseError> {
        self.build(tokens, &[], default_field)
    }

    /// Builds the tree for `tokens`, locating errors through `positions` where known.
    fn build(
        &self,
        tokens: &[Token],
        positions: &[usize],
        default_field: &str,
    ) -> Result<QueryNode, ParseError> {
        let builder = Builder {
            tokens,
            positions,
            config: &self.config,
            analyzer: &self.analyzer,
        };
        let node = builder.boolean(0..tokens.len(), default_field, None)?;
        let node = require_positive_clause(node);
        trace!(%node, "parsed query");
        Ok(node)
    }
}

/// Parses `query` with the default configuration and no field analysis.
///
/// # Example
///
/// ```
/// use spanq_query::{QueryNode, parse};
///
/// let node = parse("title:rust", "body").unwrap();
/// assert_eq!(
///     node,
///     QueryNode::Term {
///         field: "title".into(),
///         text: "rust".into(),
///     }
/// );
/// ```
pub fn parse(query: &str, default_field: &str) -> Result<QueryNode, ParseError> {
    QueryParser::new(ParserConfig::default(), PassThroughAnalyzer).parse(query, default_field)
}

/// Adds a match-all clause to a top-level group whose clauses are all prohibited.
fn require_positive_clause(node: QueryNode) -> QueryNode {
    match node {
        QueryNode::BooleanGroup {
            mut clauses,
            minimum_should_match,
        } if !clauses.is_empty() && clauses.iter().all(|c| c.occur == Occur::MustNot) => {
            debug!(
                clauses = clauses.len(),
                "all clauses prohibited, adding match-all clause"
            );
            clauses.push(BooleanClause::new(Occur::Must, QueryNode::AllDocs));
            QueryNode::BooleanGroup {
                clauses,
                minimum_should_match,
            }
        }
        other => other,
    }
}

/// A terminal after analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    /// A single node; [`QueryNode::Empty`] for stop words.
    Node(QueryNode),
    /// A term the analyzer split into several tokens.
    Expanded {
        /// The sub-terms, in order.
        terms: Vec<String>,
        /// Boost and position range of the original term.
        annotation: Annotation,
    },
}

impl Leaf {
    /// Whether the leaf contributes nothing.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Node(node) if node.is_empty())
    }

    /// Converts the leaf into a node, turning an expansion into an exact in-order phrase.
    pub fn into_phrase(self, field: &str) -> QueryNode {
        match self {
            Self::Node(node) => node,
            Self::Expanded { terms, annotation } => QueryNode::SpanNear {
                children: term_nodes(terms, field),
                slop: 0,
                in_order: true,
            }
            .annotated(&annotation),
        }
    }
}

/// Term nodes for each sub-term of an expansion.
pub fn term_nodes(terms: Vec<String>, field: &str) -> Vec<QueryNode> {
    terms
        .into_iter()
        .map(|text| QueryNode::Term {
            field: field.to_string(),
            text,
        })
        .collect()
}

/// Per-parse view over the token sequence.
pub struct Builder<'a, A> {
    /// The full token sequence.
    pub tokens: &'a [Token],
    /// Query byte position of each token; empty when unknown.
    pub positions: &'a [usize],
    /// Parser settings.
    pub config: &'a ParserConfig,
    /// Field analysis collaborator.
    pub analyzer: &'a A,
}

impl<A: Analyzer> Builder<'_, A> {
    /// Resolves the tokens in `range` as a boolean group searching `field` by default.
    pub fn boolean(
        &self,
        range: Range<usize>,
        field: &str,
        minimum_should_match: Option<u32>,
    ) -> Result<QueryNode, ParseError> {
        let tokens = self.tokens;
        let mut clauses = Vec::new();
        let mut conjunction = Conjunction::None;
        let mut modifier = Modifier::None;
        let mut current_field: Option<&str> = None;
        let mut index = range.start;

        while index < range.end {
            let at = index;
            let token = &tokens[index];
            index += 1;

            let node = match token {
                Token::Boolean(op) => {
                    match op {
                        BooleanOp::And => conjunction = Conjunction::And,
                        BooleanOp::Or => conjunction = Conjunction::Or,
                        BooleanOp::Not => modifier = Modifier::Not,
                        BooleanOp::Required => modifier = Modifier::Required,
                    }
                    continue;
                }
                Token::Field(name) => {
                    current_field = Some(name.as_str());
                    continue;
                }
                Token::Clause(clause) => {
                    index = self.clause_end(clause, at, &range)?;
                    self.clause(clause, current_field.unwrap_or(field))
                        .map_err(|err| self.locate(err, at))?
                }
                terminal => {
                    let field = current_field.unwrap_or(field);
                    let leaf = self
                        .leaf(terminal, field)
                        .map_err(|err| self.locate(err, at))?;
                    self.boolean_leaf(leaf, field)
                }
            };

            add_clause(
                &mut clauses,
                self.config.default_operator,
                conjunction,
                modifier,
                node,
            )
            .map_err(|err| self.locate(err, at))?;
            conjunction = Conjunction::None;
            modifier = Modifier::None;
            current_field = None;
        }

        Ok(match clauses.len() {
            0 => QueryNode::Empty,
            1 if clauses[0].occur != Occur::MustNot => clauses.remove(0).query,
            _ => QueryNode::BooleanGroup {
                clauses,
                minimum_should_match,
            },
        })
    }

    /// Attaches the query position of the token at `index`, when known.
    pub fn locate(&self, err: ParseError, index: usize) -> ParseError {
        match self.positions.get(index) {
            Some(&position) => err.at(position),
            None => err,
        }
    }

    /// Checks that the clause token at `index` owns a range nested in `enclosing`, returning
    /// the index just past it.
    pub fn clause_end(
        &self,
        clause: &Clause,
        index: usize,
        enclosing: &Range<usize>,
    ) -> Result<usize, ParseError> {
        if clause.start != index + 1 || clause.end < clause.start || clause.end > enclosing.end {
            let err = ParseError::structural(format!(
                "clause at token {index} owns invalid range {}..{}",
                clause.start, clause.end
            ));
            return Err(self.locate(err, index));
        }
        Ok(clause.end)
    }

    /// Resolves a closed clause and applies its annotation.
    pub fn clause(&self, clause: &Clause, field: &str) -> Result<QueryNode, ParseError> {
        let node = match clause.kind {
            ClauseKind::Or {
                minimum_should_match,
            } => self.boolean(clause.range(), field, minimum_should_match)?,
            ClauseKind::Near { .. } | ClauseKind::NotNear { .. } => {
                SpanBuilder::new(self).clause(clause, field)?
            }
        };
        Ok(node.annotated(&clause.annotation))
    }

    /// Turns an expanded term into a phrase or an OR group, as configured.
    fn boolean_leaf(&self, leaf: Leaf, field: &str) -> QueryNode {
        match leaf {
            Leaf::Node(node) => node,
            expanded if self.config.auto_generate_phrase_queries => expanded.into_phrase(field),
            Leaf::Expanded { terms, annotation } => QueryNode::BooleanGroup {
                clauses: term_nodes(terms, field)
                    .into_iter()
                    .map(|term| BooleanClause::new(Occur::Should, term))
                    .collect(),
                minimum_should_match: None,
            }
            .annotated(&annotation),
        }
    }

    /// Analyzes a terminal token for `field`.
    pub fn leaf(&self, token: &Token, field: &str) -> Result<Leaf, ParseError> {
        let field_name = field.to_string();
        let node = match token {
            Token::Term {
                text,
                quoted: false,
                annotation,
            } => {
                let mut terms = self.analyzer.whole_term(field, &unescape(text))?;
                match terms.len() {
                    0 => {
                        trace!(field, text = %text, "dropped stop word");
                        QueryNode::Empty
                    }
                    1 => QueryNode::Term {
                        field: field_name,
                        text: terms.remove(0),
                    }
                    .annotated(annotation),
                    _ => {
                        trace!(field, text = %text, ?terms, "term expanded");
                        return Ok(Leaf::Expanded {
                            terms,
                            annotation: *annotation,
                        });
                    }
                }
            }
            Token::Term {
                text,
                quoted: true,
                annotation,
            } => QueryNode::Term {
                field: field_name,
                text: self.analyzer.multiterm(field, text)?,
            }
            .annotated(annotation),
            Token::Regex {
                pattern,
                annotation,
            } => QueryNode::Regex {
                field: field_name,
                pattern: self.analyzer.multiterm(field, pattern)?,
            }
            .annotated(annotation),
            Token::Wildcard {
                pattern,
                annotation,
            } => {
                if !self.config.allow_leading_wildcard && pattern.starts_with(['*', '?']) {
                    return Err(ParseError::structural(format!(
                        "leading wildcard is not allowed: '{pattern}'"
                    )));
                }
                QueryNode::Wildcard {
                    field: field_name,
                    pattern: self.analyzer.multiterm(field, pattern)?,
                }
                .annotated(annotation)
            }
            Token::Prefix { prefix, annotation } => QueryNode::Prefix {
                field: field_name,
                prefix: self.analyzer.multiterm(field, &unescape(prefix))?,
            }
            .annotated(annotation),
            Token::Fuzzy {
                text,
                max_edits,
                prefix_length,
                transpositions,
                annotation,
            } => QueryNode::Fuzzy {
                field: field_name,
                text: self.analyzer.multiterm(field, &unescape(text))?,
                max_edits: max_edits.unwrap_or(self.config.fuzzy_max_edits),
                prefix_length: prefix_length.unwrap_or(self.config.fuzzy_prefix_length),
                transpositions: *transpositions,
            }
            .annotated(annotation),
            Token::Range {
                start,
                end,
                start_inclusive,
                end_inclusive,
                annotation,
            } => {
                let bound = |text: &Option<String>| {
                    text.as_deref()
                        .map(|t| self.analyzer.multiterm(field, t))
                        .transpose()
                };
                QueryNode::Range {
                    field: field_name,
                    start: bound(start)?,
                    end: bound(end)?,
                    start_inclusive: *start_inclusive,
                    end_inclusive: *end_inclusive,
                }
                .annotated(annotation)
            }
            Token::AllDocs { annotation } => QueryNode::AllDocs.annotated(annotation),
            Token::Field(_) | Token::Boolean(_) | Token::Open(_) | Token::Clause(_) => {
                return Err(ParseError::structural(format!(
                    "expected a term, found {}",
                    token.kind_name()
                )));
            }
        };
        Ok(Leaf::Node(node))
    }
}
