//! Span clause building for phrases, near, and not-near clauses.
//!
//! Children of a span clause are resolved in span context, where only terminals and nested span
//! clauses are legal. Stop words that fall between matched children widen the slop, since they
//! still occupy a position in the indexed text.

use std::ops::Range;

use tracing::debug;

use crate::{
    analysis::Analyzer,
    ast::QueryNode,
    error::ParseError,
    parser::{Builder, Leaf, term_nodes},
    token::{Clause, ClauseKind, Token},
};

/// Resolves span clauses using the parser's settings and analyzer.
pub struct SpanBuilder<'b, 'a, A> {
    /// The enclosing parser state.
    builder: &'b Builder<'a, A>,
}

impl<'b, 'a, A: Analyzer> SpanBuilder<'b, 'a, A> {
    /// Creates a span builder over the parser state.
    pub fn new(builder: &'b Builder<'a, A>) -> Self {
        Self { builder }
    }

    /// Resolves a clause in span context. The clause's own annotation is left to the caller.
    pub fn clause(&self, clause: &Clause, field: &str) -> Result<QueryNode, ParseError> {
        let parts = self.parts(clause.range(), field)?;
        match clause.kind {
            ClauseKind::Near { in_order, slop, .. } => Ok(self.near(parts, slop, in_order, field)),
            ClauseKind::NotNear { pre, post, .. } => self.not_near(parts, pre, post, field),
            ClauseKind::Or {
                minimum_should_match: Some(_),
            } => Err(ParseError::structural(
                "minimum-should-match is not allowed inside a near clause",
            )),
            ClauseKind::Or {
                minimum_should_match: None,
            } => Ok(Self::or(parts, field)),
        }
    }

    /// Resolves the direct children in `range`.
    fn parts(&self, range: Range<usize>, field: &str) -> Result<Vec<Leaf>, ParseError> {
        let tokens = self.builder.tokens;
        let mut parts = Vec::new();
        let mut index = range.start;

        while index < range.end {
            let at = index;
            let token = &tokens[index];
            index += 1;

            let part = match token {
                Token::Clause(clause) => {
                    index = self.builder.clause_end(clause, at, &range)?;
                    let node = self
                        .clause(clause, field)
                        .map_err(|err| self.builder.locate(err, at))?;
                    Leaf::Node(node.annotated(&clause.annotation))
                }
                Token::Field(name) => {
                    let err = ParseError::structural(format!(
                        "field '{name}:' is not allowed inside a near clause"
                    ));
                    return Err(self.builder.locate(err, at));
                }
                Token::Boolean(op) => {
                    let err = ParseError::structural(format!(
                        "boolean operator '{op}' is not allowed inside a near clause"
                    ));
                    return Err(self.builder.locate(err, at));
                }
                Token::AllDocs { .. } => {
                    let err = ParseError::structural("'*:*' is not allowed inside a near clause");
                    return Err(self.builder.locate(err, at));
                }
                terminal => self
                    .builder
                    .leaf(terminal, field)
                    .map_err(|err| self.builder.locate(err, at))?,
            };
            parts.push(part);
        }

        Ok(parts)
    }

    /// Builds a near clause from its resolved children.
    fn near(
        &self,
        parts: Vec<Leaf>,
        slop: Option<u32>,
        in_order: Option<bool>,
        field: &str,
    ) -> QueryNode {
        let declared = slop.unwrap_or(self.builder.config.phrase_slop);
        let ordered = in_order.unwrap_or(declared == 0);

        let Some(first) = parts.iter().position(|part| !part.is_empty()) else {
            return QueryNode::Empty;
        };
        let last = parts
            .iter()
            .rposition(|part| !part.is_empty())
            .unwrap_or(first);

        let stop_words = parts[first..=last]
            .iter()
            .filter(|part| part.is_empty())
            .count();
        let widened = declared.saturating_add(u32::try_from(stop_words).unwrap_or(u32::MAX));
        if stop_words > 0 {
            debug!(declared, stop_words, slop = widened, "widened near slop");
        }

        let mut kept: Vec<Leaf> = parts
            .into_iter()
            .skip(first)
            .take(last - first + 1)
            .filter(|part| !part.is_empty())
            .collect();

        if kept.len() == 1 {
            return match kept.remove(0) {
                Leaf::Expanded { terms, annotation } => QueryNode::SpanNear {
                    children: term_nodes(terms, field),
                    slop: self.clamp_slop(widened),
                    in_order: ordered,
                }
                .annotated(&annotation),
                Leaf::Node(QueryNode::SpanNear {
                    children,
                    slop: inner_slop,
                    in_order: inner_order,
                }) if slop.is_some() || in_order.is_some() => QueryNode::SpanNear {
                    children,
                    slop: self.clamp_slop(inner_slop.max(widened)),
                    in_order: inner_order && ordered,
                },
                Leaf::Node(node) => node,
            };
        }

        QueryNode::SpanNear {
            children: kept.into_iter().map(|part| part.into_phrase(field)).collect(),
            slop: self.clamp_slop(widened),
            in_order: ordered,
        }
    }

    /// Builds a not-near clause from its two resolved children.
    fn not_near(
        &self,
        parts: Vec<Leaf>,
        pre: Option<i32>,
        post: Option<i32>,
        field: &str,
    ) -> Result<QueryNode, ParseError> {
        let [include, exclude] = <[Leaf; 2]>::try_from(parts).map_err(|parts| {
            ParseError::semantic(format!(
                "not-near clause requires exactly two children, found {}",
                parts.len()
            ))
        })?;

        if include.is_empty() {
            return Ok(QueryNode::Empty);
        }
        let include = include.into_phrase(field);
        if exclude.is_empty() {
            return Ok(include);
        }

        Ok(QueryNode::SpanNotNear {
            include: Box::new(include),
            exclude: Box::new(exclude.into_phrase(field)),
            pre: self.clamp_distance(pre.unwrap_or(0)),
            post: self.clamp_distance(post.unwrap_or(0)),
        })
    }

    /// Builds a span-or from its resolved children.
    fn or(parts: Vec<Leaf>, field: &str) -> QueryNode {
        let mut children: Vec<QueryNode> = parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.into_phrase(field))
            .collect();

        match children.len() {
            0 => QueryNode::Empty,
            1 => children.remove(0),
            _ => QueryNode::SpanOr { children },
        }
    }

    /// Caps a near slop at the configured maximum.
    fn clamp_slop(&self, slop: u32) -> u32 {
        let max = self.builder.config.max_near_distance;
        if slop > max {
            debug!(slop, max, "clamped near slop");
            return max;
        }
        slop
    }

    /// Caps a not-near distance at the configured maximum.
    fn clamp_distance(&self, distance: i32) -> i32 {
        let max = self.builder.config.max_not_near_distance;
        if distance > max {
            debug!(distance, max, "clamped not-near distance");
            return max;
        }
        distance
    }
}
