//! Query abstract syntax tree.
//!
//! The tree handed to the search engine. Nodes are built bottom-up by the parser and never
//! mutated afterwards; rewrites produce new nodes.

use std::fmt;

use serde::Serialize;

use crate::{
    suffix::escape,
    token::{Annotation, PositionRange},
};

/// Clause requirement inside a boolean group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause may match and contributes to the score.
    Should,
    /// The clause must not match.
    MustNot,
}

impl Occur {
    /// Prefix used when printing the clause back as a query.
    fn modifier(self) -> &'static str {
        match self {
            Self::Must => "+",
            Self::Should => "",
            Self::MustNot => "-",
        }
    }
}

impl fmt::Display for Occur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Must => "MUST",
            Self::Should => "SHOULD",
            Self::MustNot => "MUST_NOT",
        })
    }
}

/// A query and its requirement within a [`QueryNode::BooleanGroup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanClause {
    /// Requirement.
    pub occur: Occur,
    /// The clause query.
    pub query: QueryNode,
}

impl BooleanClause {
    /// Creates a clause.
    pub fn new(occur: Occur, query: QueryNode) -> Self {
        Self { occur, query }
    }
}

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryNode {
    /// A single analyzed term.
    Term {
        /// Field searched.
        field: String,
        /// Normalized term text.
        text: String,
    },

    /// A term matched within an edit distance.
    Fuzzy {
        /// Field searched.
        field: String,
        /// Normalized term text.
        text: String,
        /// Maximum edit distance.
        max_edits: u8,
        /// Number of leading characters that must match exactly.
        prefix_length: u8,
        /// Whether a transposition counts as a single edit.
        transpositions: bool,
    },

    /// A `*`/`?` pattern. Backslash escapes are kept.
    Wildcard {
        /// Field searched.
        field: String,
        /// Wildcard pattern.
        pattern: String,
    },

    /// Terms starting with a prefix.
    Prefix {
        /// Field searched.
        field: String,
        /// Normalized prefix.
        prefix: String,
    },

    /// Terms matching a regular expression.
    Regex {
        /// Field searched.
        field: String,
        /// Regular expression.
        pattern: String,
    },

    /// Terms between two bounds.
    Range {
        /// Field searched.
        field: String,
        /// Lower bound; `None` is unbounded.
        start: Option<String>,
        /// Upper bound; `None` is unbounded.
        end: Option<String>,
        /// Whether the lower bound matches.
        start_inclusive: bool,
        /// Whether the upper bound matches.
        end_inclusive: bool,
    },

    /// Every document.
    AllDocs,

    /// Matches nothing; produced by stop words and empty input.
    Empty,

    /// Children matching within `slop` positions of each other.
    SpanNear {
        /// Span children.
        children: Vec<Self>,
        /// Maximum total positional displacement.
        slop: u32,
        /// Whether the children must match left to right.
        in_order: bool,
    },

    /// Any one of the children.
    SpanOr {
        /// Span children.
        children: Vec<Self>,
    },

    /// `include` spans that have no `exclude` span within `pre` positions before or `post`
    /// positions after them.
    SpanNotNear {
        /// Spans to keep.
        include: Box<Self>,
        /// Spans that must not be nearby.
        exclude: Box<Self>,
        /// Positions before `include` to check.
        pre: i32,
        /// Positions after `include` to check.
        post: i32,
    },

    /// Clauses combined with MUST/SHOULD/MUST_NOT requirements.
    BooleanGroup {
        /// The clauses, in query order.
        clauses: Vec<BooleanClause>,
        /// Minimum number of SHOULD clauses that must match.
        minimum_should_match: Option<u32>,
    },

    /// Multiplies the score of the inner query.
    Boost {
        /// The boosted query.
        query: Box<Self>,
        /// Score multiplier.
        factor: f32,
    },

    /// Restricts the inner query's spans to a range of token positions.
    Positioned {
        /// The restricted query.
        query: Box<Self>,
        /// Allowed positions.
        range: PositionRange,
    },
}

/// Where a node is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// The whole query.
    Top,
    /// A clause of a boolean group.
    Clause,
    /// Inside a phrase or near clause.
    Span,
}

impl QueryNode {
    /// Whether the node matches nothing: [`Self::Empty`] or a span-or without children.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::SpanOr { children } => children.is_empty(),
            _ => false,
        }
    }

    /// Wraps the node in the position range and boost of `annotation`.
    ///
    /// The position range is applied first, so a node carrying both is a boost of a positioned
    /// query. Empty nodes stay empty.
    #[must_use]
    pub fn annotated(self, annotation: &Annotation) -> Self {
        if self.is_empty() {
            return Self::Empty;
        }
        let mut node = self;
        if let Some(range) = annotation.position_range {
            node = Self::Positioned {
                query: Box::new(node),
                range,
            };
        }
        if let Some(factor) = annotation.boost {
            node = Self::Boost {
                query: Box::new(node),
                factor,
            };
        }
        node
    }

    /// The field of the first leaf, searching depth first.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Term { field, .. }
            | Self::Fuzzy { field, .. }
            | Self::Wildcard { field, .. }
            | Self::Prefix { field, .. }
            | Self::Regex { field, .. }
            | Self::Range { field, .. } => Some(field),
            Self::AllDocs | Self::Empty => None,
            Self::SpanNear { children, .. } | Self::SpanOr { children } => {
                children.iter().find_map(Self::field)
            }
            Self::SpanNotNear {
                include, exclude, ..
            } => include.field().or_else(|| exclude.field()),
            Self::BooleanGroup { clauses, .. } => {
                clauses.iter().find_map(|clause| clause.query.field())
            }
            Self::Boost { query, .. } | Self::Positioned { query, .. } => query.field(),
        }
    }

    /// Formats the node as a tree, one node per line.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term { field, text } => writeln!(f, "{prefix}Term({field}:{text:?})"),
            Self::Fuzzy {
                field,
                text,
                max_edits,
                prefix_length,
                transpositions,
            } => writeln!(
                f,
                "{prefix}Fuzzy({field}:{text:?}, edits={max_edits}, prefix={prefix_length}, \
                 transpositions={transpositions})"
            ),
            Self::Wildcard { field, pattern } => {
                writeln!(f, "{prefix}Wildcard({field}:{pattern:?})")
            }
            Self::Prefix { field, prefix: p } => writeln!(f, "{prefix}Prefix({field}:{p:?})"),
            Self::Regex { field, pattern } => writeln!(f, "{prefix}Regex({field}:{pattern:?})"),
            Self::Range {
                field,
                start,
                end,
                start_inclusive,
                end_inclusive,
            } => {
                let open = if *start_inclusive { '[' } else { '{' };
                let close = if *end_inclusive { ']' } else { '}' };
                let start = start.as_deref().map_or("*".to_string(), |s| format!("{s:?}"));
                let end = end.as_deref().map_or("*".to_string(), |s| format!("{s:?}"));
                writeln!(f, "{prefix}Range({field}:{open}{start} TO {end}{close})")
            }
            Self::AllDocs => writeln!(f, "{prefix}AllDocs"),
            Self::Empty => writeln!(f, "{prefix}Empty"),
            Self::SpanNear {
                children,
                slop,
                in_order,
            } => {
                writeln!(f, "{prefix}SpanNear(slop={slop}, in_order={in_order})")?;
                for child in children {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::SpanOr { children } => {
                writeln!(f, "{prefix}SpanOr")?;
                for child in children {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::SpanNotNear {
                include,
                exclude,
                pre,
                post,
            } => {
                writeln!(f, "{prefix}SpanNotNear(pre={pre}, post={post})")?;
                include.fmt_tree(f, indent + 1)?;
                exclude.fmt_tree(f, indent + 1)
            }
            Self::BooleanGroup {
                clauses,
                minimum_should_match,
            } => {
                match minimum_should_match {
                    Some(n) => writeln!(f, "{prefix}BooleanGroup(minimum_should_match={n})")?,
                    None => writeln!(f, "{prefix}BooleanGroup")?,
                }
                for clause in clauses {
                    writeln!(f, "{prefix}  {}", clause.occur)?;
                    clause.query.fmt_tree(f, indent + 2)?;
                }
                Ok(())
            }
            Self::Boost { query, factor } => {
                writeln!(f, "{prefix}Boost({factor})")?;
                query.fmt_tree(f, indent + 1)
            }
            Self::Positioned { query, range } => {
                writeln!(f, "{prefix}Positioned({range})")?;
                query.fmt_tree(f, indent + 1)
            }
        }
    }

    /// Formats the node back into the query language.
    ///
    /// Fields equal to `default_field` are left implicit. Boolean clauses are printed with
    /// explicit `+`/`-` modifiers, so the output reads back to the same tree under the default
    /// `OR` operator and the analyzer that produced it.
    ///
    /// Near clauses print their final slop, and `~0` reads back as in order. An unordered near
    /// clause whose slop was clamped to zero therefore reads back as an ordered one.
    pub fn to_query_string(&self, default_field: &str) -> String {
        let mut out = String::new();
        self.write_query(&mut out, default_field, Context::Top);
        out
    }

    /// Whether a `^boost@range` suffix can be appended to the printed node.
    fn accepts_suffix(&self) -> bool {
        !matches!(
            self,
            Self::Range { .. } | Self::Boost { .. } | Self::Positioned { .. } | Self::Empty
        )
    }

    /// Splits off an outer boost and the position range beneath it.
    fn peel(&self) -> (&Self, Option<f32>, Option<PositionRange>) {
        let (inner, boost) = match self {
            Self::Boost { query, factor } => (query.as_ref(), Some(*factor)),
            other => (other, None),
        };
        match inner {
            Self::Positioned { query, range } => (query.as_ref(), boost, Some(*range)),
            other => (other, boost, None),
        }
    }

    /// Appends the query-language form of the node to `out`.
    fn write_query(&self, out: &mut String, default_field: &str, ctx: Context) {
        match self {
            Self::Term { field, text } => {
                write_field(out, field, default_field, ctx);
                out.push_str(&escape_term(text));
            }
            Self::Fuzzy {
                field,
                text,
                max_edits,
                prefix_length,
                transpositions,
            } => {
                write_field(out, field, default_field, ctx);
                out.push_str(&escape_term(text));
                out.push_str(if *transpositions { "~" } else { "~>" });
                out.push_str(&format!("{max_edits},{prefix_length}"));
            }
            Self::Wildcard { field, pattern } => {
                write_field(out, field, default_field, ctx);
                out.push_str(pattern);
            }
            Self::Prefix { field, prefix } => {
                write_field(out, field, default_field, ctx);
                out.push_str(&escape(prefix));
                out.push('*');
            }
            Self::Regex { field, pattern } => {
                write_field(out, field, default_field, ctx);
                out.push('/');
                out.push_str(&pattern.replace('/', "//"));
                out.push('/');
            }
            Self::Range {
                field,
                start,
                end,
                start_inclusive,
                end_inclusive,
            } => {
                write_field(out, field, default_field, ctx);
                out.push(if *start_inclusive { '[' } else { '{' });
                write_bound(out, start.as_deref());
                out.push_str(" TO ");
                write_bound(out, end.as_deref());
                out.push(if *end_inclusive { ']' } else { '}' });
            }
            Self::AllDocs => out.push_str("*:*"),
            Self::Empty => {}
            Self::SpanNear {
                children,
                slop,
                in_order,
            } => {
                self.write_span_field(out, default_field, ctx);
                out.push('[');
                write_children(out, children, default_field);
                out.push(']');
                out.push_str(if *in_order { "~>" } else { "~" });
                out.push_str(&slop.to_string());
            }
            Self::SpanOr { children } => {
                let top = ctx != Context::Span;
                self.write_span_field(out, default_field, ctx);
                out.push_str(if top { "[(" } else { "(" });
                write_children(out, children, default_field);
                out.push_str(if top { ")]" } else { ")" });
            }
            Self::SpanNotNear {
                include,
                exclude,
                pre,
                post,
            } => {
                self.write_span_field(out, default_field, ctx);
                out.push('[');
                include.write_query(out, default_field, Context::Span);
                out.push(' ');
                exclude.write_query(out, default_field, Context::Span);
                out.push_str(&format!("]!~{pre},{post}"));
            }
            Self::BooleanGroup {
                clauses,
                minimum_should_match,
            } => {
                let parens = ctx != Context::Top || minimum_should_match.is_some();
                if parens {
                    out.push('(');
                }
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(clause.occur.modifier());
                    clause.query.write_query(out, default_field, Context::Clause);
                }
                if parens {
                    out.push(')');
                }
                if let Some(n) = minimum_should_match {
                    out.push_str(&format!("~{n}"));
                }
            }
            Self::Boost { .. } | Self::Positioned { .. } => {
                let (base, boost, range) = self.peel();
                let inner_ctx = if ctx == Context::Span {
                    Context::Span
                } else {
                    Context::Clause
                };
                let wrap = !base.accepts_suffix();
                if wrap {
                    out.push('(');
                }
                base.write_query(out, default_field, inner_ctx);
                if wrap {
                    out.push(')');
                }
                if let Some(factor) = boost {
                    out.push_str(&format!("^{factor}"));
                }
                if let Some(range) = range {
                    out.push_str(&format!("@{range}"));
                }
            }
        }
    }

    /// Writes the field prefix of a span clause printed outside span context.
    fn write_span_field(&self, out: &mut String, default_field: &str, ctx: Context) {
        if let Some(field) = self.field() {
            write_field(out, field, default_field, ctx);
        }
    }
}

/// Writes `field:` unless the field is implicit.
fn write_field(out: &mut String, field: &str, default_field: &str, ctx: Context) {
    if ctx != Context::Span && field != default_field {
        out.push_str(&escape(field));
        out.push(':');
    }
}

/// Writes span children separated by spaces.
fn write_children(out: &mut String, children: &[QueryNode], default_field: &str) {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        child.write_query(out, default_field, Context::Span);
    }
}

/// Writes a range bound as a quoted literal, or `*` when open.
fn write_bound(out: &mut String, bound: Option<&str>) {
    match bound {
        Some(text) => {
            out.push('\'');
            out.push_str(&text.replace('\'', "''"));
            out.push('\'');
        }
        None => out.push('*'),
    }
}

/// Escapes a term so it reads back as a plain term, including reserved words.
fn escape_term(text: &str) -> String {
    match text {
        "AND" | "OR" | "NOT" | "TO" => format!("\\{text}"),
        _ => escape(text),
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
