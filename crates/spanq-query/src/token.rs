//! Token model produced by the lexer.
//!
//! Clause tokens own a half-open range of the tokens that follow them, so the token sequence is
//! a flattened tree: `[a b]~2 c` lexes to `Clause(1..3), Term(a), Term(b), Term(c)`.

use std::{fmt, ops::Range};

use serde::Serialize;

/// Inclusive token-position bounds attached with an `@start..end` suffix.
///
/// Either bound may be omitted. Bounds given in descending order are swapped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionRange {
    /// First matching position.
    pub start: Option<i32>,
    /// Last matching position.
    pub end: Option<i32>,
}

impl PositionRange {
    /// Creates a range, normalizing flipped bounds.
    pub fn new(start: Option<i32>, end: Option<i32>) -> Self {
        match (start, end) {
            (Some(s), Some(e)) if s > e => Self {
                start: Some(e),
                end: Some(s),
            },
            _ => Self { start, end },
        }
    }
}

impl fmt::Display for PositionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        f.write_str("..")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

/// Boost and position range trailing a terminal or a clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Annotation {
    /// Score multiplier (`^2.5`).
    pub boost: Option<f32>,
    /// Position restriction (`@3..8`).
    pub position_range: Option<PositionRange>,
}

impl Annotation {
    /// Returns true when neither a boost nor a position range is set.
    pub fn is_empty(&self) -> bool {
        self.boost.is_none() && self.position_range.is_none()
    }
}

/// Bracket family of an opened or closed clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Delimiter {
    /// `( ... )`
    Paren,
    /// `[ ... ]`
    Bracket,
    /// `{ ... }`
    Curly,
    /// `" ... "`
    Quote,
}

impl Delimiter {
    /// The opening character.
    pub fn open_char(self) -> char {
        match self {
            Self::Paren => '(',
            Self::Bracket => '[',
            Self::Curly => '{',
            Self::Quote => '"',
        }
    }

    /// The closing character.
    pub fn close_char(self) -> char {
        match self {
            Self::Paren => ')',
            Self::Bracket => ']',
            Self::Curly => '}',
            Self::Quote => '"',
        }
    }

    /// Whether a clause opened with `self` may be closed with `close`.
    ///
    /// Square and curly brackets close each other; parentheses and quotes only close themselves.
    pub fn closes_with(self, close: Self) -> bool {
        match (self, close) {
            (Self::Bracket | Self::Curly, Self::Bracket | Self::Curly) => true,
            (open, close) => open == close,
        }
    }

    /// Whether the delimiter opens phrase/near context.
    pub fn is_near(self) -> bool {
        !matches!(self, Self::Paren)
    }
}

/// Boolean operators and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BooleanOp {
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `NOT` or `-`
    Not,
    /// `+`
    Required,
}

impl BooleanOp {
    /// Whether the operator is a conjunction (`AND`, `OR`) rather than a modifier.
    pub fn is_conjunction(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Required => "+",
        })
    }
}

/// A clause opened but not yet closed. Only present while lexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpenMarker {
    /// Bracket family.
    pub delimiter: Delimiter,
    /// Index of this marker in the token sequence.
    pub token_index: usize,
}

/// The resolved type of a closed clause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ClauseKind {
    /// A parenthesized boolean group, optionally with `)~N` minimum-should-match.
    Or {
        /// Minimum number of SHOULD clauses that must match.
        minimum_should_match: Option<u32>,
    },
    /// A phrase or near clause (`"a b"`, `[a b]~3`, `[a b]~>3`).
    Near {
        /// Opening bracket family.
        delimiter: Delimiter,
        /// `Some(true)` when `~>` requested ordered matching.
        in_order: Option<bool>,
        /// Declared slop, if any.
        slop: Option<u32>,
    },
    /// A not-near clause (`"a b"!~3,5`): `a` not within `pre`/`post` positions of `b`.
    NotNear {
        /// Opening bracket family.
        delimiter: Delimiter,
        /// Positions before the included span.
        pre: Option<i32>,
        /// Positions after the included span.
        post: Option<i32>,
    },
}

/// A closed clause owning the tokens in `start..end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    /// Resolved clause type.
    pub kind: ClauseKind,
    /// First owned token index.
    pub start: usize,
    /// One past the last owned token index.
    pub end: usize,
    /// Trailing boost and position range.
    pub annotation: Annotation,
}

impl Clause {
    /// The owned token index range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A lexical unit of the query language.
///
/// Terminal texts keep their backslash escapes (`a\*b` stays `a\*b`); quoted literals hold their
/// content verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Token {
    /// A plain term or a single-quoted literal.
    Term {
        /// Term text.
        text: String,
        /// True for `'...'` literals.
        quoted: bool,
        /// Trailing boost and position range.
        annotation: Annotation,
    },
    /// A `/.../` regular expression.
    Regex {
        /// Pattern between the slashes.
        pattern: String,
        /// Trailing boost and position range.
        annotation: Annotation,
    },
    /// A term with unescaped `*` or `?`.
    Wildcard {
        /// Wildcard pattern.
        pattern: String,
        /// Trailing boost and position range.
        annotation: Annotation,
    },
    /// A term ending in a single trailing `*`.
    Prefix {
        /// Text before the `*`.
        prefix: String,
        /// Trailing boost and position range.
        annotation: Annotation,
    },
    /// A term with a `~` edit-distance suffix.
    Fuzzy {
        /// Term text.
        text: String,
        /// Maximum edits, when given.
        max_edits: Option<u8>,
        /// Required common prefix length, when given.
        prefix_length: Option<u8>,
        /// False when `~>` requested plain Levenshtein distance.
        transpositions: bool,
        /// Trailing boost and position range.
        annotation: Annotation,
    },
    /// `[a TO b]`, `{a TO b}` and mixed forms.
    Range {
        /// Lower bound; `None` for an open `*` bound.
        start: Option<String>,
        /// Upper bound; `None` for an open `*` bound.
        end: Option<String>,
        /// Whether the lower bound matches.
        start_inclusive: bool,
        /// Whether the upper bound matches.
        end_inclusive: bool,
        /// Trailing boost and position range.
        annotation: Annotation,
    },
    /// `*:*`
    AllDocs {
        /// Trailing boost and position range.
        annotation: Annotation,
    },
    /// A `name:` field switch for the next terminal or clause.
    Field(String),
    /// A boolean operator or modifier.
    Boolean(BooleanOp),
    /// An unclosed clause. Never present in a successfully lexed sequence.
    Open(OpenMarker),
    /// A closed clause.
    Clause(Clause),
}

impl Token {
    /// The annotation of a terminal or clause token.
    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            Self::Term { annotation, .. }
            | Self::Regex { annotation, .. }
            | Self::Wildcard { annotation, .. }
            | Self::Prefix { annotation, .. }
            | Self::Fuzzy { annotation, .. }
            | Self::Range { annotation, .. }
            | Self::AllDocs { annotation } => Some(annotation),
            Self::Clause(clause) => Some(&clause.annotation),
            Self::Field(_) | Self::Boolean(_) | Self::Open(_) => None,
        }
    }

    /// Whether this token produces a query node.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Field(_) | Self::Boolean(_) | Self::Open(_) | Self::Clause(_))
    }

    /// Short variant name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Term { quoted: true, .. } => "literal",
            Self::Term { .. } => "term",
            Self::Regex { .. } => "regex",
            Self::Wildcard { .. } => "wildcard",
            Self::Prefix { .. } => "prefix",
            Self::Fuzzy { .. } => "fuzzy",
            Self::Range { .. } => "range",
            Self::AllDocs { .. } => "all-docs",
            Self::Field(_) => "field",
            Self::Boolean(_) => "boolean",
            Self::Open(_) => "open",
            Self::Clause(Clause {
                kind: ClauseKind::Or { .. },
                ..
            }) => "or-clause",
            Self::Clause(Clause {
                kind: ClauseKind::Near { .. },
                ..
            }) => "near-clause",
            Self::Clause(Clause {
                kind: ClauseKind::NotNear { .. },
                ..
            }) => "not-near-clause",
        }
    }
}

/// Counts the direct children of the clause owning `range`, skipping nested clause bodies.
pub fn count_children(tokens: &[Token], range: Range<usize>) -> usize {
    let mut count = 0;
    let mut index = range.start;
    while index < range.end {
        count += 1;
        index = match &tokens[index] {
            Token::Clause(clause) => clause.end,
            _ => index + 1,
        };
    }
    count
}
