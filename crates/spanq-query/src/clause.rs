//! Resolution of a just-closed clause into its concrete type.
//!
//! The lexer calls [`resolve_clause`] when a bracket or quote closes. The body tokens and the
//! suffix run that trailed the close decide whether the clause is a boolean group, a near or
//! not-near span clause, or a `[a TO b]` range that collapses into a single token.

use std::ops::Range;

use crate::{
    error::ParseError,
    suffix::{Suffix, Tilde, unescape},
    token::{Annotation, ClauseKind, Delimiter, Token, count_children},
};

/// What a closed clause turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A clause that keeps owning its body tokens.
    Clause {
        /// Resolved clause type.
        kind: ClauseKind,
        /// Trailing boost and position range.
        annotation: Annotation,
    },
    /// A range query replacing the clause and its body.
    Range(Token),
}

/// Resolves the clause opened with `open`, closed with `close`, owning `tokens[body]`.
///
/// `in_near` is true when the clause is itself nested inside a phrase or near clause.
pub fn resolve_clause(
    open: Delimiter,
    close: Delimiter,
    tokens: &[Token],
    body: Range<usize>,
    suffix: &Suffix,
    in_near: bool,
) -> Result<Resolution, ParseError> {
    let annotation = suffix.annotation;

    if open == Delimiter::Paren {
        return resolve_or(suffix, in_near).map(|kind| Resolution::Clause { kind, annotation });
    }

    let any_curly = open == Delimiter::Curly || close == Delimiter::Curly;
    if open != Delimiter::Quote {
        if let Some((start, end)) = range_bounds(&tokens[body.clone()]) {
            if !suffix.is_empty() {
                if any_curly {
                    return Err(ParseError::structural(
                        "a range clause cannot carry modifiers",
                    ));
                }
            } else {
                return Ok(Resolution::Range(Token::Range {
                    start,
                    end,
                    start_inclusive: open == Delimiter::Bracket,
                    end_inclusive: close == Delimiter::Bracket,
                    annotation,
                }));
            }
        } else if any_curly {
            return Err(ParseError::structural(
                "curly brackets are only valid for range queries",
            ));
        }
    }

    let kind = match suffix.tilde {
        Some(tilde) if tilde.negated => not_near(open, tokens, body, tilde)?,
        Some(tilde) => near(open, tilde)?,
        None => ClauseKind::Near {
            delimiter: open,
            in_order: None,
            slop: None,
        },
    };
    Ok(Resolution::Clause { kind, annotation })
}

/// A parenthesized group, optionally with a minimum-should-match count.
fn resolve_or(suffix: &Suffix, in_near: bool) -> Result<ClauseKind, ParseError> {
    let Some(tilde) = suffix.tilde else {
        return Ok(ClauseKind::Or {
            minimum_should_match: None,
        });
    };

    if tilde.negated || tilde.ordered || tilde.second.is_some() {
        return Err(ParseError::structural(
            "a parenthesized group only accepts '~N' for minimum-should-match",
        ));
    }
    if in_near {
        return Err(ParseError::structural(
            "minimum-should-match is not allowed inside a near clause",
        ));
    }
    let Some(count) = tilde.first else {
        return Err(ParseError::lexical(
            "expected a number after '~' for minimum-should-match",
        ));
    };
    let count = u32::try_from(count)
        .map_err(|_| ParseError::lexical(format!("invalid minimum-should-match: {count}")))?;

    Ok(ClauseKind::Or {
        minimum_should_match: Some(count),
    })
}

/// `~N` and `~>N` on a phrase or bracket clause.
fn near(delimiter: Delimiter, tilde: Tilde) -> Result<ClauseKind, ParseError> {
    if tilde.second.is_some() {
        return Err(ParseError::lexical(
            "a near clause takes a single slop value",
        ));
    }
    let slop = tilde
        .first
        .map(|value| {
            u32::try_from(value)
                .map_err(|_| ParseError::lexical(format!("invalid slop: {value}")))
        })
        .transpose()?;

    Ok(ClauseKind::Near {
        delimiter,
        in_order: tilde.ordered.then_some(true),
        slop,
    })
}

/// `!~N` and `!~P,Q` on a two-child clause.
fn not_near(
    delimiter: Delimiter,
    tokens: &[Token],
    body: Range<usize>,
    tilde: Tilde,
) -> Result<ClauseKind, ParseError> {
    if tilde.ordered {
        return Err(ParseError::lexical("'>' is not valid after '!~'"));
    }
    let children = count_children(tokens, body);
    if children != 2 {
        return Err(ParseError::semantic(format!(
            "not-near clause requires exactly two children, found {children}"
        )));
    }

    let distance = |value: i64| {
        i32::try_from(value)
            .map_err(|_| ParseError::lexical(format!("not-near distance out of range: {value}")))
    };
    let pre = tilde.first.map(distance).transpose()?;
    let post = tilde.second.map(distance).transpose()?.or(pre);

    Ok(ClauseKind::NotNear {
        delimiter,
        pre,
        post,
    })
}

/// Returns the bounds when the body is exactly `bound TO bound`.
fn range_bounds(body: &[Token]) -> Option<(Option<String>, Option<String>)> {
    let [start, to, end] = body else {
        return None;
    };
    let is_to = matches!(
        to,
        Token::Term { text, quoted: false, annotation } if text == "TO" && annotation.is_empty()
    );
    if !is_to {
        return None;
    }
    Some((range_bound(start)?, range_bound(end)?))
}

/// A single range bound. `Some(None)` is an open `*` bound.
fn range_bound(token: &Token) -> Option<Option<String>> {
    match token {
        Token::Term {
            text,
            quoted,
            annotation,
        } if annotation.is_empty() => Some(Some(if *quoted {
            text.clone()
        } else {
            unescape(text)
        })),
        Token::Wildcard {
            pattern,
            annotation,
        } if pattern == "*" && annotation.is_empty() => Some(None),
        _ => None,
    }
}
