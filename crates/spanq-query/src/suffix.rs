//! Suffix grammar shared by terms, literals and clause closes.
//!
//! ```text
//! suffix   → tilde? boost? position?
//! tilde    → ("!~" | "~") ">"? INT? ("," INT)?
//! boost    → "^" FLOAT
//! position → "@" INT? ".." INT?
//! ```
//!
//! Terms keep their backslash escapes until the parser needs the plain text, so the helpers here
//! all scan for *unescaped* characters.

use std::{iter::Peekable, str::CharIndices};

use crate::{
    error::ParseError,
    token::{Annotation, PositionRange},
};

/// A parsed `~` or `!~` marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tilde {
    /// `!~` rather than `~`.
    pub negated: bool,
    /// A `>` followed the tilde.
    pub ordered: bool,
    /// First number.
    pub first: Option<i64>,
    /// Number after the comma.
    pub second: Option<i64>,
}

/// Everything that trailed a term, literal, or clause close.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Suffix {
    /// Proximity, fuzziness, or minimum-should-match marker.
    pub tilde: Option<Tilde>,
    /// Boost and position range.
    pub annotation: Annotation,
}

impl Suffix {
    /// Returns true when nothing trailed the token.
    pub fn is_empty(&self) -> bool {
        self.tilde.is_none() && self.annotation.is_empty()
    }
}

/// Characters that carry meaning in the query language.
const SYNTAX_CHARS: &str = "\\*?~^@:()[]{}\"'/+-!";

/// Whether `ch` must be escaped to be read as part of a term.
pub fn is_syntax_char(ch: char) -> bool {
    ch.is_whitespace() || SYNTAX_CHARS.contains(ch)
}

/// Byte offsets and characters of the unescaped characters in `raw`.
pub fn unescaped_chars(raw: &str) -> Vec<(usize, char)> {
    let mut out = Vec::new();
    let mut escaped = false;
    for (index, ch) in raw.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else {
            out.push((index, ch));
        }
    }
    out
}

/// Removes backslash escapes.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut escaped = false;
    for ch in raw.chars() {
        if !escaped && ch == '\\' {
            escaped = true;
            continue;
        }
        escaped = false;
        out.push(ch);
    }
    out
}

/// Escapes syntax characters so `text` reads back as a single plain term.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if is_syntax_char(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Splits a raw term buffer into its text and trailing suffix.
///
/// The suffix starts at the first unescaped `~` or `^`. Without one, a trailing `@` whose tail
/// contains `..` is read as a position range; any other `@` is part of the text.
pub fn split_term(raw: &str, base: usize) -> Result<(&str, Suffix), ParseError> {
    let unescaped = unescaped_chars(raw);

    if let Some(&(index, _)) = unescaped.iter().find(|(_, ch)| matches!(ch, '~' | '^')) {
        let suffix = parse_suffix(&raw[index..], base + index)?;
        return Ok((&raw[..index], suffix));
    }

    if let Some(&(index, _)) = unescaped.iter().rev().find(|(_, ch)| *ch == '@')
        && raw[index + 1..].contains("..")
    {
        let mut cursor = Cursor::new(&raw[index + 1..], base + index + 1);
        let range = cursor.position_range()?;
        cursor.finish("term")?;
        let suffix = Suffix {
            tilde: None,
            annotation: Annotation {
                boost: None,
                position_range: Some(range),
            },
        };
        return Ok((&raw[..index], suffix));
    }

    Ok((raw, Suffix::default()))
}

/// Parses a complete suffix run such as `~>3^2@1..5`.
///
/// `base` is the byte position of the run in the query, used for error positions.
pub fn parse_suffix(text: &str, base: usize) -> Result<Suffix, ParseError> {
    let mut cursor = Cursor::new(text, base);
    let mut suffix = Suffix::default();

    if cursor.eat_str("!~") {
        suffix.tilde = Some(cursor.tilde_body(true)?);
    } else if cursor.eat('~') {
        suffix.tilde = Some(cursor.tilde_body(false)?);
    }
    if cursor.eat('^') {
        suffix.annotation.boost = Some(cursor.boost()?);
    }
    if cursor.eat('@') {
        suffix.annotation.position_range = Some(cursor.position_range()?);
    }
    cursor.finish("suffix")?;

    Ok(suffix)
}

/// A character cursor over a suffix run.
struct Cursor<'a> {
    /// Text being parsed.
    text: &'a str,
    /// Remaining characters.
    chars: Peekable<CharIndices<'a>>,
    /// Position of `text` in the query.
    base: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over `text`, which starts at byte `base` of the query.
    fn new(text: &'a str, base: usize) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
            base,
        }
    }

    /// Byte offset of the next character within `text`.
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.text.len(), |&(i, _)| i)
    }

    /// A lexical error at the current position.
    fn error(&mut self, message: impl Into<String>) -> ParseError {
        let position = self.base + self.offset();
        ParseError::lexical(message).at(position)
    }

    /// Consumes `ch` if it is next.
    fn eat(&mut self, ch: char) -> bool {
        self.chars.next_if(|&(_, c)| c == ch).is_some()
    }

    /// Consumes `s` if the remaining text starts with it.
    fn eat_str(&mut self, s: &str) -> bool {
        let offset = self.offset();
        if !self.text[offset..].starts_with(s) {
            return false;
        }
        for _ in s.chars() {
            self.chars.next();
        }
        true
    }

    /// Consumes characters while `pred` holds, returning them.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.offset();
        while self.chars.next_if(|&(_, c)| pred(c)).is_some() {}
        let end = self.offset();
        &self.text[start..end]
    }

    /// Reads an optionally signed integer, if one is present.
    fn integer(&mut self) -> Result<Option<i64>, ParseError> {
        let negative = self.eat('-');
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            if negative {
                return Err(self.error("expected digits after '-'"));
            }
            return Ok(None);
        }
        let value: i64 = digits
            .parse()
            .map_err(|_| self.error(format!("number out of range: {digits}")))?;
        Ok(Some(if negative { -value } else { value }))
    }

    /// Reads the body of a `~` or `!~` marker.
    fn tilde_body(&mut self, negated: bool) -> Result<Tilde, ParseError> {
        let ordered = self.eat('>');
        let first = self.integer()?;
        let second = if self.eat(',') {
            match self.integer()? {
                Some(value) => Some(value),
                None => return Err(self.error("expected number after ','")),
            }
        } else {
            None
        };
        Ok(Tilde {
            negated,
            ordered,
            first,
            second,
        })
    }

    /// Reads a non-negative boost factor.
    fn boost(&mut self) -> Result<f32, ParseError> {
        if self.chars.peek().is_some_and(|&(_, c)| c == '-') {
            return Err(self.error("negative boost is not allowed"));
        }
        let number = self.take_while(|c| c.is_ascii_digit() || c == '.');
        if number.is_empty() {
            return Err(self.error("expected number after '^'"));
        }
        match number.parse::<f32>() {
            Ok(factor) if factor.is_finite() => Ok(factor),
            _ => Err(self.error(format!("invalid boost value: {number}"))),
        }
    }

    /// Reads `start..end` with either bound optional.
    fn position_range(&mut self) -> Result<PositionRange, ParseError> {
        let start = self.integer()?;
        if !self.eat_str("..") {
            return Err(self.error("expected '..' in position range"));
        }
        let end = self.integer()?;
        let bound = |value: Option<i64>| -> Result<Option<i32>, String> {
            value
                .map(|v| i32::try_from(v).map_err(|_| format!("position out of range: {v}")))
                .transpose()
        };
        let start = bound(start).map_err(|m| self.error(m))?;
        let end = bound(end).map_err(|m| self.error(m))?;
        Ok(PositionRange::new(start, end))
    }

    /// Fails if anything is left unparsed.
    fn finish(&mut self, what: &str) -> Result<(), ParseError> {
        let offset = self.offset();
        if offset < self.text.len() {
            let rest = &self.text[offset..];
            return Err(self.error(format!("unexpected '{rest}' in {what}")));
        }
        Ok(())
    }
}
