//! Query lexer (tokenizer).
//!
//! Converts a query string into a flat token sequence in a single forward pass. Clauses are
//! tracked on a stack of open markers; when a clause closes, its marker slot is overwritten with
//! the resolved clause token (or the whole clause collapses into a range token).

use std::{iter::Peekable, mem, str::CharIndices};

use tracing::trace;

use crate::{
    clause::{Resolution, resolve_clause},
    error::ParseError,
    suffix::{is_syntax_char, parse_suffix, split_term, unescape, unescaped_chars},
    token::{Annotation, BooleanOp, Clause, Delimiter, OpenMarker, Token},
};

/// A clause that has been opened but not closed.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Bracket family.
    delimiter: Delimiter,
    /// Index of the open marker in the token sequence.
    token_index: usize,
    /// Byte position of the opening character.
    position: usize,
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<CharIndices<'a>>,
    /// Tokens produced so far.
    tokens: Vec<Token>,
    /// Open clauses, innermost last.
    stack: Vec<Frame>,
    /// Number of open phrase/near clauses. Booleans and fields are not recognized inside them.
    near_depth: usize,
    /// The term being read, with escapes retained.
    buffer: String,
    /// Byte position where the buffered term started.
    buffer_start: usize,
    /// Query position of each buffered character, keyed by its offset in the buffer.
    buffer_positions: Vec<(usize, usize)>,
    /// Byte position of each token in the query.
    positions: Vec<usize>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            tokens: Vec::new(),
            stack: Vec::new(),
            near_depth: 0,
            buffer: String::new(),
            buffer_start: 0,
            buffer_positions: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Tokenizes the entire input, returning all tokens and their positions or an error.
    fn tokenize(mut self) -> Result<(Vec<Token>, Vec<usize>), ParseError> {
        while let Some((pos, ch)) = self.chars.next() {
            match ch {
                '\\' => self.read_escape(pos)?,
                c if c.is_whitespace() => self.flush_term()?,
                '\'' | '/' if self.buffer.is_empty() => self.read_literal(ch, pos)?,
                '"' => {
                    self.flush_term()?;
                    let in_quote = self
                        .stack
                        .last()
                        .is_some_and(|frame| frame.delimiter == Delimiter::Quote);
                    if in_quote {
                        self.close_clause(Delimiter::Quote, pos)?;
                    } else {
                        self.open_clause(Delimiter::Quote, pos);
                    }
                }
                '(' | '[' | '{' => {
                    self.flush_term()?;
                    self.open_clause(delimiter_for(ch), pos);
                }
                ')' | ']' | '}' => {
                    self.flush_term()?;
                    self.close_clause(delimiter_for(ch), pos)?;
                }
                ':' => self.read_field(pos)?,
                '+' if self.buffer.is_empty() && self.near_depth == 0 => {
                    self.push_boolean(BooleanOp::Required, false, pos)?;
                }
                '-' if self.buffer.is_empty() && self.near_depth == 0 => {
                    self.push_boolean(BooleanOp::Not, false, pos)?;
                }
                _ => self.push_char(ch, pos),
            }
        }

        self.flush_term()?;

        if let Some(frame) = self.stack.last() {
            return Err(ParseError::lexical(format!(
                "unclosed '{}'",
                frame.delimiter.open_char()
            ))
            .at(frame.position));
        }
        self.check_clause_end(0, self.input.len())?;

        Ok((self.tokens, self.positions))
    }

    /// Appends a character to the term buffer.
    fn push_char(&mut self, ch: char, pos: usize) {
        if self.buffer.is_empty() {
            self.buffer_start = pos;
        }
        self.buffer_positions.push((self.buffer.len(), pos));
        self.buffer.push(ch);
    }

    /// Appends a token that starts at `pos`.
    fn push_token(&mut self, token: Token, pos: usize) {
        self.tokens.push(token);
        self.positions.push(pos);
    }

    /// Index of the first token belonging to the innermost open clause.
    fn clause_start(&self) -> usize {
        self.stack.last().map_or(0, |frame| frame.token_index + 1)
    }

    /// Reads the character after a backslash.
    ///
    /// `\uXXXX` escapes are decoded, combining surrogate pairs. Decoded syntax characters stay
    /// escaped so they are matched literally. Any other escaped character is kept with its
    /// backslash.
    fn read_escape(&mut self, pos: usize) -> Result<(), ParseError> {
        let Some((next_pos, next)) = self.chars.next() else {
            return Err(ParseError::lexical("dangling escape character at end of query").at(pos));
        };

        if next != 'u' {
            self.push_char('\\', pos);
            self.push_char(next, next_pos);
            return Ok(());
        }

        let unit = self.read_hex4(pos)?;
        let code = match unit {
            0xD800..=0xDBFF => {
                let paired = self.chars.next_if(|&(_, c)| c == '\\').is_some()
                    && self.chars.next_if(|&(_, c)| c == 'u').is_some();
                if !paired {
                    return Err(
                        ParseError::lexical("unpaired surrogate in unicode escape").at(pos)
                    );
                }
                let low = self.read_hex4(pos)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(
                        ParseError::lexical("unpaired surrogate in unicode escape").at(pos)
                    );
                }
                0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(ParseError::lexical("unpaired surrogate in unicode escape").at(pos));
            }
            _ => unit,
        };
        let Some(decoded) = char::from_u32(code) else {
            return Err(ParseError::lexical("invalid unicode escape").at(pos));
        };

        if is_syntax_char(decoded) {
            self.push_char('\\', pos);
            self.push_char(decoded, pos);
        } else {
            self.push_char(decoded, pos);
        }
        Ok(())
    }

    /// Reads the four hex digits of a `\u` escape.
    fn read_hex4(&mut self, pos: usize) -> Result<u32, ParseError> {
        let mut value = 0;
        for _ in 0..4 {
            let digit = self
                .chars
                .next()
                .and_then(|(_, c)| c.to_digit(16))
                .ok_or_else(|| ParseError::lexical("invalid unicode escape").at(pos))?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    /// Reads a `'...'` literal or a `/.../` regex. A doubled delimiter is an escaped delimiter.
    fn read_literal(&mut self, quote: char, pos: usize) -> Result<(), ParseError> {
        let what = if quote == '/' { "regex" } else { "quoted" };
        let mut content = String::new();

        loop {
            match self.chars.next() {
                None => {
                    return Err(ParseError::lexical(format!("unterminated {what} literal")).at(pos));
                }
                Some((_, c)) if c == quote => {
                    if self.chars.next_if(|&(_, n)| n == quote).is_some() {
                        content.push(quote);
                    } else {
                        break;
                    }
                }
                Some((_, c)) => content.push(c),
            }
        }

        if content.is_empty() {
            return Err(ParseError::lexical(format!("empty {what} literal")).at(pos));
        }

        let (suffix_pos, suffix_text) = self.read_suffix_run();
        let suffix = parse_suffix(&suffix_text, suffix_pos)?;
        if suffix.tilde.is_some() {
            return Err(
                ParseError::lexical(format!("'~' cannot follow a {what} literal")).at(suffix_pos)
            );
        }

        let annotation = suffix.annotation;
        let token = if quote == '/' {
            Token::Regex {
                pattern: content,
                annotation,
            }
        } else {
            Token::Term {
                text: content,
                quoted: true,
                annotation,
            }
        };
        self.push_token(token, pos);
        Ok(())
    }

    /// Reads the characters directly trailing a literal or clause close.
    fn read_suffix_run(&mut self) -> (usize, String) {
        let start = self
            .chars
            .peek()
            .map_or(self.input.len(), |&(index, _)| index);
        let mut run = String::new();
        while let Some((_, c)) = self
            .chars
            .next_if(|&(_, c)| !c.is_whitespace() && !"()[]{}\"".contains(c))
        {
            run.push(c);
        }
        (start, run)
    }

    /// Handles an unescaped `:`, turning the buffer into a field name.
    fn read_field(&mut self, pos: usize) -> Result<(), ParseError> {
        if self.near_depth > 0 {
            return Err(
                ParseError::structural("field not allowed inside a phrase or near clause").at(pos)
            );
        }
        if self.buffer.is_empty() {
            return Err(ParseError::structural("missing field name before ':'").at(pos));
        }
        if matches!(self.tokens.last(), Some(Token::Field(_))) {
            return Err(ParseError::structural("field cannot follow another field").at(pos));
        }

        let name = unescape(&mem::take(&mut self.buffer));
        self.buffer_positions.clear();
        self.push_token(Token::Field(name), self.buffer_start);
        Ok(())
    }

    /// Pushes a boolean operator after checking it against the previous token in the clause.
    fn push_boolean(&mut self, op: BooleanOp, keyword: bool, pos: usize) -> Result<(), ParseError> {
        let previous = self.tokens[self.clause_start()..].last();

        match previous {
            Some(Token::Field(name)) => {
                return Err(ParseError::structural(format!(
                    "field '{name}:' must be followed by a term or clause"
                ))
                .at(pos));
            }
            Some(Token::Boolean(prev)) if op.is_conjunction() => {
                return Err(ParseError::structural(format!(
                    "illegal adjacent boolean operators '{prev}' and '{op}'"
                ))
                .at(pos));
            }
            Some(Token::Boolean(prev)) if !prev.is_conjunction() => {
                return Err(
                    ParseError::structural(format!("illegal double modifier '{prev}{op}'")).at(pos)
                );
            }
            None if op.is_conjunction() => {
                return Err(ParseError::structural(format!("'{op}' cannot start a clause")).at(pos));
            }
            None if keyword => {
                return Err(ParseError::structural(
                    "NOT cannot start a clause; use '-term' to exclude",
                )
                .at(pos));
            }
            _ => {}
        }

        self.push_token(Token::Boolean(op), pos);
        Ok(())
    }

    /// Converts the buffered term into a token.
    fn flush_term(&mut self) -> Result<(), ParseError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let raw = mem::take(&mut self.buffer);
        let offsets = mem::take(&mut self.buffer_positions);
        let start = self.buffer_start;

        if self.near_depth == 0 {
            let op = match raw.as_str() {
                "AND" => Some(BooleanOp::And),
                "OR" => Some(BooleanOp::Or),
                "NOT" => Some(BooleanOp::Not),
                _ => None,
            };
            if let Some(op) = op {
                return self.push_boolean(op, true, start);
            }
        }

        let token = match raw.as_str() {
            r"\AND" | r"\OR" | r"\NOT" => Token::Term {
                text: raw[1..].to_string(),
                quoted: false,
                annotation: Annotation::default(),
            },
            _ => classify_term(&raw, 0).map_err(|err| relocate(err, &offsets, start))?,
        };

        if let Token::Wildcard {
            pattern,
            annotation,
        } = &token
            && pattern == "*"
            && matches!(self.tokens.last(), Some(Token::Field(name)) if name == "*")
        {
            let annotation = *annotation;
            self.tokens.pop();
            self.tokens.push(Token::AllDocs { annotation });
            return Ok(());
        }

        self.push_token(token, start);
        Ok(())
    }

    /// Pushes an open marker for a new clause.
    fn open_clause(&mut self, delimiter: Delimiter, pos: usize) {
        let token_index = self.tokens.len();
        self.push_token(
            Token::Open(OpenMarker {
                delimiter,
                token_index,
            }),
            pos,
        );
        self.stack.push(Frame {
            delimiter,
            token_index,
            position: pos,
        });
        if delimiter.is_near() {
            self.near_depth += 1;
        }
    }

    /// Rejects clauses ending in a boolean operator or a field.
    fn check_clause_end(&self, clause_start: usize, pos: usize) -> Result<(), ParseError> {
        match self.tokens[clause_start..].last() {
            Some(Token::Boolean(op)) => Err(ParseError::structural(format!(
                "clause cannot end with '{op}'"
            ))
            .at(pos)),
            Some(Token::Field(name)) => Err(ParseError::structural(format!(
                "field '{name}:' must be followed by a term or clause"
            ))
            .at(pos)),
            _ => Ok(()),
        }
    }

    /// Closes the innermost clause and resolves it.
    fn close_clause(&mut self, close: Delimiter, pos: usize) -> Result<(), ParseError> {
        let Some(frame) = self.stack.pop() else {
            return Err(
                ParseError::lexical(format!("unmatched '{}'", close.close_char())).at(pos)
            );
        };
        if !frame.delimiter.closes_with(close) {
            return Err(ParseError::lexical(format!(
                "mismatched '{}' closing '{}'",
                close.close_char(),
                frame.delimiter.open_char()
            ))
            .at(pos));
        }

        let body = frame.token_index + 1..self.tokens.len();
        self.check_clause_end(body.start, pos)?;
        if frame.delimiter.is_near() {
            self.near_depth -= 1;
        }

        let (suffix_pos, suffix_text) = self.read_suffix_run();
        let suffix = parse_suffix(&suffix_text, suffix_pos)?;
        let resolution = resolve_clause(
            frame.delimiter,
            close,
            &self.tokens,
            body.clone(),
            &suffix,
            self.near_depth > 0,
        )
        .map_err(|err| err.at(pos))?;

        match resolution {
            Resolution::Clause { kind, annotation } => {
                trace!(?kind, start = body.start, end = body.end, "closed clause");
                self.tokens[frame.token_index] = Token::Clause(Clause {
                    kind,
                    start: body.start,
                    end: body.end,
                    annotation,
                });
            }
            Resolution::Range(range) => {
                trace!("collapsed clause into range");
                self.tokens.truncate(frame.token_index);
                self.positions.truncate(frame.token_index);
                self.push_token(range, frame.position);
            }
        }
        Ok(())
    }
}

/// Maps a bracket character to its delimiter.
fn delimiter_for(ch: char) -> Delimiter {
    match ch {
        '(' | ')' => Delimiter::Paren,
        '[' | ']' => Delimiter::Bracket,
        '{' | '}' => Delimiter::Curly,
        _ => Delimiter::Quote,
    }
}

/// Maps an error position given as a term buffer offset back to the query.
fn relocate(mut err: ParseError, offsets: &[(usize, usize)], start: usize) -> ParseError {
    err.position = err.position.map(|offset| {
        offsets
            .iter()
            .rev()
            .find(|&&(buffered, _)| buffered <= offset)
            .map_or(start, |&(_, pos)| pos)
    });
    err
}

/// Classifies a raw term buffer as a plain, fuzzy, wildcard, or prefix term.
fn classify_term(raw: &str, start: usize) -> Result<Token, ParseError> {
    let (text, suffix) = split_term(raw, start)?;

    if text.is_empty() {
        let message = if suffix.tilde.is_some() {
            "'~' must follow a term"
        } else if suffix.annotation.boost.is_some() {
            "'^' must follow a term"
        } else {
            "position range must follow a term"
        };
        return Err(ParseError::lexical(message).at(start));
    }

    let annotation = suffix.annotation;
    let wildcards: Vec<(usize, char)> = unescaped_chars(text)
        .into_iter()
        .filter(|&(_, c)| c == '*' || c == '?')
        .collect();

    if let Some(tilde) = suffix.tilde {
        if !wildcards.is_empty() {
            return Err(
                ParseError::structural("fuzzy suffix cannot follow a wildcard term").at(start)
            );
        }
        let edits = |value: Option<i64>, what: &str| -> Result<Option<u8>, ParseError> {
            match value {
                None => Ok(None),
                Some(v) if v < 0 => {
                    Err(ParseError::lexical(format!("negative fuzzy {what} is not allowed"))
                        .at(start))
                }
                Some(v) => u8::try_from(v).map(Some).map_err(|_| {
                    ParseError::lexical(format!("fuzzy {what} out of range: {v}")).at(start)
                }),
            }
        };
        return Ok(Token::Fuzzy {
            text: text.to_string(),
            max_edits: edits(tilde.first, "edit distance")?,
            prefix_length: edits(tilde.second, "prefix length")?,
            transpositions: !tilde.ordered,
            annotation,
        });
    }

    Ok(match wildcards.as_slice() {
        [] => Token::Term {
            text: text.to_string(),
            quoted: false,
            annotation,
        },
        [(index, '*')] if index + 1 == text.len() && text.len() > 1 => Token::Prefix {
            prefix: text[..*index].to_string(),
            annotation,
        },
        _ => Token::Wildcard {
            pattern: text.to_string(),
            annotation,
        },
    })
}

/// Tokenizes a query string.
///
/// The returned sequence contains no [`Token::Open`] markers: every clause has been closed and
/// resolved.
pub fn tokenize(query: &str) -> Result<Vec<Token>, ParseError> {
    tokenize_with_positions(query).map(|(tokens, _)| tokens)
}

/// Tokenizes a query string, also returning the byte position in `query` of each token.
pub fn tokenize_with_positions(query: &str) -> Result<(Vec<Token>, Vec<usize>), ParseError> {
    Lexer::new(query)
        .tokenize()
        .map_err(|err| err.with_query(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ParseErrorKind, token::ClauseKind};

    fn term(s: &str) -> Token {
        Token::Term {
            text: s.into(),
            quoted: false,
            annotation: Annotation::default(),
        }
    }

    fn near(start: usize, end: usize, slop: Option<u32>, in_order: Option<bool>) -> Token {
        Token::Clause(Clause {
            kind: ClauseKind::Near {
                delimiter: Delimiter::Bracket,
                in_order,
                slop,
            },
            start,
            end,
            annotation: Annotation::default(),
        })
    }

    fn kind_of(query: &str) -> ParseErrorKind {
        tokenize(query).unwrap_err().kind
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize("").unwrap(), vec![]);
        assert_eq!(tokenize("   ").unwrap(), vec![]);
    }

    #[test]
    fn multiple_terms() {
        assert_eq!(
            tokenize("rust async").unwrap(),
            vec![term("rust"), term("async")]
        );
    }

    #[test]
    fn boolean_keywords() {
        assert_eq!(
            tokenize("a AND b OR NOT c").unwrap(),
            vec![
                term("a"),
                Token::Boolean(BooleanOp::And),
                term("b"),
                Token::Boolean(BooleanOp::Or),
                Token::Boolean(BooleanOp::Not),
                term("c"),
            ]
        );
    }

    #[test]
    fn lowercase_keywords_are_terms() {
        assert_eq!(
            tokenize("a or b").unwrap(),
            vec![term("a"), term("or"), term("b")]
        );
    }

    #[test]
    fn escaped_keyword_is_a_term() {
        assert_eq!(
            tokenize(r"a \AND b").unwrap(),
            vec![term("a"), term("AND"), term("b")]
        );
    }

    #[test]
    fn plus_minus_modifiers() {
        assert_eq!(
            tokenize("+a -b c-d").unwrap(),
            vec![
                Token::Boolean(BooleanOp::Required),
                term("a"),
                Token::Boolean(BooleanOp::Not),
                term("b"),
                term("c-d"),
            ]
        );
    }

    #[test]
    fn adjacent_conjunctions_fail() {
        let err = tokenize("cat OR OR dog").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Structural);
        assert!(err.message.contains("adjacent boolean operators"));
        assert_eq!(kind_of("cat AND OR dog"), ParseErrorKind::Structural);
    }

    #[test]
    fn double_modifier_fails() {
        assert!(tokenize("--a").unwrap_err().message.contains("double modifier"));
        assert_eq!(kind_of("+-a"), ParseErrorKind::Structural);
    }

    #[test]
    fn conjunction_then_modifier_is_fine() {
        assert!(tokenize("a AND -b").is_ok());
        assert!(tokenize("a OR NOT b").is_ok());
    }

    #[test]
    fn clause_boundaries_reject_booleans() {
        assert_eq!(kind_of("AND a"), ParseErrorKind::Structural);
        assert_eq!(kind_of("a OR"), ParseErrorKind::Structural);
        assert_eq!(kind_of("(a NOT)"), ParseErrorKind::Structural);
        assert_eq!(kind_of("NOT a"), ParseErrorKind::Structural);
        assert!(tokenize("-a").is_ok());
    }

    #[test]
    fn fields() {
        assert_eq!(
            tokenize("title:guide rust").unwrap(),
            vec![Token::Field("title".into()), term("guide"), term("rust")]
        );
    }

    #[test]
    fn escaped_colon_stays_in_term() {
        assert_eq!(tokenize(r"a\:b").unwrap(), vec![term(r"a\:b")]);
    }

    #[test]
    fn field_errors() {
        assert_eq!(kind_of(":a"), ParseErrorKind::Structural);
        assert_eq!(kind_of("a:b:c"), ParseErrorKind::Structural);
        assert_eq!(kind_of("title:"), ParseErrorKind::Structural);
        assert_eq!(kind_of("title: AND b"), ParseErrorKind::Structural);
        assert_eq!(kind_of("\"title:a b\""), ParseErrorKind::Structural);
        assert_eq!(kind_of("[a title:b]"), ParseErrorKind::Structural);
    }

    #[test]
    fn match_all() {
        assert_eq!(
            tokenize("*:*").unwrap(),
            vec![Token::AllDocs {
                annotation: Annotation::default()
            }]
        );
    }

    #[test]
    fn phrase_becomes_clause() {
        let tokens = tokenize("\"a b\"").unwrap();
        assert_eq!(
            tokens[0],
            Token::Clause(Clause {
                kind: ClauseKind::Near {
                    delimiter: Delimiter::Quote,
                    in_order: None,
                    slop: None,
                },
                start: 1,
                end: 3,
                annotation: Annotation::default(),
            })
        );
        assert_eq!(&tokens[1..], &[term("a"), term("b")]);
    }

    #[test]
    fn nested_near_clauses() {
        let tokens = tokenize("[[a b]~3 c]~>4").unwrap();
        assert_eq!(
            tokens,
            vec![
                near(1, 5, Some(4), Some(true)),
                near(2, 4, Some(3), None),
                term("a"),
                term("b"),
                term("c"),
            ]
        );
    }

    #[test]
    fn booleans_are_terms_inside_near() {
        let tokens = tokenize("\"a AND -b\"").unwrap();
        assert_eq!(&tokens[1..], &[term("a"), term("AND"), term("-b")]);
    }

    #[test]
    fn not_near_clause() {
        let tokens = tokenize("\"fever bieber\"!~3,5").unwrap();
        match &tokens[0] {
            Token::Clause(Clause {
                kind: ClauseKind::NotNear { pre, post, .. },
                ..
            }) => assert_eq!((*pre, *post), (Some(3), Some(5))),
            other => panic!("expected not-near clause, got {other:?}"),
        }
    }

    #[test]
    fn clause_boost_and_position_range() {
        let tokens = tokenize("(a b)^2@3..1").unwrap();
        let annotation = tokens[0].annotation().unwrap();
        assert_eq!(annotation.boost, Some(2.0));
        let range = annotation.position_range.unwrap();
        assert_eq!((range.start, range.end), (Some(1), Some(3)));
    }

    #[test]
    fn minimum_should_match() {
        let tokens = tokenize("(a b c)~2").unwrap();
        assert!(matches!(
            tokens[0],
            Token::Clause(Clause {
                kind: ClauseKind::Or {
                    minimum_should_match: Some(2)
                },
                ..
            })
        ));
    }

    #[test]
    fn minimum_should_match_inside_near_fails() {
        assert_eq!(kind_of("[a (b c)~1]"), ParseErrorKind::Structural);
    }

    #[test]
    fn ranges() {
        assert_eq!(
            tokenize("[abc TO def]").unwrap(),
            vec![Token::Range {
                start: Some("abc".into()),
                end: Some("def".into()),
                start_inclusive: true,
                end_inclusive: true,
                annotation: Annotation::default(),
            }]
        );
        assert_eq!(
            tokenize("{abc TO *]").unwrap(),
            vec![Token::Range {
                start: Some("abc".into()),
                end: None,
                start_inclusive: false,
                end_inclusive: true,
                annotation: Annotation::default(),
            }]
        );
    }

    #[test]
    fn range_after_field_and_terms() {
        let tokens = tokenize("a price:[1 TO 5] b").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1], Token::Field("price".into()));
        assert!(matches!(tokens[2], Token::Range { .. }));
        assert_eq!(tokens[3], term("b"));
    }

    #[test]
    fn quoted_star_is_a_literal_bound() {
        match &tokenize("['*' TO b]").unwrap()[0] {
            Token::Range { start, .. } => assert_eq!(start.as_deref(), Some("*")),
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn bracket_without_to_is_near() {
        let tokens = tokenize("[abc TOO def]").unwrap();
        assert_eq!(tokens[0], near(1, 4, None, None));
    }

    #[test]
    fn curly_without_range_fails() {
        assert_eq!(kind_of("{a b}"), ParseErrorKind::Structural);
        assert_eq!(kind_of("{a TO b}~2"), ParseErrorKind::Structural);
    }

    #[test]
    fn unterminated_and_mismatched() {
        assert_eq!(kind_of("the quick brown\""), ParseErrorKind::Lexical);
        assert_eq!(kind_of("(a b"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("a b)"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("(a b]"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("[a b)"), ParseErrorKind::Lexical);
    }

    #[test]
    fn unclosed_quote_points_at_opening() {
        let err = tokenize("a \"b c").unwrap_err();
        assert_eq!(err.position, Some(2));
        assert_eq!(err.query.as_deref(), Some("a \"b c"));
    }

    #[test]
    fn single_quoted_literal() {
        assert_eq!(
            tokenize("'it''s (x)'^2").unwrap(),
            vec![Token::Term {
                text: "it's (x)".into(),
                quoted: true,
                annotation: Annotation {
                    boost: Some(2.0),
                    position_range: None,
                },
            }]
        );
    }

    #[test]
    fn apostrophe_inside_word() {
        assert_eq!(tokenize("don't").unwrap(), vec![term("don't")]);
    }

    #[test]
    fn literal_errors() {
        assert_eq!(kind_of("'abc"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("''"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("/ab"), ParseErrorKind::Lexical);
    }

    #[test]
    fn regex_literal() {
        assert_eq!(
            tokenize("/a//b.*/").unwrap(),
            vec![Token::Regex {
                pattern: "a/b.*".into(),
                annotation: Annotation::default(),
            }]
        );
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(tokenize(r"caf\u00e9").unwrap(), vec![term("café")]);
        assert_eq!(tokenize(r"\uD83D\uDE00").unwrap(), vec![term("😀")]);
        assert_eq!(tokenize(r"a\u002a").unwrap(), vec![term(r"a\*")]);
    }

    #[test]
    fn bad_unicode_escapes() {
        assert_eq!(kind_of(r"\u12"), ParseErrorKind::Lexical);
        assert_eq!(kind_of(r"\uZZZZ"), ParseErrorKind::Lexical);
        assert_eq!(kind_of(r"\uD83D"), ParseErrorKind::Lexical);
        assert_eq!(kind_of(r"\uDE00"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("a\\"), ParseErrorKind::Lexical);
    }

    #[test]
    fn boosts() {
        assert_eq!(
            tokenize("rust^2.5").unwrap(),
            vec![Token::Term {
                text: "rust".into(),
                quoted: false,
                annotation: Annotation {
                    boost: Some(2.5),
                    position_range: None,
                },
            }]
        );
        assert_eq!(kind_of("term^-1"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("^2"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("rust^abc"), ParseErrorKind::Lexical);
    }

    #[test]
    fn fuzzy_terms() {
        assert_eq!(
            tokenize("fever~ bieber~1,2 justin~>1").unwrap(),
            vec![
                Token::Fuzzy {
                    text: "fever".into(),
                    max_edits: None,
                    prefix_length: None,
                    transpositions: true,
                    annotation: Annotation::default(),
                },
                Token::Fuzzy {
                    text: "bieber".into(),
                    max_edits: Some(1),
                    prefix_length: Some(2),
                    transpositions: true,
                    annotation: Annotation::default(),
                },
                Token::Fuzzy {
                    text: "justin".into(),
                    max_edits: Some(1),
                    prefix_length: None,
                    transpositions: false,
                    annotation: Annotation::default(),
                },
            ]
        );
    }

    #[test]
    fn large_edit_distance_is_preserved() {
        match &tokenize("fever~7").unwrap()[0] {
            Token::Fuzzy { max_edits, .. } => assert_eq!(*max_edits, Some(7)),
            other => panic!("expected fuzzy, got {other:?}"),
        }
    }

    #[test]
    fn fuzzy_errors() {
        assert_eq!(kind_of("term~-1"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("term~300"), ParseErrorKind::Lexical);
        assert_eq!(kind_of("te*m~1"), ParseErrorKind::Structural);
        assert_eq!(kind_of("\"a b\" ~2"), ParseErrorKind::Lexical);
    }

    #[test]
    fn wildcard_and_prefix() {
        assert_eq!(
            tokenize("fev* f?ver f*v*r fe\\*").unwrap(),
            vec![
                Token::Prefix {
                    prefix: "fev".into(),
                    annotation: Annotation::default(),
                },
                Token::Wildcard {
                    pattern: "f?ver".into(),
                    annotation: Annotation::default(),
                },
                Token::Wildcard {
                    pattern: "f*v*r".into(),
                    annotation: Annotation::default(),
                },
                term("fe\\*"),
            ]
        );
    }

    #[test]
    fn token_positions() {
        let (tokens, positions) =
            tokenize_with_positions("a title:(b \"c d\") [x TO y]").unwrap();
        assert_eq!(tokens.len(), positions.len());
        assert_eq!(positions, vec![0, 2, 8, 9, 11, 12, 14, 18]);
    }

    #[test]
    fn suffix_error_after_unicode_escape() {
        let query = r"\u0041大大~x";
        let err = tokenize(query).unwrap_err();
        assert_eq!(err.position, Some(13));
        assert_eq!(&query[13..], "x");
        let caret = format!("\n  {}^", " ".repeat(9));
        assert!(err.to_string().contains(&caret));
    }

    #[test]
    fn escaped_characters_keep_query_positions() {
        let err = tokenize(r"\:\:^x").unwrap_err();
        assert_eq!(err.position, Some(5));
    }

    #[test]
    fn position_range_on_term() {
        let tokens = tokenize("bieber@..4").unwrap();
        let range = tokens[0].annotation().unwrap().position_range.unwrap();
        assert_eq!((range.start, range.end), (None, Some(4)));
    }
}
