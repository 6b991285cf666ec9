//! Rendering and JSON serialization for CLI output.

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;
use spanq_query::{Annotation, ClauseKind, Token};

/// JSON form of one token.
#[derive(Serialize)]
struct JsonToken<'a> {
    /// Position in the token sequence.
    index: usize,
    /// Short kind name.
    kind: &'static str,
    /// Indices of the tokens a clause owns.
    owns: Option<[usize; 2]>,
    /// The token itself.
    token: &'a Token,
}

/// Serializes a token sequence as pretty JSON.
pub fn tokens_json(tokens: &[Token]) -> serde_json::Result<String> {
    let rows: Vec<_> = tokens
        .iter()
        .enumerate()
        .map(|(index, token)| JsonToken {
            index,
            kind: token.kind_name(),
            owns: owned_range(token),
            token,
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}

/// Renders a token sequence as a table of index, kind, detail and owned range.
pub fn tokens_table(tokens: &[Token]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["#", "Kind", "Detail", "Owns"]);
    for (index, token) in tokens.iter().enumerate() {
        let owns = owned_range(token).map_or_else(String::new, |[s, e]| format!("{s}..{e}"));
        table.add_row(vec![
            Cell::new(index.to_string()),
            Cell::new(token.kind_name()),
            Cell::new(token_detail(token)),
            Cell::new(owns),
        ]);
    }
    table
}

/// The `start..end` range owned by a clause token.
fn owned_range(token: &Token) -> Option<[usize; 2]> {
    match token {
        Token::Clause(clause) => Some([clause.start, clause.end]),
        _ => None,
    }
}

/// One-line description of a token's payload.
pub fn token_detail(token: &Token) -> String {
    let base = match token {
        Token::Term { text, quoted, .. } => {
            if *quoted {
                format!("'{text}'")
            } else {
                text.clone()
            }
        }
        Token::Regex { pattern, .. } => format!("/{pattern}/"),
        Token::Wildcard { pattern, .. } => pattern.clone(),
        Token::Prefix { prefix, .. } => format!("{prefix}*"),
        Token::Fuzzy {
            text,
            max_edits,
            prefix_length,
            transpositions,
            ..
        } => {
            let marker = if *transpositions { "~" } else { "~>" };
            let edits = max_edits.map_or_else(|| "default".to_string(), |e| e.to_string());
            let prefix = prefix_length.map_or_else(|| "default".to_string(), |p| p.to_string());
            format!("{text}{marker} edits={edits} prefix={prefix}")
        }
        Token::Range {
            start,
            end,
            start_inclusive,
            end_inclusive,
            ..
        } => format!(
            "{}{} TO {}{}",
            if *start_inclusive { '[' } else { '{' },
            start.as_deref().unwrap_or("*"),
            end.as_deref().unwrap_or("*"),
            if *end_inclusive { ']' } else { '}' },
        ),
        Token::AllDocs { .. } => "*:*".to_string(),
        Token::Field(name) => format!("{name}:"),
        Token::Boolean(op) => op.to_string(),
        Token::Open(marker) => marker.delimiter.open_char().to_string(),
        Token::Clause(clause) => clause_detail(&clause.kind),
    };

    match token.annotation() {
        Some(annotation) if !annotation.is_empty() => {
            format!("{base} {}", annotation_detail(annotation))
        }
        _ => base,
    }
}

/// Describes a resolved clause kind.
fn clause_detail(kind: &ClauseKind) -> String {
    match kind {
        ClauseKind::Or {
            minimum_should_match: Some(n),
        } => format!("() min={n}"),
        ClauseKind::Or { .. } => "()".to_string(),
        ClauseKind::Near {
            delimiter,
            in_order,
            slop,
        } => {
            let mut out = format!("{}{}", delimiter.open_char(), delimiter.close_char());
            if let Some(slop) = slop {
                out.push_str(&format!(" slop={slop}"));
            }
            if *in_order == Some(true) {
                out.push_str(" ordered");
            }
            out
        }
        ClauseKind::NotNear {
            delimiter,
            pre,
            post,
        } => {
            let pre = pre.unwrap_or(0);
            let post = post.unwrap_or(pre);
            format!(
                "{}{} not-near pre={pre} post={post}",
                delimiter.open_char(),
                delimiter.close_char()
            )
        }
    }
}

/// Formats a boost and position range the way they are written in a query.
fn annotation_detail(annotation: &Annotation) -> String {
    let mut out = String::new();
    if let Some(boost) = annotation.boost {
        out.push_str(&format!("^{boost}"));
    }
    if let Some(range) = annotation.position_range {
        out.push_str(&format!("@{range}"));
    }
    out
}
