//! Read-only gate for caller-supplied SQL.
//!
//! The export routes execute SQL produced by the text-to-SQL service. Before
//! anything reaches the database the statement is scanned: it must be a single
//! `SELECT` (or `WITH ... SELECT`) statement and may not mention any keyword
//! that writes data, changes the schema, or touches connection state. Keywords
//! inside string literals, quoted identifiers and comments are ignored.

use crate::error::{ComputeError, Result};

const FORBIDDEN_KEYWORDS: &[&str] = &[
    "INSERT",
    "UPDATE",
    "DELETE",
    "DROP",
    "ALTER",
    "CREATE",
    "ATTACH",
    "DETACH",
    "PRAGMA",
    "TRUNCATE",
    "GRANT",
    "REVOKE",
    "VACUUM",
    "COPY",
    "INTO",
    "MERGE",
    "UPSERT",
    "REINDEX",
    "LOAD_EXTENSION",
];

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Semicolon,
    Other,
}

/// Validates `sql` and returns the statement without surrounding whitespace and
/// trailing semicolons.
pub fn ensure_read_only(sql: &str) -> Result<&str> {
    let tokens = tokenize(sql)?;

    let first_word = tokens.iter().find_map(|token| match token {
        Token::Word(word) => Some(word.as_str()),
        _ => None,
    });
    match first_word {
        Some("SELECT") | Some("WITH") => {}
        Some(other) => {
            return Err(ComputeError::RejectedSql(format!(
                "only SELECT queries can be exported, got {}",
                other
            )));
        }
        None => return Err(ComputeError::RejectedSql("statement is empty".to_string())),
    }

    // A semicolon is only allowed when nothing but more semicolons follows it
    if let Some(pos) = tokens.iter().position(|t| *t == Token::Semicolon) {
        if tokens[pos..].iter().any(|t| *t != Token::Semicolon) {
            return Err(ComputeError::RejectedSql(
                "multiple statements are not allowed".to_string(),
            ));
        }
    }

    if let Some(keyword) = tokens.iter().find_map(|token| match token {
        Token::Word(word) if FORBIDDEN_KEYWORDS.contains(&word.as_str()) => Some(word),
        _ => None,
    }) {
        return Err(ComputeError::RejectedSql(format!(
            "keyword {} is not allowed in an export query",
            keyword
        )));
    }

    Ok(sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace()))
}

fn tokenize(sql: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '\'' | '"' | '`' => {
                skip_quoted(&mut chars, c)?;
                tokens.push(Token::Other);
            }
            '[' => {
                skip_quoted(&mut chars, ']')?;
                tokens.push(Token::Other);
            }
            '-' if chars.peek() == Some(&'-') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                let mut closed = false;
                for next in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        closed = true;
                        break;
                    }
                    previous = next;
                }
                if !closed {
                    return Err(ComputeError::RejectedSql("unterminated comment".to_string()));
                }
            }
            ';' => tokens.push(Token::Semicolon),
            c if c.is_alphanumeric() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' || next == '$' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(word.to_ascii_uppercase()));
            }
            _ => tokens.push(Token::Other),
        }
    }

    Ok(tokens)
}

/// Consumes a quoted section up to `close`; a doubled closing quote is an escape.
fn skip_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, close: char) -> Result<()> {
    while let Some(c) = chars.next() {
        if c == close {
            if close != ']' && chars.peek() == Some(&close) {
                chars.next();
                continue;
            }
            return Ok(());
        }
    }
    Err(ComputeError::RejectedSql("unterminated quoted section".to_string()))
}
