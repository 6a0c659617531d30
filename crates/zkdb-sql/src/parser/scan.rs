//! Quote- and bracket-aware scanning helpers.
//!
//! Statements are split with plain string scanning rather than a tokenizer.
//! "Top level" below means outside single-quoted literals and outside any
//! `(...)` or `[...]` nesting.

use super::{ParseError, ParseResult};

/// Collapses whitespace runs outside quoted literals into single spaces and
/// trims the result, dropping one trailing `;`.
pub(crate) fn normalize(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_quote = false;
    let mut pending_space = false;
    for c in sql.trim().chars() {
        if !in_quote && c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        if c == '\'' {
            in_quote = !in_quote;
        }
        out.push(c);
    }
    let trimmed = out.trim_end_matches(';').trim_end();
    trimmed.to_string()
}

/// Returns the byte offsets of top-level characters.
fn top_level_offsets(text: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut in_quote = false;
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        if c == '\'' {
            in_quote = !in_quote;
            continue;
        }
        if in_quote {
            continue;
        }
        match c {
            '(' | '[' => {
                if depth == 0 {
                    offsets.push(i);
                }
                depth += 1;
            }
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => offsets.push(i),
            _ => {}
        }
    }
    offsets
}

/// Splits on top-level occurrences of `sep`, trimming each part.
pub(crate) fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for i in top_level_offsets(text) {
        if text[i..].starts_with(sep) {
            parts.push(text[start..i].trim());
            start = i + sep.len_utf8();
        }
    }
    parts.push(text[start..].trim());
    parts
}

/// Finds the first top-level occurrence of `keyword` as a whole word.
pub(crate) fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    find_keyword_from(text, keyword, 0)
}

fn find_keyword_from(text: &str, keyword: &str, from: usize) -> Option<usize> {
    top_level_offsets(text).into_iter().find(|&i| {
        i >= from
            && text[i..].starts_with(keyword)
            && text[..i].chars().next_back().map_or(true, char::is_whitespace)
            && text[i + keyword.len()..]
                .chars()
                .next()
                .map_or(true, |c| c.is_whitespace() || c == '(' || c == '[')
    })
}

/// Counts top-level whole-word occurrences of `keyword`.
pub(crate) fn count_keyword(text: &str, keyword: &str) -> usize {
    let mut count = 0;
    let mut from = 0;
    while let Some(i) = find_keyword_from(text, keyword, from) {
        count += 1;
        from = i + keyword.len();
    }
    count
}

/// Returns the contents of each top-level `( ... )` group in `text`.
///
/// Groups may be separated by commas and whitespace; anything else between
/// them is a syntax error.
pub(crate) fn paren_groups(text: &str) -> ParseResult<Vec<&str>> {
    let mut groups = Vec::new();
    let mut in_quote = false;
    let mut depth = 0usize;
    let mut start = 0;
    let mut expect_separator = false;

    for (i, c) in text.char_indices() {
        if in_quote {
            if c == '\'' {
                in_quote = false;
            }
            continue;
        }
        match c {
            '\'' if depth > 0 => in_quote = true,
            '(' | '[' => {
                if depth == 0 {
                    if c != '(' || expect_separator {
                        return Err(ParseError::Syntax(format!(
                            "unexpected '{}' in value list",
                            c
                        )));
                    }
                    start = i + 1;
                }
                depth += 1;
            }
            ')' | ']' => {
                if depth == 0 {
                    return Err(ParseError::Syntax(format!("unbalanced '{}'", c)));
                }
                depth -= 1;
                if depth == 0 {
                    groups.push(text[start..i].trim());
                    expect_separator = true;
                }
            }
            ',' if depth == 0 => {
                if !expect_separator {
                    return Err(ParseError::Syntax("empty value group".to_string()));
                }
                expect_separator = false;
            }
            c if depth == 0 && c.is_whitespace() => {}
            c if depth == 0 => {
                return Err(ParseError::Syntax(format!(
                    "unexpected '{}' in value list",
                    c
                )));
            }
            _ => {}
        }
    }

    if in_quote || depth != 0 {
        return Err(ParseError::Syntax("unterminated value group".to_string()));
    }
    if groups.is_empty() || !expect_separator {
        return Err(ParseError::Syntax("expected at least one value group".to_string()));
    }
    Ok(groups)
}

/// Returns the text inside a leading `(` and its matching trailing `)`.
pub(crate) fn parenthesized(text: &str) -> ParseResult<&str> {
    let text = text.trim();
    let groups = paren_groups(text)?;
    match groups.as_slice() {
        [inner] if text.starts_with('(') && text.ends_with(')') => Ok(inner),
        _ => Err(ParseError::Syntax(format!(
            "expected a single parenthesized list, got '{}'",
            text
        ))),
    }
}

/// Validates an identifier: ASCII letters, digits and `_`, not starting
/// with a digit.
pub(crate) fn identifier(text: &str) -> ParseResult<String> {
    let text = text.trim();
    let mut chars = text.chars();
    let valid = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(text.to_string())
    } else {
        Err(ParseError::Syntax(format!("invalid identifier '{}'", text)))
    }
}
