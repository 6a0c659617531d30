//! Literal conversion.
//!
//! A literal's type always comes from the column it is bound to, never from
//! the literal's own shape: `'1'` inserted into an `int` column is rejected
//! and `1` inserted into a `string` column is stored as the text `"1"`.

use zkdb_common::{parse_timestamp, Column, ColumnType, Scalar};

use crate::error::{SqlError, SqlResult};

/// Removes a single leading and a single trailing `'`, if present.
pub fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix('\'').unwrap_or(text);
    text.strip_suffix('\'').unwrap_or(text)
}

/// Parses `[a, b, ...]` as a float vector.
pub fn parse_vector(text: &str) -> Result<Vec<f64>, String> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| format!("expected '[...]', got '{}'", text.trim()))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|item| {
            let item = item.trim();
            parse_finite(item).ok_or_else(|| format!("'{}' is not a number", item))
        })
        .collect()
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Converts raw literal text to a value of `column`'s type.
///
/// - `int`, `float`: strict numeric parse
/// - `bool`: `true` or `1` (case-insensitive) is true, anything else false
/// - `string`: the literal with one pair of surrounding quotes removed
/// - `datetime`: ISO-8601, optionally quoted
/// - `list[float]`: `[a, b, ...]`, optionally quoted
pub fn convert_literal(column: &Column, text: &str) -> SqlResult<Scalar> {
    let raw = text.trim();
    let conversion_error = || SqlError::TypeConversion {
        column: column.name.clone(),
        ty: column.ty,
        literal: raw.to_string(),
    };
    let value = match column.ty {
        ColumnType::Int64 => Scalar::Int(raw.parse().map_err(|_| conversion_error())?),
        ColumnType::Float64 => Scalar::Float(parse_finite(raw).ok_or_else(conversion_error)?),
        ColumnType::Bool => {
            let text = strip_quotes(raw);
            Scalar::Bool(text.eq_ignore_ascii_case("true") || text == "1")
        }
        ColumnType::Utf8String => Scalar::Str(strip_quotes(raw).to_string()),
        ColumnType::Timestamp => Scalar::Timestamp(
            parse_timestamp(strip_quotes(raw)).ok_or_else(conversion_error)?,
        ),
        ColumnType::FloatVector => Scalar::Vector(
            parse_vector(strip_quotes(raw)).map_err(|_| conversion_error())?,
        ),
    };
    Ok(value)
}
