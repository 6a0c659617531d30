//! Tagged scalar values.
//!
//! A `Scalar` is always produced against a declared `ColumnType`; the type of
//! a literal is never inferred from its own shape.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use super::ColumnType;

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 text.
    Str(String),
    /// Timestamp in UTC.
    Timestamp(DateTime<Utc>),
    /// Float vector.
    Vector(Vec<f64>),
}

impl Scalar {
    /// Returns the column type this value belongs to.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Scalar::Int(_) => ColumnType::Int64,
            Scalar::Float(_) => ColumnType::Float64,
            Scalar::Bool(_) => ColumnType::Bool,
            Scalar::Str(_) => ColumnType::Utf8String,
            Scalar::Timestamp(_) => ColumnType::Timestamp,
            Scalar::Vector(_) => ColumnType::FloatVector,
        }
    }

    /// Returns true if this value may be stored in a column of type `ty`.
    pub fn matches_type(&self, ty: ColumnType) -> bool {
        self.column_type() == ty
    }

    /// Returns the vector payload, if this is a vector.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Scalar::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Total order used by ORDER BY.
    ///
    /// Values of the same variant compare naturally (floats with IEEE total
    /// order, vectors lexicographically); values of different variants order
    /// by their column type.
    pub fn total_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            (Scalar::Timestamp(a), Scalar::Timestamp(b)) => a.cmp(b),
            (Scalar::Vector(a), Scalar::Vector(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.total_cmp(y) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Scalar::Int(_) => 0,
            Scalar::Float(_) => 1,
            Scalar::Bool(_) => 2,
            Scalar::Str(_) => 3,
            Scalar::Timestamp(_) => 4,
            Scalar::Vector(_) => 5,
        }
    }

    /// Converts this value to its JSON wire representation.
    ///
    /// Timestamps become RFC 3339 strings. Non-finite floats have no JSON
    /// representation and become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Scalar::Int(i) => JsonValue::from(*i),
            Scalar::Float(f) => float_to_json(*f),
            Scalar::Bool(b) => JsonValue::Bool(*b),
            Scalar::Str(s) => JsonValue::String(s.clone()),
            Scalar::Timestamp(ts) => JsonValue::String(format_timestamp(ts)),
            Scalar::Vector(v) => JsonValue::Array(v.iter().map(|f| float_to_json(*f)).collect()),
        }
    }

    /// Decodes a JSON wire value as a value of column type `ty`.
    pub fn from_json(ty: ColumnType, value: &JsonValue) -> Result<Scalar, String> {
        let mismatch = || format!("expected {} value, got {}", ty, value);
        match ty {
            ColumnType::Int64 => value.as_i64().map(Scalar::Int).ok_or_else(mismatch),
            ColumnType::Float64 => value.as_f64().map(Scalar::Float).ok_or_else(mismatch),
            ColumnType::Bool => value.as_bool().map(Scalar::Bool).ok_or_else(mismatch),
            ColumnType::Utf8String => value
                .as_str()
                .map(|s| Scalar::Str(s.to_string()))
                .ok_or_else(mismatch),
            ColumnType::Timestamp => value
                .as_str()
                .and_then(parse_timestamp)
                .map(Scalar::Timestamp)
                .ok_or_else(mismatch),
            ColumnType::FloatVector => {
                let items = value.as_array().ok_or_else(mismatch)?;
                items
                    .iter()
                    .map(|item| item.as_f64().ok_or_else(mismatch))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Scalar::Vector)
            }
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{:?}", v),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Str(s) => f.write_str(s),
            Scalar::Timestamp(ts) => f.write_str(&format_timestamp(ts)),
            Scalar::Vector(v) => f.write_str(&format_vector(v)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<Vec<f64>> for Scalar {
    fn from(v: Vec<f64>) -> Self {
        Scalar::Vector(v)
    }
}

fn float_to_json(f: f64) -> JsonValue {
    serde_json::Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Formats a float vector in its canonical decimal form, e.g. `[0.1, 2.0]`.
///
/// Every element uses the shortest representation that round-trips and
/// always carries a fractional part or exponent.
pub fn format_vector(v: &[f64]) -> String {
    let items: Vec<String> = v.iter().map(|f| format!("{:?}", f)).collect();
    format!("[{}]", items.join(", "))
}

/// Formats a timestamp as RFC 3339 with a `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset, naive date-times separated by `T` or a
/// space (optionally with fractional seconds), and bare dates. Naive values
/// are interpreted as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_per_type() {
        let ts = parse_timestamp("2024-03-01T12:30:00").unwrap();
        let cases = vec![
            (ColumnType::Int64, Scalar::Int(-7)),
            (ColumnType::Float64, Scalar::Float(2.5)),
            (ColumnType::Bool, Scalar::Bool(true)),
            (ColumnType::Utf8String, Scalar::from("Alice")),
            (ColumnType::Timestamp, Scalar::Timestamp(ts)),
            (ColumnType::FloatVector, Scalar::Vector(vec![0.1, 0.2])),
        ];
        for (ty, value) in cases {
            let decoded = Scalar::from_json(ty, &value.to_json()).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_from_json_rejects_wrong_type() {
        assert!(Scalar::from_json(ColumnType::Int64, &JsonValue::from("1")).is_err());
        assert!(Scalar::from_json(ColumnType::FloatVector, &JsonValue::from(1.0)).is_err());
        assert!(Scalar::from_json(ColumnType::Timestamp, &JsonValue::from("yesterday")).is_err());
    }

    #[test]
    fn test_float_column_accepts_integral_json() {
        let value = Scalar::from_json(ColumnType::Float64, &JsonValue::from(3)).unwrap();
        assert_eq!(value, Scalar::Float(3.0));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = parse_timestamp("2024-01-02T03:04:05Z").unwrap();
        assert_eq!(parse_timestamp("2024-01-02T03:04:05"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 03:04:05"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T04:04:05+01:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-02").unwrap().timestamp(),
            expected.timestamp() - (3 * 3600 + 4 * 60 + 5)
        );
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn test_vector_canonical_form() {
        assert_eq!(format_vector(&[0.1, 2.0, -3.5]), "[0.1, 2.0, -3.5]");
        assert_eq!(format_vector(&[]), "[]");
    }

    #[test]
    fn test_total_cmp() {
        assert_eq!(Scalar::Int(1).total_cmp(&Scalar::Int(2)), Ordering::Less);
        assert_eq!(
            Scalar::from("b").total_cmp(&Scalar::from("a")),
            Ordering::Greater
        );
        assert_eq!(
            Scalar::Vector(vec![1.0, 2.0]).total_cmp(&Scalar::Vector(vec![1.0, 2.0, 0.0])),
            Ordering::Less
        );
        assert_eq!(
            Scalar::Float(f64::NAN).total_cmp(&Scalar::Float(1.0)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::Float(1.0).to_string(), "1.0");
        assert_eq!(Scalar::from("x y").to_string(), "x y");
        assert_eq!(Scalar::Vector(vec![1.0]).to_string(), "[1.0]");
    }
}
