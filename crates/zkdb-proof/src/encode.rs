//! Cell encoding.
//!
//! Every cell maps to a field element that depends on its column name, its
//! position in the table schema and its value, so equal values in different
//! columns encode differently.

use std::collections::HashSet;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::FromPrimitive;
use sha2::{Digest, Sha256};
use zkdb_common::{format_vector, ColumnType, Row, Scalar, Table, FLOAT_FIXED_POINT_SCALE};

use crate::error::{ProofError, ProofResult};
use crate::field::FieldParams;

fn sha256_int(data: &[u8]) -> BigUint {
    BigUint::from_bytes_be(&Sha256::digest(data))
}

/// Encodes a typed value as an integer.
///
/// | type | encoding |
/// |---|---|
/// | `Utf8String` | big-endian integer of the UTF-8 bytes |
/// | `Int64` | the value |
/// | `Float64` | `round(value × 10⁸)` |
/// | `Bool` | 0 or 1 |
/// | `Timestamp` | Unix seconds |
/// | `FloatVector` | SHA-256 of the canonical decimal form |
pub fn encode_scalar(ty: ColumnType, value: &Scalar) -> ProofResult<BigInt> {
    if !value.matches_type(ty) {
        return Err(ProofError::Encoding(format!(
            "expected {} value, got {}",
            ty,
            value.column_type()
        )));
    }
    let encoded = match value {
        Scalar::Str(s) => BigInt::from_bytes_be(Sign::Plus, s.as_bytes()),
        Scalar::Int(i) => BigInt::from(*i),
        Scalar::Float(f) => BigInt::from_f64((f * FLOAT_FIXED_POINT_SCALE).round())
            .ok_or_else(|| ProofError::Encoding(format!("non-finite float {}", f)))?,
        Scalar::Bool(b) => BigInt::from(u8::from(*b)),
        Scalar::Timestamp(ts) => BigInt::from(ts.timestamp()),
        Scalar::Vector(v) => BigInt::from(sha256_int(format_vector(v).as_bytes())),
    };
    Ok(encoded)
}

/// Encodes one cell as a field element:
/// `H(H(column_name) ‖ position ‖ encode_scalar(value)) mod curve_order`,
/// where each operand is concatenated in decimal.
pub fn encode_cell(
    column_name: &str,
    ty: ColumnType,
    value: &Scalar,
    position: usize,
    params: &FieldParams,
) -> ProofResult<BigUint> {
    let column_id = sha256_int(column_name.as_bytes());
    let scalar = encode_scalar(ty, value)?;
    let preimage = format!("{}{}{}", column_id, position, scalar);
    Ok(sha256_int(preimage.as_bytes()) % &params.curve_order)
}

/// Encodes every cell of `table`, row-major.
pub fn table_polynomial(table: &Table, params: &FieldParams) -> ProofResult<Vec<BigUint>> {
    let mut roots = Vec::with_capacity(table.num_rows() * table.num_columns());
    for row in &table.rows {
        for (position, (column, value)) in table.columns.iter().zip(row.iter()).enumerate() {
            roots.push(encode_cell(&column.name, column.ty, value, position, params)?);
        }
    }
    Ok(roots)
}

/// Encodes the cells of `rows`, row-major.
///
/// Each row holds the values of `projected_columns` in that order; an empty
/// projection means the table's full column list. Cells are encoded with the
/// column's position in the table schema, so a projected cell encodes exactly
/// like its source cell.
pub fn record_polynomial(
    rows: &[Row],
    table: &Table,
    projected_columns: &[String],
    params: &FieldParams,
) -> ProofResult<Vec<BigUint>> {
    let columns: Vec<(usize, &str, ColumnType)> = if projected_columns.is_empty() {
        table
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.name.as_str(), c.ty))
            .collect()
    } else {
        projected_columns
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .map(|i| (i, name.as_str(), table.columns[i].ty))
                    .ok_or_else(|| ProofError::UnknownColumn(name.clone()))
            })
            .collect::<ProofResult<_>>()?
    };

    // A column projected twice is one cell of the source row.
    let mut seen = HashSet::new();
    let first: Vec<bool> = columns.iter().map(|&(p, _, _)| seen.insert(p)).collect();

    let mut roots = Vec::with_capacity(rows.len() * seen.len());
    for row in rows {
        for ((&(position, name, ty), value), _) in columns
            .iter()
            .zip(row.iter())
            .zip(&first)
            .filter(|(_, &keep)| keep)
        {
            roots.push(encode_cell(name, ty, value, position, params)?);
        }
    }
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;
    use zkdb_common::{parse_timestamp, Column};

    fn params() -> FieldParams {
        FieldParams::bn254()
    }

    #[test]
    fn test_encode_scalar_per_type() {
        assert_eq!(
            encode_scalar(ColumnType::Utf8String, &Scalar::from("AB")).unwrap(),
            BigInt::from(0x4142)
        );
        assert_eq!(
            encode_scalar(ColumnType::Int64, &Scalar::Int(-3)).unwrap(),
            BigInt::from(-3)
        );
        assert_eq!(
            encode_scalar(ColumnType::Float64, &Scalar::Float(1.5)).unwrap(),
            BigInt::from(150_000_000)
        );
        assert_eq!(
            encode_scalar(ColumnType::Bool, &Scalar::Bool(true)).unwrap(),
            BigInt::from(1)
        );
        let ts = parse_timestamp("1970-01-02T00:00:00Z").unwrap();
        assert_eq!(
            encode_scalar(ColumnType::Timestamp, &Scalar::Timestamp(ts)).unwrap(),
            BigInt::from(86_400)
        );
        assert!(encode_scalar(ColumnType::Utf8String, &Scalar::from("")).unwrap().is_zero());
    }

    #[test]
    fn test_encode_scalar_is_deterministic() {
        let values = [
            (ColumnType::Utf8String, Scalar::from("Alice")),
            (ColumnType::Int64, Scalar::Int(42)),
            (ColumnType::Float64, Scalar::Float(0.123456789)),
            (ColumnType::Bool, Scalar::Bool(false)),
            (
                ColumnType::Timestamp,
                Scalar::Timestamp(parse_timestamp("2024-05-01T10:00:00Z").unwrap()),
            ),
            (ColumnType::FloatVector, Scalar::Vector(vec![0.1, 0.2, 0.3])),
        ];
        for (ty, value) in &values {
            assert_eq!(
                encode_scalar(*ty, value).unwrap(),
                encode_scalar(*ty, &value.clone()).unwrap()
            );
        }
    }

    #[test]
    fn test_encode_scalar_rejects_mismatched_type() {
        assert!(matches!(
            encode_scalar(ColumnType::Int64, &Scalar::from("1")),
            Err(ProofError::Encoding(_))
        ));
        assert!(encode_scalar(ColumnType::Float64, &Scalar::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_vector_encoding_hashes_canonical_form() {
        let expected = BigInt::from(sha256_int(b"[0.1, 0.2]"));
        assert_eq!(
            encode_scalar(ColumnType::FloatVector, &Scalar::Vector(vec![0.1, 0.2])).unwrap(),
            expected
        );
    }

    #[test]
    fn test_encode_cell_depends_on_column_and_position() {
        let p = params();
        let value = Scalar::Int(7);
        let a = encode_cell("a", ColumnType::Int64, &value, 0, &p).unwrap();
        let b = encode_cell("b", ColumnType::Int64, &value, 0, &p).unwrap();
        let a1 = encode_cell("a", ColumnType::Int64, &value, 1, &p).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, a1);
        assert!(a < p.curve_order);
    }

    #[test]
    fn test_projected_record_matches_source_cells() {
        let p = params();
        let mut table = Table::new(
            "users",
            vec![
                Column::new("id", ColumnType::Int64),
                Column::new("name", ColumnType::Utf8String),
            ],
        );
        table
            .push_row(Row::new(vec![Scalar::Int(1), Scalar::from("Alice")]))
            .unwrap();

        let table_roots = table_polynomial(&table, &p).unwrap();
        let record = record_polynomial(
            &[Row::new(vec![Scalar::from("Alice")])],
            &table,
            &["name".to_string()],
            &p,
        )
        .unwrap();
        assert_eq!(record, vec![table_roots[1].clone()]);

        let full = record_polynomial(&table.rows, &table, &[], &p).unwrap();
        assert_eq!(full, table_roots);

        let repeated = record_polynomial(
            &[Row::new(vec![Scalar::Int(1), Scalar::Int(1), Scalar::from("Alice")])],
            &table,
            &["id".to_string(), "id".to_string(), "name".to_string()],
            &p,
        )
        .unwrap();
        assert_eq!(repeated, table_roots);
    }

    #[test]
    fn test_record_polynomial_unknown_column() {
        let table = Table::new("t", vec![Column::new("id", ColumnType::Int64)]);
        let err = record_polynomial(&[], &table, &["nope".to_string()], &params()).unwrap_err();
        assert_eq!(err, ProofError::UnknownColumn("nope".to_string()));
    }
}
