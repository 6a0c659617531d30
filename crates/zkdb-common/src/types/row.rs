//! Row representation.

use std::fmt;

use serde::{Serialize, Serializer};

use super::Scalar;

/// A single row of values, ordered like the owning table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The values in this row.
    values: Vec<Scalar>,
}

impl Row {
    /// Creates a new row with the given values.
    pub fn new(values: Vec<Scalar>) -> Self {
        Self { values }
    }

    /// Returns the number of values in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at the given index.
    pub fn get(&self, index: usize) -> Option<&Scalar> {
        self.values.get(index)
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> impl Iterator<Item = &Scalar> {
        self.values.iter()
    }

    /// Returns the values as a slice.
    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    /// Consumes the row and returns the values.
    pub fn into_values(self) -> Vec<Scalar> {
        self.values
    }

    /// Projects this row to the given column indices.
    ///
    /// Indices must be in range; callers resolve them against the schema.
    pub fn project(&self, indices: &[usize]) -> Row {
        Row {
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

impl From<Vec<Scalar>> for Row {
    fn from(values: Vec<Scalar>) -> Self {
        Self::new(values)
    }
}

impl IntoIterator for Row {
    type Item = Scalar;
    type IntoIter = std::vec::IntoIter<Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_project() {
        let row = Row::new(vec![Scalar::Int(1), Scalar::from("Alice"), Scalar::Bool(true)]);
        let projected = row.project(&[2, 0]);
        assert_eq!(projected.values(), &[Scalar::Bool(true), Scalar::Int(1)]);
    }

    #[test]
    fn test_row_serializes_as_array() {
        let row = Row::new(vec![Scalar::Int(1), Scalar::from("Alice")]);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"[1,"Alice"]"#);
    }

    #[test]
    fn test_row_display() {
        let row = Row::new(vec![Scalar::Int(1), Scalar::Vector(vec![0.5])]);
        assert_eq!(row.to_string(), "(1, [0.5])");
    }
}
