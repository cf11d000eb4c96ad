//! Ordered column/value rows.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::value::{SqlValue, ToSqlValue};

/// A row of named values that keeps column order.
///
/// Used both as input data for the builders and as the normalized shape of
/// result rows. Column lookups are linear, which is fine for row widths
/// seen in practice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates a row from parallel column and value vectors.
    ///
    /// Extra entries on the longer side are dropped.
    #[must_use]
    pub fn from_parts(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        let len = columns.len().min(values.len());
        let mut columns = columns;
        let mut values = values;
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    /// Adds or replaces a column, builder style.
    #[must_use]
    pub fn with<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        self.insert(column, value);
        self
    }

    /// Adds or replaces a column.
    pub fn insert<T: ToSqlValue>(&mut self, column: &str, value: T) {
        let value = value.to_sql_value();
        match self.position(column) {
            Some(idx) => self.values[idx] = value,
            None => {
                self.columns.push(String::from(column));
                self.values.push(value);
            }
        }
    }

    /// Returns the value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.position(column).map(|idx| &self.values[idx])
    }

    /// Returns whether the row has the given column.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in column order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Whether both rows name the same set of columns, in any order.
    #[must_use]
    pub fn same_columns(&self, other: &Self) -> bool {
        self.len() == other.len() && self.columns.iter().all(|c| other.contains(c))
    }

    /// Returns the values reordered to follow `columns`.
    ///
    /// Missing columns yield `Null`.
    #[must_use]
    pub fn values_for(&self, columns: &[String]) -> Vec<SqlValue> {
        columns
            .iter()
            .map(|c| self.get(c).cloned().unwrap_or(SqlValue::Null))
            .collect()
    }

    /// Splits the row into its columns and values.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<SqlValue>) {
        (self.columns, self.values)
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

impl<K: AsRef<str>, V: ToSqlValue> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k.as_ref(), v);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_replaces() {
        let row = Row::new().with("b", 1_i64).with("a", 2_i64).with("b", 3_i64);
        assert_eq!(row.columns(), &["b", "a"]);
        assert_eq!(row.get("b"), Some(&SqlValue::Int(3)));
    }

    #[test]
    fn test_same_columns_ignores_order() {
        let r1: Row = [("a", 1_i64), ("b", 2_i64)].into_iter().collect();
        let r2: Row = [("b", 1_i64), ("a", 2_i64)].into_iter().collect();
        let r3: Row = [("a", 1_i64)].into_iter().collect();
        assert!(r1.same_columns(&r2));
        assert!(!r1.same_columns(&r3));
    }

    #[test]
    fn test_values_for_reorders() {
        let row: Row = [("b", 2_i64), ("a", 1_i64)].into_iter().collect();
        let cols = vec![String::from("a"), String::from("b"), String::from("c")];
        assert_eq!(
            row.values_for(&cols),
            vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Null]
        );
    }

    #[test]
    fn test_serialize_as_object() {
        let row = Row::new().with("id", 7_i64).with("name", "x");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"id":7,"name":"x"}"#);
    }
}
