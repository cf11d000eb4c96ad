//! Uniform execution results.

use oxide_dbal_core::{Row, SqlValue};
use serde::Serialize;

use crate::driver::RawRow;

/// The outcome of a successful statement.
///
/// Failures are reported as [`ExecError`](crate::ExecError) instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Rows returned, keyed by lower-cased column name.
    pub rows: Vec<Row>,
    /// Lower-cased column names in result order.
    pub columns: Vec<String>,
    /// Rows affected, as reported by the driver.
    pub affected: u64,
}

impl ExecutionResult {
    /// A result for a statement that touched `affected` rows.
    #[must_use]
    pub const fn affected(affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            columns: Vec::new(),
            affected,
        }
    }

    /// The first row, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// The first column of the first row.
    #[must_use]
    pub fn scalar(&self) -> Option<&SqlValue> {
        self.first().and_then(|row| row.values().first())
    }
}

/// Builds keyed rows and column names from what a cursor returned.
///
/// Tuple rows are zipped with the metadata names. Mapping rows pass
/// through with their keys lower-cased; without metadata the names come
/// from the first row.
pub(crate) fn normalize(
    raw: Vec<RawRow>,
    metadata: Option<Vec<String>>,
) -> (Vec<String>, Vec<Row>) {
    let columns: Vec<String> = match metadata {
        Some(names) => names.iter().map(|n| n.to_lowercase()).collect(),
        None => raw.first().map(infer_columns).unwrap_or_default(),
    };
    let rows = raw.into_iter().map(|row| normalize_one(row, &columns)).collect();
    (columns, rows)
}

/// Lower-cased column names taken from a row when the cursor has no
/// metadata. Tuples get positional `column{i}` names.
pub(crate) fn infer_columns(raw: &RawRow) -> Vec<String> {
    match raw {
        RawRow::Mapping(row) => row.columns().iter().map(|n| n.to_lowercase()).collect(),
        RawRow::Tuple(values) => (0..values.len()).map(|i| format!("column{i}")).collect(),
    }
}

/// Turns one fetched row into a keyed row.
pub(crate) fn normalize_one(raw: RawRow, columns: &[String]) -> Row {
    match raw {
        RawRow::Tuple(values) => Row::from_parts(columns.to_vec(), values),
        RawRow::Mapping(row) => {
            let (names, values) = row.into_parts();
            Row::from_parts(names.iter().map(|n| n.to_lowercase()).collect(), values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuples_are_zipped_with_lowercased_metadata() {
        let (columns, rows) = normalize(
            vec![RawRow::Tuple(vec![SqlValue::Int(1), SqlValue::from("a")])],
            Some(vec![String::from("ID"), String::from("Name")]),
        );
        assert_eq!(columns, vec!["id", "name"]);
        assert_eq!(rows[0].get("name"), Some(&SqlValue::from("a")));
    }

    #[test]
    fn test_mappings_infer_columns() {
        let row = Row::new().with("Id", 1_i64).with("kind", "x");
        let (columns, rows) = normalize(vec![RawRow::Mapping(row)], None);
        assert_eq!(columns, vec!["id", "kind"]);
        assert_eq!(rows[0].columns().to_vec(), vec!["id", "kind"]);
        assert_eq!(rows[0].get(&columns[0]), Some(&SqlValue::Int(1)));
    }

    #[test]
    fn test_tuples_without_metadata_get_positional_names() {
        let (columns, rows) = normalize(vec![RawRow::Tuple(vec![SqlValue::Int(7)])], None);
        assert_eq!(columns, vec!["column0"]);
        assert_eq!(rows[0].get("column0"), Some(&SqlValue::Int(7)));
    }

    #[test]
    fn test_scalar() {
        let result = ExecutionResult {
            rows: vec![Row::new().with("n", 3_i64)],
            columns: vec![String::from("n")],
            affected: 0,
        };
        assert_eq!(result.scalar(), Some(&SqlValue::Int(3)));
        assert_eq!(ExecutionResult::affected(2).scalar(), None);
    }
}
