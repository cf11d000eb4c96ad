//! Built statements.

use std::fmt;

use crate::dialect::Dialect;
use crate::serialize::{finalize, Prepared};
use crate::value::SqlValue;

/// The kind of statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `SELECT`
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
    /// Upsert, either inline or as `MERGE INTO`.
    Merge,
    /// Caller supplied SQL.
    Raw,
}

impl Operation {
    /// Lower-case name, used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Merge => "merge",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL text with the values for its placeholders.
///
/// `values` holds one entry per placeholder in `sql`; raw literals are
/// still among them until [`Statement::prepare`] injects them.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Kind of statement.
    pub operation: Operation,
    /// Target table; empty for raw SQL.
    pub table: String,
    /// Columns written or selected; empty means all.
    pub columns: Vec<String>,
    /// SQL text using the dialect's positional marker.
    pub sql: String,
    /// Values in placeholder order.
    pub values: Vec<SqlValue>,
}

impl Statement {
    /// Wraps caller supplied SQL.
    #[must_use]
    pub fn raw(sql: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self {
            operation: Operation::Raw,
            table: String::new(),
            columns: vec![],
            sql: sql.into(),
            values,
        }
    }

    /// Injects raw literals and escapes percents for `dialect`.
    #[must_use]
    pub fn prepare(self, dialect: &Dialect) -> Prepared {
        finalize(&self.sql, self.values, dialect)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// One SQL text executed once per value row.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkStatement {
    /// Target table.
    pub table: String,
    /// Columns, in the order of each value row.
    pub columns: Vec<String>,
    /// SQL text with one row of placeholders.
    pub sql: String,
    /// One entry per input row.
    pub rows: Vec<Vec<SqlValue>>,
}

impl BulkStatement {
    /// Prepares every row for `dialect`.
    ///
    /// Rows whose raw literals produce the same final SQL are grouped in
    /// input order, so each group can go to the driver in one call.
    #[must_use]
    pub fn prepare(self, dialect: &Dialect) -> Vec<(String, Vec<Vec<SqlValue>>)> {
        let mut groups: Vec<(String, Vec<Vec<SqlValue>>)> = Vec::new();
        for row in self.rows {
            let prepared = finalize(&self.sql, row, dialect);
            match groups.last_mut() {
                Some((sql, rows)) if *sql == prepared.sql => rows.push(prepared.values),
                _ => groups.push((prepared.sql, vec![prepared.values])),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_raw_statement() {
        let prepared = Statement::raw(
            "UPDATE t SET ts = %s WHERE name LIKE 'a%'",
            vec![SqlValue::raw("NOW()")],
        )
        .prepare(&Dialect::POSTGRES);
        assert_eq!(prepared.sql, "UPDATE t SET ts = NOW() WHERE name LIKE 'a%%'");
        assert!(prepared.values.is_empty());
    }

    #[test]
    fn test_bulk_groups_by_final_sql() {
        let bulk = BulkStatement {
            table: String::from("t"),
            columns: vec![String::from("a"), String::from("b")],
            sql: String::from("INSERT INTO t (a, b) VALUES (?, ?)"),
            rows: vec![
                vec![SqlValue::Int(1), SqlValue::Int(2)],
                vec![SqlValue::Int(3), SqlValue::Int(4)],
                vec![SqlValue::Int(5), SqlValue::raw("CURRENT_TIMESTAMP")],
                vec![SqlValue::Int(6), SqlValue::Int(7)],
            ],
        };
        let groups = bulk.prepare(&Dialect::SQLITE);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "INSERT INTO t (a, b) VALUES (?, CURRENT_TIMESTAMP)");
        assert_eq!(groups[1].1, vec![vec![SqlValue::Int(5)]]);
        assert_eq!(groups[2].1.len(), 1);
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::Merge.to_string(), "merge");
        assert_eq!(Operation::Raw.as_str(), "raw");
    }
}
