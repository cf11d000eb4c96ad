//! INSERT statement builders.

use super::marker_group;
use crate::dialect::{Dialect, ReturningStyle};
use crate::error::{Result, SqlError};
use crate::placeholder::MarkerSequence;
use crate::row::Row;
use crate::statement::{BulkStatement, Operation, Statement};

/// A single-row INSERT builder.
#[derive(Debug, Clone, Default)]
pub struct Insert {
    table: String,
    row: Row,
    returning: Vec<String>,
}

impl Insert {
    /// Starts an INSERT of `row` into `table`.
    #[must_use]
    pub fn into_table(table: &str, row: Row) -> Self {
        Self {
            table: String::from(table),
            row,
            returning: vec![],
        }
    }

    /// Requests `columns` of the inserted row back.
    ///
    /// Ignored by dialects that cannot return rows from an insert; callers
    /// then have to re-query.
    #[must_use]
    pub fn returning(mut self, columns: &[&str]) -> Self {
        self.returning = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Builds the statement for `dialect`.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible like the other builders.
    pub fn build(self, dialect: &Dialect) -> Result<Statement> {
        let mut markers = MarkerSequence::new(dialect.marker);
        let (columns, values) = self.row.into_parts();
        let style = if self.returning.is_empty() {
            ReturningStyle::None
        } else {
            dialect.upsert.returning
        };

        let mut sql = format!("INSERT INTO {}", self.table);
        if !columns.is_empty() {
            sql.push_str(&format!(" ({})", columns.join(", ")));
        }
        if style == ReturningStyle::Output {
            let inserted: Vec<String> = self
                .returning
                .iter()
                .map(|c| format!("INSERTED.{c}"))
                .collect();
            sql.push_str(&format!(" OUTPUT {}", inserted.join(", ")));
        }
        if columns.is_empty() {
            sql.push_str(" DEFAULT VALUES");
        } else {
            sql.push_str(" VALUES ");
            sql.push_str(&marker_group(&mut markers, columns.len()));
        }

        let returned = self.returning.join(", ");
        match style {
            ReturningStyle::Returning => sql.push_str(&format!(" RETURNING {returned}")),
            ReturningStyle::FinalTable => {
                sql = format!("SELECT {returned} FROM FINAL TABLE ({sql})");
            }
            ReturningStyle::Output | ReturningStyle::None => {}
        }

        Ok(Statement {
            operation: Operation::Insert,
            table: self.table,
            columns,
            sql,
            values,
        })
    }
}

/// A multi-row INSERT builder.
///
/// Produces one single-row SQL text executed once per row, so drivers can
/// use their batch execution path.
#[derive(Debug, Clone, Default)]
pub struct InsertMany {
    table: String,
    rows: Vec<Row>,
}

impl InsertMany {
    /// Starts an INSERT of `rows` into `table`.
    #[must_use]
    pub fn into_table(table: &str, rows: Vec<Row>) -> Self {
        Self {
            table: String::from(table),
            rows,
        }
    }

    /// Builds the bulk statement for `dialect`.
    ///
    /// Column order follows the first row; later rows may list the same
    /// columns in any order.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::InconsistentColumns`] naming the first row
    /// whose column set differs from the first row's.
    pub fn build(self, dialect: &Dialect) -> Result<BulkStatement> {
        let Some(first) = self.rows.first() else {
            return Ok(BulkStatement {
                table: self.table,
                columns: vec![],
                sql: String::new(),
                rows: vec![],
            });
        };
        if let Some(index) = self.rows.iter().position(|r| !r.same_columns(first)) {
            return Err(SqlError::InconsistentColumns { index });
        }

        let columns = first.columns().to_vec();
        let mut markers = MarkerSequence::new(dialect.marker);
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            columns.join(", "),
            marker_group(&mut markers, columns.len())
        );
        let rows = self.rows.iter().map(|r| r.values_for(&columns)).collect();

        Ok(BulkStatement {
            table: self.table,
            columns,
            sql,
            rows,
        })
    }
}
