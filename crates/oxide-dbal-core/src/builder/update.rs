//! UPDATE statement builder.

use super::push_where;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::placeholder::MarkerSequence;
use crate::predicate::Predicate;
use crate::row::Row;
use crate::statement::{Operation, Statement};

/// An UPDATE statement builder.
///
/// Without a predicate every row of the table is updated; nothing here
/// prevents that.
#[derive(Debug, Clone, Default)]
pub struct Update {
    table: String,
    data: Row,
    predicate: Option<Predicate>,
}

impl Update {
    /// Starts an UPDATE of `table` setting the columns of `data`.
    #[must_use]
    pub fn table(table: &str, data: Row) -> Self {
        Self {
            table: String::from(table),
            data,
            predicate: None,
        }
    }

    /// Sets the WHERE predicate.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Builds the statement for `dialect`.
    ///
    /// Returns `None` when there is nothing to set. `NULL` values are
    /// written as `col = NULL` instead of being bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the predicate cannot be compiled.
    pub fn build(self, dialect: &Dialect) -> Result<Option<Statement>> {
        if self.data.is_empty() {
            return Ok(None);
        }
        let mut markers = MarkerSequence::new(dialect.marker);
        let mut values = Vec::new();
        let (columns, data) = self.data.into_parts();

        let assignments: Vec<String> = columns
            .iter()
            .zip(data)
            .map(|(column, value)| {
                if value.is_null() {
                    format!("{column} = NULL")
                } else {
                    values.push(value);
                    format!("{column} = {}", markers.next_marker())
                }
            })
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.table, assignments.join(", "));
        push_where(&mut sql, self.predicate.as_ref(), &mut markers, &mut values)?;

        Ok(Some(Statement {
            operation: Operation::Update,
            table: self.table,
            columns,
            sql,
            values,
        }))
    }
}
