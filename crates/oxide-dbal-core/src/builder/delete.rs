//! DELETE statement builder.

use super::push_where;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::placeholder::MarkerSequence;
use crate::predicate::Predicate;
use crate::statement::{Operation, Statement};

/// A DELETE statement builder.
///
/// An empty or absent predicate deletes every row.
#[derive(Debug, Clone, Default)]
pub struct Delete {
    table: String,
    predicate: Option<Predicate>,
}

impl Delete {
    /// Starts a DELETE from `table`.
    #[must_use]
    pub fn from(table: &str) -> Self {
        Self {
            table: String::from(table),
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
    /// # Errors
    ///
    /// Returns an error if the predicate cannot be compiled.
    pub fn build(self, dialect: &Dialect) -> Result<Statement> {
        let mut markers = MarkerSequence::new(dialect.marker);
        let mut values = Vec::new();
        let mut sql = format!("DELETE FROM {}", self.table);
        push_where(&mut sql, self.predicate.as_ref(), &mut markers, &mut values)?;
        Ok(Statement {
            operation: Operation::Delete,
            table: self.table,
            columns: vec![],
            sql,
            values,
        })
    }
}
