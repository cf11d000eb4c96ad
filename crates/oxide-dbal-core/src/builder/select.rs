//! SELECT statement builder.

use std::fmt;

use super::push_where;
use crate::dialect::{Dialect, LimitStyle};
use crate::error::Result;
use crate::placeholder::MarkerSequence;
use crate::predicate::Predicate;
use crate::statement::{Operation, Statement};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        })
    }
}

/// A SELECT statement builder.
#[derive(Debug, Clone, Default)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    distinct: bool,
    predicate: Option<Predicate>,
    order_by: Vec<(String, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    /// Starts a SELECT over `table`.
    #[must_use]
    pub fn from(table: &str) -> Self {
        Self {
            table: String::from(table),
            ..Self::default()
        }
    }

    /// Selects `columns` instead of `*`.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| String::from(*c)).collect();
        self
    }

    /// Adds `DISTINCT`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Sets the WHERE predicate.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Appends an ORDER BY term.
    #[must_use]
    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        self.order_by.push((String::from(column), order));
        self
    }

    /// Limits the row count. Zero means unbounded.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = if limit == 0 { None } else { Some(limit) };
        self
    }

    /// Skips the first `offset` rows. Zero means none.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = if offset == 0 { None } else { Some(offset) };
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

        // TOP cannot express an offset; such queries page with OFFSET/FETCH.
        let paged_top = dialect.limit == LimitStyle::Top && self.offset.is_some();

        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if let (LimitStyle::Top, Some(limit), false) = (dialect.limit, self.limit, paged_top) {
            sql.push_str(&format!("TOP {limit} "));
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        push_where(&mut sql, self.predicate.as_ref(), &mut markers, &mut values)?;

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, order)| format!("{column} {order}"))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        } else if paged_top {
            sql.push_str(" ORDER BY (SELECT NULL)");
        }

        match dialect.limit {
            LimitStyle::Limit => {
                if let Some(limit) = self.limit {
                    sql.push_str(&format!(" LIMIT {limit}"));
                }
                if let Some(offset) = self.offset {
                    sql.push_str(&format!(" OFFSET {offset}"));
                }
            }
            LimitStyle::FetchFirst | LimitStyle::Top => {
                if let Some(offset) = self.offset {
                    sql.push_str(&format!(" OFFSET {offset} ROWS"));
                }
                match (dialect.limit, self.limit) {
                    (LimitStyle::FetchFirst, Some(limit)) => {
                        sql.push_str(&format!(" FETCH FIRST {limit} ROWS ONLY"));
                    }
                    (LimitStyle::Top, Some(limit)) if paged_top => {
                        sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
                    }
                    _ => {}
                }
            }
        }

        Ok(Statement {
            operation: Operation::Select,
            table: self.table,
            columns: self.columns,
            sql,
            values,
        })
    }
}
