//! Driver boundary.
//!
//! A driver provides a [`Connection`] that hands out [`Cursor`]s. All
//! methods take `&self` on the connection so that an open cursor (for
//! instance inside a [`RowStream`](crate::stream::RowStream)) and writes
//! issued while consuming it can coexist. Drivers use interior
//! mutability where they need it.
//!
//! Nothing here is thread-safe by contract; callers synchronise shared
//! connections themselves.

use std::error::Error as StdError;
use std::ops::{Deref, DerefMut};

use oxide_dbal_core::{Row, SqlValue};

/// An error reported by a driver.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl DriverError {
    /// Creates an error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying one.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The driver message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type at the driver boundary.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// A row as a driver produces it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRow {
    /// Values in cursor column order.
    Tuple(Vec<SqlValue>),
    /// Values already keyed by column.
    Mapping(Row),
}

/// A statement handle.
pub trait Cursor {
    /// Executes `sql` with `values` bound in order.
    fn execute(&mut self, sql: &str, values: &[SqlValue]) -> DriverResult<()>;

    /// Executes `sql` once per value row.
    ///
    /// [`row_count`](Self::row_count) afterwards reports the total.
    fn execute_many(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> DriverResult<()>;

    /// Fetches the next row of the last statement.
    fn fetch_one(&mut self) -> DriverResult<Option<RawRow>>;

    /// Fetches every remaining row.
    fn fetch_all(&mut self) -> DriverResult<Vec<RawRow>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_one()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Rows affected by the last statement, if the driver knows.
    fn row_count(&self) -> Option<u64>;

    /// Result column names of the last statement, if it has any.
    fn columns(&self) -> Option<Vec<String>>;

    /// Releases the cursor. Further calls must be harmless.
    fn close(&mut self);
}

/// A database connection.
pub trait Connection {
    /// Opens a cursor.
    fn cursor(&self) -> DriverResult<Box<dyn Cursor + '_>>;

    /// Commits the current transaction.
    fn commit(&self) -> DriverResult<()>;

    /// Rolls back the current transaction.
    fn rollback(&self) -> DriverResult<()>;

    /// Whether every statement commits on its own.
    fn autocommit(&self) -> DriverResult<bool>;

    /// Switches autocommit on or off.
    fn set_autocommit(&self, enabled: bool) -> DriverResult<()>;
}

impl<C: Connection + ?Sized> Connection for &C {
    fn cursor(&self) -> DriverResult<Box<dyn Cursor + '_>> {
        (**self).cursor()
    }

    fn commit(&self) -> DriverResult<()> {
        (**self).commit()
    }

    fn rollback(&self) -> DriverResult<()> {
        (**self).rollback()
    }

    fn autocommit(&self) -> DriverResult<bool> {
        (**self).autocommit()
    }

    fn set_autocommit(&self, enabled: bool) -> DriverResult<()> {
        (**self).set_autocommit(enabled)
    }
}

/// Closes its cursor when dropped, on every exit path.
pub struct CursorGuard<'c> {
    cursor: Box<dyn Cursor + 'c>,
}

impl<'c> CursorGuard<'c> {
    /// Opens a cursor on `conn`.
    ///
    /// # Errors
    ///
    /// Returns the driver error if no cursor can be opened.
    pub fn open<C: Connection + ?Sized>(conn: &'c C) -> DriverResult<Self> {
        Ok(Self {
            cursor: conn.cursor()?,
        })
    }
}

impl<'c> Deref for CursorGuard<'c> {
    type Target = dyn Cursor + 'c;

    fn deref(&self) -> &Self::Target {
        &*self.cursor
    }
}

impl DerefMut for CursorGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.cursor
    }
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        self.cursor.close();
    }
}

impl std::fmt::Debug for CursorGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorGuard").finish_non_exhaustive()
    }
}
