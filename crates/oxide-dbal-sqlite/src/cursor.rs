//! Buffered SQLite cursor.

use std::collections::VecDeque;

use sqlx::{Column as _, Executor as _, Statement as _};
use tracing::trace;

use oxide_dbal::{Cursor, DriverError, DriverResult, RawRow};
use oxide_dbal_core::SqlValue;

use crate::bind::{bind_value, decode_row, driver_error};
use crate::connection::SqliteConnection;

/// Outcome of one statement.
struct Executed {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
    affected: Option<u64>,
}

/// A cursor over a [`SqliteConnection`].
///
/// Result rows are read in full when the statement runs, so the
/// connection stays free for other cursors while this one is consumed.
pub struct SqliteCursor<'c> {
    conn: &'c SqliteConnection,
    columns: Option<Vec<String>>,
    rows: VecDeque<Vec<SqlValue>>,
    row_count: Option<u64>,
    closed: bool,
}

impl<'c> SqliteCursor<'c> {
    pub(crate) const fn new(conn: &'c SqliteConnection) -> Self {
        Self {
            conn,
            columns: None,
            rows: VecDeque::new(),
            row_count: None,
            closed: false,
        }
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::new("Cursor is closed"));
        }
        Ok(())
    }

    fn run(&self, sql: &str, values: &[SqlValue]) -> DriverResult<Executed> {
        self.conn.begin_if_needed()?;
        trace!(sql, params = values.len(), "SQLite execute");
        self.conn.with_inner(|runtime, inner| {
            runtime
                .block_on(execute_on(inner, sql, values))
                .map_err(|failure| failure.0)
        })
    }
}

async fn execute_on(
    inner: &mut sqlx::SqliteConnection,
    sql: &str,
    values: &[SqlValue],
) -> Result<Executed, CursorFailure> {
    let statement = (&mut *inner).prepare(sql).await?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut query = sqlx::query(sql);
    for value in values {
        query = bind_value(query, value);
    }

    if columns.is_empty() {
        let done = query.execute(&mut *inner).await?;
        return Ok(Executed {
            columns,
            rows: vec![],
            affected: Some(done.rows_affected()),
        });
    }
    let fetched = query.fetch_all(&mut *inner).await?;
    let rows = fetched
        .iter()
        .map(decode_row)
        .collect::<DriverResult<Vec<_>>>()?;
    Ok(Executed {
        columns,
        rows,
        affected: None,
    })
}

/// Joins sqlx and decode failures inside one async block.
struct CursorFailure(DriverError);

impl From<sqlx::Error> for CursorFailure {
    fn from(err: sqlx::Error) -> Self {
        Self(driver_error(err))
    }
}

impl From<DriverError> for CursorFailure {
    fn from(err: DriverError) -> Self {
        Self(err)
    }
}

impl Cursor for SqliteCursor<'_> {
    fn execute(&mut self, sql: &str, values: &[SqlValue]) -> DriverResult<()> {
        self.ensure_open()?;
        self.rows.clear();
        let executed = self.run(sql, values)?;
        self.columns = (!executed.columns.is_empty()).then_some(executed.columns);
        self.rows = executed.rows.into();
        self.row_count = executed.affected;
        Ok(())
    }

    fn execute_many(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> DriverResult<()> {
        self.ensure_open()?;
        self.rows.clear();
        self.columns = None;
        let mut total = 0;
        for values in rows {
            total += self.run(sql, values)?.affected.unwrap_or(0);
        }
        self.row_count = Some(total);
        Ok(())
    }

    fn fetch_one(&mut self) -> DriverResult<Option<RawRow>> {
        self.ensure_open()?;
        Ok(self.rows.pop_front().map(RawRow::Tuple))
    }

    fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    fn columns(&self) -> Option<Vec<String>> {
        self.columns.clone()
    }

    fn close(&mut self) {
        self.rows.clear();
        self.closed = true;
    }
}
