//! Execution core.
//!
//! Every statement goes through the same steps before reaching a cursor:
//! placeholder translation, raw literal injection, percent escaping. The
//! cursor is released through a [`CursorGuard`] whatever happens.

use oxide_dbal_core::placeholder::translate;
use oxide_dbal_core::serialize::finalize;
use oxide_dbal_core::{BulkStatement, Dialect, Params, Prepared, Statement};
use tracing::{debug, warn};

use crate::driver::{Connection, CursorGuard, DriverError};
use crate::error::{ExecError, Result};
use crate::result::{normalize, ExecutionResult};

/// Translates caller SQL and parameters into driver-ready form.
///
/// # Errors
///
/// Returns the translation error; nothing is executed.
pub fn prepare(sql: &str, params: Params, dialect: &Dialect) -> Result<Prepared> {
    let (sql, values) = translate(sql, params, dialect.marker)?;
    Ok(finalize(&sql, values, dialect))
}

/// Whether rows are read back after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Read every row the statement produced.
    Rows,
    /// Only report the affected count.
    Nothing,
}

/// Runs a prepared statement on a fresh cursor.
///
/// # Errors
///
/// Returns [`ExecError::StatementExecution`] when the engine rejects the
/// statement, [`ExecError::Driver`] for cursor or fetch failures.
pub fn run<C: Connection + ?Sized>(
    conn: &C,
    prepared: &Prepared,
    fetch: Fetch,
) -> Result<ExecutionResult> {
    debug!(sql = %prepared.sql, params = prepared.values.len(), "Executing SQL");
    let mut cursor = CursorGuard::open(conn)?;
    cursor
        .execute(&prepared.sql, &prepared.values)
        .map_err(|e| statement_failed(&prepared.sql, &e))?;

    let (columns, rows) = match fetch {
        Fetch::Rows => normalize(cursor.fetch_all()?, cursor.columns()),
        Fetch::Nothing => (Vec::new(), Vec::new()),
    };
    let affected = cursor.row_count().unwrap_or(rows.len() as u64);
    Ok(ExecutionResult {
        rows,
        columns,
        affected,
    })
}

/// Builds and runs a statement from the builders.
///
/// # Errors
///
/// See [`run`].
pub fn run_statement<C: Connection + ?Sized>(
    conn: &C,
    dialect: &Dialect,
    statement: Statement,
    fetch: Fetch,
) -> Result<ExecutionResult> {
    let operation = statement.operation;
    let prepared = statement.prepare(dialect);
    debug!(operation = %operation, "Running statement");
    run(conn, &prepared, fetch)
}

/// Runs a bulk statement in chunks of `batch_size` rows.
///
/// Returns the total affected count; chunks whose count the driver does
/// not report count as their row count.
///
/// # Errors
///
/// Stops at the first failing chunk.
pub fn run_bulk<C: Connection + ?Sized>(
    conn: &C,
    dialect: &Dialect,
    bulk: BulkStatement,
    batch_size: usize,
) -> Result<u64> {
    if bulk.rows.is_empty() {
        return Ok(0);
    }
    let table = bulk.table.clone();
    let mut cursor = CursorGuard::open(conn)?;
    let mut affected = 0;
    for (sql, rows) in bulk.prepare(dialect) {
        for chunk in rows.chunks(batch_size.max(1)) {
            debug!(sql = %sql, rows = chunk.len(), table = %table, "Executing SQL batch");
            cursor
                .execute_many(&sql, chunk)
                .map_err(|e| statement_failed(&sql, &e))?;
            affected += cursor.row_count().unwrap_or(chunk.len() as u64);
        }
    }
    Ok(affected)
}

pub(crate) fn statement_failed(sql: &str, err: &DriverError) -> ExecError {
    warn!(sql = %sql, error = %err, "Statement failed");
    ExecError::StatementExecution {
        message: err.message().to_string(),
        sql: String::from(sql),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_dbal_core::SqlValue;

    #[test]
    fn test_prepare_order() {
        let prepared = prepare(
            "UPDATE t SET ts = :ts WHERE name LIKE 'a%' AND id = :id",
            Params::named([
                ("ts", SqlValue::raw("NOW()")),
                ("id", SqlValue::Int(1)),
            ]),
            &Dialect::POSTGRES,
        )
        .unwrap();
        assert_eq!(
            prepared.sql,
            "UPDATE t SET ts = NOW() WHERE name LIKE 'a%%' AND id = %s"
        );
        assert_eq!(prepared.values, vec![SqlValue::Int(1)]);
    }

    #[test]
    fn test_prepare_rejects_mixed_styles() {
        let err = prepare("SELECT :a, ?", Params::named([("a", 1_i64)]), &Dialect::SQLITE)
            .unwrap_err();
        assert!(matches!(err, ExecError::Sql(_)));
    }
}
