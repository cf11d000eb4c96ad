//! Batched transaction engine.
//!
//! [`apply`] feeds every row of a stream to a write operation, commits
//! every `commit_every` rows and once more at the end. While it runs,
//! autocommit is switched off; the previous setting is restored on every
//! exit path by [`AutocommitGuard`]. Crossing the error threshold rolls
//! back the open transaction before the error is returned.

use oxide_dbal_core::Row;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::driver::Connection;
use crate::error::{ExecError, Result};
use crate::result::ExecutionResult;
use crate::stream::{RowStatus, StreamItem};

/// Commit cadence and error tolerance for [`apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOptions {
    /// Commit after this many rows; 0 leaves transactions alone.
    pub commit_every: usize,
    /// Errors of each kind tolerated before aborting.
    pub max_tolerated_errors: usize,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            commit_every: 1000,
            max_tolerated_errors: 0,
        }
    }
}

/// What [`apply`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Rows taken from the stream, failed ones included.
    pub rows_processed: u64,
    /// Commits issued.
    pub commits: u64,
    /// Rows the stream failed to fetch.
    pub upstream_errors: usize,
    /// Rows the operation failed on.
    pub operation_errors: usize,
}

/// Turns autocommit off and restores the previous value on drop.
#[derive(Debug)]
pub struct AutocommitGuard<'c, C: Connection + ?Sized> {
    conn: &'c C,
    previous: bool,
}

impl<'c, C: Connection + ?Sized> AutocommitGuard<'c, C> {
    /// Captures the current autocommit value and disables autocommit.
    ///
    /// # Errors
    ///
    /// Returns the driver error if either call fails.
    pub fn suspend(conn: &'c C) -> Result<Self> {
        let previous = conn.autocommit()?;
        conn.set_autocommit(false)?;
        debug!(previous, "Autocommit suspended");
        Ok(Self { conn, previous })
    }
}

impl<C: Connection + ?Sized> Drop for AutocommitGuard<'_, C> {
    fn drop(&mut self) {
        if let Err(err) = self.conn.set_autocommit(self.previous) {
            error!(error = %err, previous = self.previous, "Failed to restore autocommit");
        }
    }
}

struct Batch<'c, C: Connection + ?Sized> {
    conn: &'c C,
    options: ApplyOptions,
    report: ApplyReport,
}

impl<C: Connection + ?Sized> Batch<'_, C> {
    const fn transactional(&self) -> bool {
        self.options.commit_every > 0
    }

    fn commit(&mut self) -> Result<()> {
        let row = self.report.rows_processed;
        self.conn.commit().map_err(|err| {
            warn!(row, error = %err, "Commit failed");
            self.rollback();
            ExecError::TransactionCommit {
                row,
                message: err.message().to_string(),
            }
        })?;
        self.report.commits += 1;
        info!(rows = row, commits = self.report.commits, "Committed");
        Ok(())
    }

    fn rollback(&self) {
        if !self.transactional() {
            return;
        }
        match self.conn.rollback() {
            Ok(()) => info!(rows = self.report.rows_processed, "Rolled back"),
            Err(err) => error!(error = %err, "Rollback failed"),
        }
    }

    fn abort(&self, row: u64, source: ExecError) -> ExecError {
        self.rollback();
        match source {
            aborted @ ExecError::Aborted { .. } => aborted,
            source => ExecError::Aborted {
                row,
                source: Box::new(source),
            },
        }
    }
}

/// Applies `operation` to every row of `rows`.
///
/// `operation` receives each row with its one-based row number. Upstream
/// error rows are not passed to it. Upstream errors and operation errors
/// are counted separately; either count exceeding
/// `max_tolerated_errors` aborts.
///
/// # Errors
///
/// Returns [`ExecError::Aborted`] with the failing row after rolling
/// back, or [`ExecError::TransactionCommit`] when a commit is refused.
pub fn apply<C, I, F>(
    conn: &C,
    rows: I,
    options: ApplyOptions,
    mut operation: F,
) -> Result<ApplyReport>
where
    C: Connection + ?Sized,
    I: IntoIterator<Item = Result<StreamItem>>,
    F: FnMut(&Row, u64) -> Result<ExecutionResult>,
{
    let _autocommit = if options.commit_every > 0 {
        Some(AutocommitGuard::suspend(conn)?)
    } else {
        None
    };
    let mut batch = Batch {
        conn,
        options,
        report: ApplyReport::default(),
    };

    for item in rows {
        let row_number = batch.report.rows_processed + 1;
        let item = match item {
            Ok(item) => item,
            Err(err) => return Err(batch.abort(row_number, err)),
        };
        batch.report.rows_processed = row_number;

        match item.status {
            RowStatus::Error(message) => {
                batch.report.upstream_errors += 1;
                warn!(row = row_number, error = %message, "Upstream row failed");
                if batch.report.upstream_errors > options.max_tolerated_errors {
                    let source = ExecError::UpstreamStream {
                        row: item.seq,
                        message,
                    };
                    return Err(batch.abort(row_number, source));
                }
            }
            RowStatus::Ok => {
                if let Err(err) = operation(&item.row, row_number) {
                    batch.report.operation_errors += 1;
                    warn!(row = row_number, error = %err, "Row operation failed");
                    if batch.report.operation_errors > options.max_tolerated_errors {
                        return Err(batch.abort(row_number, err));
                    }
                }
            }
        }

        if batch.transactional() && row_number % options.commit_every as u64 == 0 {
            batch.commit()?;
        }
    }

    if batch.report.rows_processed == 0 {
        debug!("No rows to apply");
        return Ok(batch.report);
    }
    if batch.transactional() {
        batch.commit()?;
    }
    Ok(batch.report)
}
