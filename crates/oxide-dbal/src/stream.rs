//! Streaming engine.
//!
//! [`RowStream`] pulls rows one at a time from an open cursor. It is
//! single-pass: reading the rows again means running the query again.
//! The cursor is closed when the stream is exhausted, aborts, or is
//! dropped half way.
//!
//! Each item is one of
//!
//! - `Ok(StreamItem { status: RowStatus::Ok, .. })`: a row,
//! - `Ok(StreamItem { status: RowStatus::Error(_), .. })`: a fetch error
//!   that is still within the tolerated count,
//! - `Err(ExecError::Aborted { .. })`: the tolerated count was exceeded;
//!   the stream ends here.

use std::mem;

use oxide_dbal_core::{Dialect, Params, Row};
use serde::Serialize;
use tracing::{debug, warn};

use crate::driver::{Connection, CursorGuard};
use crate::error::{ExecError, Result};
use crate::executor::{prepare, statement_failed};
use crate::result::{infer_columns, normalize_one};

/// Status of a streamed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RowStatus {
    /// The row was fetched.
    Ok,
    /// Fetching failed; the row is empty.
    Error(String),
}

impl RowStatus {
    /// Whether the row was fetched.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// One streamed row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamItem {
    /// One-based position in the stream.
    pub seq: u64,
    /// The row; empty for error items.
    pub row: Row,
    /// Whether the fetch succeeded.
    pub status: RowStatus,
}

/// A forward-only stream of query rows.
#[derive(Debug)]
pub struct RowStream<'c> {
    cursor: Option<CursorGuard<'c>>,
    columns: Vec<String>,
    seq: u64,
    errors: usize,
    max_errors: usize,
}

impl<'c> RowStream<'c> {
    /// Runs `sql` and returns a stream over its rows.
    ///
    /// # Errors
    ///
    /// Fails when translation fails or the engine rejects the query.
    pub fn open<C: Connection + ?Sized>(
        conn: &'c C,
        dialect: &Dialect,
        sql: &str,
        params: Params,
        max_errors: usize,
    ) -> Result<Self> {
        let prepared = prepare(sql, params, dialect)?;
        debug!(sql = %prepared.sql, max_errors, "Opening row stream");
        let mut cursor = CursorGuard::open(conn)?;
        cursor
            .execute(&prepared.sql, &prepared.values)
            .map_err(|e| statement_failed(&prepared.sql, &e))?;
        let columns = cursor
            .columns()
            .unwrap_or_default()
            .iter()
            .map(|c| c.to_lowercase())
            .collect();
        Ok(Self {
            cursor: Some(cursor),
            columns,
            seq: 0,
            errors: 0,
            max_errors,
        })
    }

    /// Lower-cased result column names.
    ///
    /// Without cursor metadata they are taken from the first row, so they
    /// stay empty until a row has been read.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Fetch errors tolerated so far.
    #[must_use]
    pub const fn errors(&self) -> usize {
        self.errors
    }

    /// Regroups the stream into batches of `size` rows.
    #[must_use]
    pub fn batches(self, size: usize) -> BatchStream<Self> {
        BatchStream::new(self, size)
    }

    fn close(&mut self) {
        // Dropping the guard closes the cursor.
        self.cursor = None;
    }
}

impl Iterator for RowStream<'_> {
    type Item = Result<StreamItem>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        match cursor.fetch_one() {
            Ok(Some(raw)) => {
                if self.columns.is_empty() {
                    self.columns = infer_columns(&raw);
                }
                self.seq += 1;
                Some(Ok(StreamItem {
                    seq: self.seq,
                    row: normalize_one(raw, &self.columns),
                    status: RowStatus::Ok,
                }))
            }
            Ok(None) => {
                debug!(rows = self.seq, errors = self.errors, "Row stream exhausted");
                self.close();
                None
            }
            Err(err) => {
                self.seq += 1;
                self.errors += 1;
                let message = err.message().to_string();
                if self.errors > self.max_errors {
                    warn!(row = self.seq, error = %message, "Row stream aborted");
                    self.close();
                    return Some(Err(ExecError::Aborted {
                        row: self.seq,
                        source: Box::new(ExecError::UpstreamStream {
                            row: self.seq,
                            message,
                        }),
                    }));
                }
                warn!(
                    row = self.seq,
                    error = %message,
                    tolerated = self.errors,
                    "Row fetch failed"
                );
                Some(Ok(StreamItem {
                    seq: self.seq,
                    row: Row::new(),
                    status: RowStatus::Error(message),
                }))
            }
        }
    }
}

/// A group of streamed rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    /// Rows seen so far, including this batch.
    pub count: u64,
    /// The rows; empty for error items.
    pub rows: Vec<Row>,
    /// `Error` when this item reports a failed row.
    pub status: RowStatus,
}

/// Regroups a row stream into fixed-size batches, in arrival order.
///
/// An error row ends the batch being filled: the rows collected so far are
/// emitted first, then the error on its own.
#[derive(Debug)]
pub struct BatchStream<I> {
    inner: I,
    size: usize,
    buffer: Vec<Row>,
    count: u64,
    pending: Option<Result<BatchItem>>,
    done: bool,
}

impl<I> BatchStream<I>
where
    I: Iterator<Item = Result<StreamItem>>,
{
    /// Wraps `inner`. A `size` of 0 is treated as 1.
    pub fn new(inner: I, size: usize) -> Self {
        Self {
            inner,
            size: size.max(1),
            buffer: Vec::new(),
            count: 0,
            pending: None,
            done: false,
        }
    }

    fn flush(&mut self) -> BatchItem {
        BatchItem {
            count: self.count,
            rows: mem::take(&mut self.buffer),
            status: RowStatus::Ok,
        }
    }

    /// Emits the partial batch before `item`, or `item` alone.
    fn flush_then(&mut self, item: Result<BatchItem>) -> Option<Result<BatchItem>> {
        if self.buffer.is_empty() {
            return Some(item);
        }
        let batch = self.flush();
        self.pending = Some(item);
        Some(Ok(batch))
    }
}

impl<I> Iterator for BatchStream<I>
where
    I: Iterator<Item = Result<StreamItem>>,
{
    type Item = Result<BatchItem>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.pending.take() {
            return Some(item);
        }
        if self.done {
            return None;
        }
        loop {
            match self.inner.next() {
                Some(Ok(item)) if item.status.is_ok() => {
                    self.count = item.seq;
                    self.buffer.push(item.row);
                    if self.buffer.len() == self.size {
                        return Some(Ok(self.flush()));
                    }
                }
                Some(Ok(item)) => {
                    let error = BatchItem {
                        count: item.seq,
                        rows: Vec::new(),
                        status: item.status,
                    };
                    let out = self.flush_then(Ok(error));
                    self.count = item.seq;
                    return out;
                }
                Some(Err(err)) => {
                    self.done = true;
                    return self.flush_then(Err(err));
                }
                None => {
                    self.done = true;
                    return if self.buffer.is_empty() {
                        None
                    } else {
                        Some(Ok(self.flush()))
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_dbal_core::SqlValue;

    fn ok(seq: u64) -> Result<StreamItem> {
        Ok(StreamItem {
            seq,
            row: Row::new().with("n", i64::try_from(seq).unwrap_or_default()),
            status: RowStatus::Ok,
        })
    }

    fn failed(seq: u64) -> Result<StreamItem> {
        Ok(StreamItem {
            seq,
            row: Row::new(),
            status: RowStatus::Error(String::from("boom")),
        })
    }

    #[test]
    fn test_batches_of_two() {
        let batches: Vec<BatchItem> = BatchStream::new((1..=5).map(ok), 2)
            .map(|b| b.unwrap())
            .collect();
        let sizes: Vec<usize> = batches.iter().map(|b| b.rows.len()).collect();
        let counts: Vec<u64> = batches.iter().map(|b| b.count).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(counts, vec![2, 4, 5]);
        assert_eq!(batches[2].rows[0].get("n"), Some(&SqlValue::Int(5)));
    }

    #[test]
    fn test_error_row_flushes_partial_batch_first() {
        let items = vec![ok(1), failed(2), ok(3), ok(4)];
        let batches: Vec<BatchItem> = BatchStream::new(items.into_iter(), 3)
            .map(|b| b.unwrap())
            .collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].rows.len(), 1);
        assert_eq!(batches[1].status, RowStatus::Error(String::from("boom")));
        assert_eq!(batches[1].count, 2);
        assert_eq!(batches[2].rows.len(), 2);
        assert_eq!(batches[2].count, 4);
    }

    #[test]
    fn test_abort_ends_batches() {
        let abort = Err(ExecError::Aborted {
            row: 3,
            source: Box::new(ExecError::Config(String::from("x"))),
        });
        let items = vec![ok(1), ok(2), abort, ok(4)];
        let mut batches = BatchStream::new(items.into_iter(), 5);
        assert_eq!(batches.next().unwrap().unwrap().rows.len(), 2);
        assert!(batches.next().unwrap().is_err());
        assert!(batches.next().is_none());
    }

    #[test]
    fn test_zero_size_is_one() {
        let batches: Vec<_> = BatchStream::new((1..=3).map(ok), 0).collect();
        assert_eq!(batches.len(), 3);
    }
}
