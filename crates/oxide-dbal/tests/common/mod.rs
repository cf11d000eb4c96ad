#![allow(dead_code)]

use std::cell::{Ref, RefCell};
use std::collections::VecDeque;

use oxide_dbal::{Connection, Cursor, DriverError, DriverResult, RawRow, StreamItem};
use oxide_dbal_core::{Row, SqlValue};

/// One scripted fetch: a row, or a fetch error message.
pub type Fetched = Result<Vec<SqlValue>, &'static str>;

/// Everything the mock saw.
#[derive(Debug)]
pub struct MockState {
    pub executed: Vec<(String, Vec<SqlValue>)>,
    pub commits: usize,
    pub rollbacks: usize,
    pub autocommit: bool,
    pub autocommit_changes: Vec<bool>,
    pub cursors_opened: usize,
    pub cursors_closed: usize,
    pub columns: Vec<String>,
    pub result_sets: VecDeque<Vec<Fetched>>,
    pub fail_when: Vec<&'static str>,
    pub fail_commit: bool,
    pub row_count: Option<u64>,
    pub mapping_rows: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            executed: Vec::new(),
            commits: 0,
            rollbacks: 0,
            autocommit: true,
            autocommit_changes: Vec::new(),
            cursors_opened: 0,
            cursors_closed: 0,
            columns: Vec::new(),
            result_sets: VecDeque::new(),
            fail_when: Vec::new(),
            fail_commit: false,
            row_count: Some(1),
            mapping_rows: false,
        }
    }
}

/// A scripted in-memory connection.
#[derive(Debug, Default)]
pub struct MockConnection {
    state: RefCell<MockState>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a result set returned by the next SELECT.
    pub fn with_rows(self, columns: &[&str], rows: Vec<Fetched>) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.columns = columns.iter().map(|c| String::from(*c)).collect();
            state.result_sets.push_back(rows);
        }
        self
    }

    /// Makes every statement containing `needle` fail.
    pub fn failing_on(self, needle: &'static str) -> Self {
        self.state.borrow_mut().fail_when.push(needle);
        self
    }

    pub fn failing_commits(self) -> Self {
        self.state.borrow_mut().fail_commit = true;
        self
    }

    /// Returns SELECT rows as mappings keyed by the queued column names,
    /// with no column metadata on the cursor.
    pub fn as_mappings(self) -> Self {
        self.state.borrow_mut().mapping_rows = true;
        self
    }

    pub fn without_row_count(self) -> Self {
        self.state.borrow_mut().row_count = None;
        self
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.state.borrow()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.state().executed.iter().map(|(sql, _)| sql.clone()).collect()
    }
}

struct MockCursor<'c> {
    state: &'c RefCell<MockState>,
    pending: VecDeque<Fetched>,
    columns: Option<Vec<String>>,
    mapping_keys: Option<Vec<String>>,
    row_count: Option<u64>,
    closed: bool,
}

impl MockCursor<'_> {
    fn record(&self, sql: &str, values: &[SqlValue]) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        state.executed.push((String::from(sql), values.to_vec()));
        if state.fail_when.iter().any(|needle| sql.contains(needle)) {
            return Err(DriverError::new(format!("rejected: {sql}")));
        }
        Ok(())
    }
}

impl Cursor for MockCursor<'_> {
    fn execute(&mut self, sql: &str, values: &[SqlValue]) -> DriverResult<()> {
        self.record(sql, values)?;
        let mut state = self.state.borrow_mut();
        if sql.trim_start().to_uppercase().starts_with("SELECT") {
            self.pending = state.result_sets.pop_front().unwrap_or_default().into();
            if state.mapping_rows {
                self.columns = None;
                self.mapping_keys = Some(state.columns.clone());
            } else {
                self.columns = Some(state.columns.clone());
                self.mapping_keys = None;
            }
            self.row_count = None;
        } else {
            self.pending.clear();
            self.columns = None;
            self.row_count = state.row_count;
        }
        Ok(())
    }

    fn execute_many(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> DriverResult<()> {
        for values in rows {
            self.record(sql, values)?;
        }
        self.columns = None;
        self.row_count = self.state.borrow().row_count.map(|_| rows.len() as u64);
        Ok(())
    }

    fn fetch_one(&mut self) -> DriverResult<Option<RawRow>> {
        match self.pending.pop_front() {
            Some(Ok(values)) => Ok(Some(match &self.mapping_keys {
                Some(keys) => RawRow::Mapping(Row::from_parts(keys.clone(), values)),
                None => RawRow::Tuple(values),
            })),
            Some(Err(message)) => Err(DriverError::new(message)),
            None => Ok(None),
        }
    }

    fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    fn columns(&self) -> Option<Vec<String>> {
        self.columns.clone()
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.state.borrow_mut().cursors_closed += 1;
        }
    }
}

impl Connection for MockConnection {
    fn cursor(&self) -> DriverResult<Box<dyn Cursor + '_>> {
        self.state.borrow_mut().cursors_opened += 1;
        Ok(Box::new(MockCursor {
            state: &self.state,
            pending: VecDeque::new(),
            columns: None,
            mapping_keys: None,
            row_count: None,
            closed: false,
        }))
    }

    fn commit(&self) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_commit {
            return Err(DriverError::new("commit refused"));
        }
        state.commits += 1;
        Ok(())
    }

    fn rollback(&self) -> DriverResult<()> {
        self.state.borrow_mut().rollbacks += 1;
        Ok(())
    }

    fn autocommit(&self) -> DriverResult<bool> {
        Ok(self.state.borrow().autocommit)
    }

    fn set_autocommit(&self, enabled: bool) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        state.autocommit = enabled;
        state.autocommit_changes.push(enabled);
        Ok(())
    }
}

/// `count` single-column rows `n = 1..=count`.
pub fn numbered_rows(count: i64) -> Vec<Fetched> {
    (1..=count).map(|n| Ok(vec![SqlValue::Int(n)])).collect()
}

/// Stream items as a row stream would produce them.
pub fn stream_items(rows: Vec<Fetched>) -> Vec<oxide_dbal::Result<StreamItem>> {
    rows.into_iter()
        .zip(1_u64..)
        .map(|(fetched, seq)| {
            Ok(match fetched {
                Ok(values) => StreamItem {
                    seq,
                    row: Row::from_parts(vec![String::from("n")], values),
                    status: oxide_dbal::RowStatus::Ok,
                },
                Err(message) => StreamItem {
                    seq,
                    row: Row::new(),
                    status: oxide_dbal::RowStatus::Error(String::from(message)),
                },
            })
        })
        .collect()
}
