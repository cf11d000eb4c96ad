//! The session facade.

use oxide_dbal_core::builder::{Delete, Insert, InsertMany, Merge, Select, Update};
use oxide_dbal_core::scan::split_statements;
use oxide_dbal_core::{Dialect, DialectRegistry, Params, Row};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::driver::Connection;
use crate::error::{ExecError, Result};
use crate::executor::{prepare, run, run_bulk, run_statement, Fetch};
use crate::result::ExecutionResult;
use crate::stream::{BatchStream, RowStream, StreamItem};
use crate::transaction::{apply, ApplyOptions, ApplyReport};

/// A connection bound to a dialect.
///
/// Every operation returns `Result`: `Ok` carries the uniform
/// [`ExecutionResult`], `Err` the reason it failed.
#[derive(Debug)]
pub struct Session<C> {
    conn: C,
    dialect: Dialect,
    config: SessionConfig,
}

impl<C: Connection> Session<C> {
    /// Creates a session with default settings.
    pub fn new(conn: C, dialect: Dialect) -> Self {
        Self {
            conn,
            config: SessionConfig {
                dialect: String::from(dialect.name()),
                ..SessionConfig::default()
            },
            dialect,
        }
    }

    /// Creates a session from configuration, resolving the dialect in
    /// `registry`.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or an unknown dialect.
    pub fn from_config(conn: C, registry: &DialectRegistry, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let dialect = registry.get(&config.dialect)?;
        debug!(dialect = dialect.name(), "Session configured");
        Ok(Self {
            conn,
            dialect,
            config,
        })
    }

    /// The session's dialect.
    pub const fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// The session's settings.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying connection.
    pub const fn connection(&self) -> &C {
        &self.conn
    }

    /// Returns the underlying connection.
    pub fn into_inner(self) -> C {
        self.conn
    }

    /// Executes a statement and reports the affected count.
    ///
    /// # Errors
    ///
    /// Fails on translation errors or when the engine rejects the SQL.
    pub fn execute(&self, sql: &str, params: impl Into<Params>) -> Result<ExecutionResult> {
        let prepared = prepare(sql, params.into(), &self.dialect)?;
        run(&self.conn, &prepared, Fetch::Nothing)
    }

    /// Executes a statement and reads every row it returns.
    ///
    /// # Errors
    ///
    /// Fails on translation errors or when the engine rejects the SQL.
    pub fn query(&self, sql: &str, params: impl Into<Params>) -> Result<ExecutionResult> {
        let prepared = prepare(sql, params.into(), &self.dialect)?;
        run(&self.conn, &prepared, Fetch::Rows)
    }

    /// Runs a SELECT.
    ///
    /// # Errors
    ///
    /// Fails when the predicate is invalid or the query fails.
    pub fn select(&self, select: Select) -> Result<ExecutionResult> {
        let statement = select.build(&self.dialect)?;
        run_statement(&self.conn, &self.dialect, statement, Fetch::Rows)
    }

    /// Inserts one row; returned columns, if requested and supported,
    /// come back as rows.
    ///
    /// # Errors
    ///
    /// Fails when the engine rejects the insert.
    pub fn insert(&self, insert: Insert) -> Result<ExecutionResult> {
        let statement = insert.build(&self.dialect)?;
        run_statement(&self.conn, &self.dialect, statement, Fetch::Rows)
    }

    /// Inserts many rows in batches of `insert_batch_size`.
    ///
    /// # Errors
    ///
    /// Fails with [`SqlError::InconsistentColumns`] before executing
    /// anything, or at the first failing batch.
    ///
    /// [`SqlError::InconsistentColumns`]: oxide_dbal_core::SqlError::InconsistentColumns
    pub fn insert_many(&self, table: &str, rows: Vec<Row>) -> Result<ExecutionResult> {
        let bulk = InsertMany::into_table(table, rows).build(&self.dialect)?;
        let affected = run_bulk(&self.conn, &self.dialect, bulk, self.config.insert_batch_size)?;
        Ok(ExecutionResult::affected(affected))
    }

    /// Runs an UPDATE. Empty data is a no-op with zero affected rows.
    ///
    /// # Errors
    ///
    /// Fails when the predicate is invalid or the update fails.
    pub fn update(&self, update: Update) -> Result<ExecutionResult> {
        match update.build(&self.dialect)? {
            Some(statement) => run_statement(&self.conn, &self.dialect, statement, Fetch::Nothing),
            None => Ok(ExecutionResult::affected(0)),
        }
    }

    /// Runs a DELETE.
    ///
    /// # Errors
    ///
    /// Fails when the predicate is invalid or the delete fails.
    pub fn delete(&self, delete: Delete) -> Result<ExecutionResult> {
        let statement = delete.build(&self.dialect)?;
        run_statement(&self.conn, &self.dialect, statement, Fetch::Nothing)
    }

    /// Upserts rows, one statement per batch.
    ///
    /// Empty data issues no SQL and reports zero affected rows.
    ///
    /// # Errors
    ///
    /// Precondition failures are reported before any SQL is issued;
    /// otherwise stops at the first failing statement.
    pub fn merge(&self, merge: Merge) -> Result<ExecutionResult> {
        let statements = merge
            .default_batch_size(self.config.merge_batch_size)
            .build(&self.dialect)?;
        let mut affected = 0;
        for statement in statements {
            let result = run_statement(&self.conn, &self.dialect, statement, Fetch::Nothing)?;
            affected += result.affected;
        }
        Ok(ExecutionResult::affected(affected))
    }

    /// Streams the rows of a query.
    ///
    /// # Errors
    ///
    /// Fails when the query cannot be started.
    pub fn stream(
        &self,
        sql: &str,
        params: impl Into<Params>,
        max_errors: usize,
    ) -> Result<RowStream<'_>> {
        RowStream::open(&self.conn, &self.dialect, sql, params.into(), max_errors)
    }

    /// Streams the rows of a query in batches of `size`.
    ///
    /// # Errors
    ///
    /// Fails when the query cannot be started.
    pub fn stream_batches(
        &self,
        sql: &str,
        params: impl Into<Params>,
        size: usize,
        max_errors: usize,
    ) -> Result<BatchStream<RowStream<'_>>> {
        Ok(self.stream(sql, params, max_errors)?.batches(size))
    }

    /// Applies `operation` to every row with periodic commits.
    ///
    /// See [`apply`](crate::transaction::apply).
    ///
    /// # Errors
    ///
    /// Fails when the error threshold is crossed or a commit fails.
    pub fn apply<I, F>(&self, rows: I, options: ApplyOptions, operation: F) -> Result<ApplyReport>
    where
        I: IntoIterator<Item = Result<StreamItem>>,
        F: FnMut(&Row, u64) -> Result<ExecutionResult>,
    {
        apply(&self.conn, rows, options, operation)
    }

    /// Commit cadence and tolerance from the session settings.
    pub const fn apply_options(&self) -> ApplyOptions {
        self.config.apply_options()
    }

    /// Executes every statement of a `;` separated script, in order.
    ///
    /// Returns the summed affected count.
    ///
    /// # Errors
    ///
    /// Stops at the first failure with [`ExecError::Script`] naming the
    /// zero-based statement index.
    pub fn execute_script(&self, script: &str) -> Result<u64> {
        let statements = split_statements(script);
        let mut affected = 0;
        for (index, sql) in statements.iter().enumerate() {
            let result = self
                .execute(sql, Params::None)
                .map_err(|source| ExecError::Script {
                    index,
                    source: Box::new(source),
                })?;
            affected += result.affected;
        }
        info!(statements = statements.len(), affected, "Script executed");
        Ok(affected)
    }
}
