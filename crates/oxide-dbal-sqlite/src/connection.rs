//! Synchronous SQLite connection.

use std::cell::{Cell, RefCell};

use sqlx::{Connection as _, Executor as _};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use oxide_dbal::{Connection, Cursor, DriverError, DriverResult};

use crate::bind::driver_error;
use crate::cursor::SqliteCursor;

/// A single SQLite connection driven by a private current-thread runtime.
///
/// Every call blocks until the database answers, so it must not be used
/// from inside an async runtime. Autocommit is emulated: with autocommit
/// off, a `BEGIN` is issued before the first statement of each
/// transaction.
pub struct SqliteConnection {
    runtime: Runtime,
    inner: RefCell<sqlx::SqliteConnection>,
    autocommit: Cell<bool>,
    in_transaction: Cell<bool>,
}

impl SqliteConnection {
    /// Opens a connection to `url`, e.g. `sqlite://data.db` or
    /// `sqlite::memory:`.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot start or the database cannot
    /// be opened.
    pub fn open(url: &str) -> DriverResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DriverError::with_source("Failed to start runtime", e))?;
        let inner = runtime
            .block_on(sqlx::SqliteConnection::connect(url))
            .map_err(driver_error)?;
        debug!(url, "SQLite connection opened");
        Ok(Self {
            runtime,
            inner: RefCell::new(inner),
            autocommit: Cell::new(true),
            in_transaction: Cell::new(false),
        })
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn memory() -> DriverResult<Self> {
        Self::open("sqlite::memory:")
    }

    /// Runs `f` with the runtime and the underlying connection.
    pub(crate) fn with_inner<T, F>(&self, f: F) -> DriverResult<T>
    where
        F: FnOnce(&Runtime, &mut sqlx::SqliteConnection) -> DriverResult<T>,
    {
        let mut inner = self
            .inner
            .try_borrow_mut()
            .map_err(|_| DriverError::new("SQLite connection is busy"))?;
        f(&self.runtime, &mut inner)
    }

    /// Opens a transaction if autocommit is off and none is open.
    pub(crate) fn begin_if_needed(&self) -> DriverResult<()> {
        if self.autocommit.get() || self.in_transaction.get() {
            return Ok(());
        }
        self.raw("BEGIN")?;
        self.in_transaction.set(true);
        Ok(())
    }

    fn raw(&self, sql: &'static str) -> DriverResult<()> {
        debug!(sql, "Executing SQL");
        self.with_inner(|runtime, conn| {
            runtime
                .block_on(conn.execute(sql))
                .map(|_| ())
                .map_err(driver_error)
        })
    }

    fn commit_open(&self) -> DriverResult<()> {
        if !self.in_transaction.get() {
            return Ok(());
        }
        // A failed COMMIT leaves the transaction open for a rollback.
        self.raw("COMMIT")?;
        self.in_transaction.set(false);
        Ok(())
    }

    fn rollback_open(&self) -> DriverResult<()> {
        if !self.in_transaction.get() {
            return Ok(());
        }
        self.in_transaction.set(false);
        self.raw("ROLLBACK")
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("autocommit", &self.autocommit.get())
            .field("in_transaction", &self.in_transaction.get())
            .finish_non_exhaustive()
    }
}

impl Connection for SqliteConnection {
    fn cursor(&self) -> DriverResult<Box<dyn Cursor + '_>> {
        Ok(Box::new(SqliteCursor::new(self)))
    }

    fn commit(&self) -> DriverResult<()> {
        self.commit_open()
    }

    fn rollback(&self) -> DriverResult<()> {
        self.rollback_open()
    }

    fn autocommit(&self) -> DriverResult<bool> {
        Ok(self.autocommit.get())
    }

    fn set_autocommit(&self, enabled: bool) -> DriverResult<()> {
        if enabled {
            // Switching autocommit back on commits pending work.
            self.commit()?;
        }
        self.autocommit.set(enabled);
        Ok(())
    }
}
