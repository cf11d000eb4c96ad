//! Error types for statement execution.

use oxide_dbal_core::SqlError;

use crate::driver::DriverError;

/// Errors that can occur while executing statements.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// A precondition failed before any SQL was issued.
    #[error(transparent)]
    Sql(#[from] SqlError),

    /// The driver failed outside of statement execution.
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// The engine rejected the SQL or its bound values.
    #[error("Statement failed: {message}")]
    StatementExecution {
        /// Driver message.
        message: String,
        /// The SQL that was sent.
        sql: String,
    },

    /// Fetching a row from the source stream failed.
    #[error("Fetching row {row} failed: {message}")]
    UpstreamStream {
        /// One-based sequence number of the failed row.
        row: u64,
        /// Driver message.
        message: String,
    },

    /// A commit was refused.
    #[error("Commit after row {row} failed: {message}")]
    TransactionCommit {
        /// Rows seen when the commit was issued.
        row: u64,
        /// Driver message.
        message: String,
    },

    /// Too many errors were tolerated; processing stopped.
    #[error("Aborted at row {row}: {source}")]
    Aborted {
        /// One-based row at which processing stopped.
        row: u64,
        /// The error that crossed the threshold.
        source: Box<ExecError>,
    },

    /// A statement of a script failed.
    #[error("Statement {index} of script failed: {source}")]
    Script {
        /// Zero-based index of the failed statement.
        index: usize,
        /// Why it failed.
        source: Box<ExecError>,
    },

    /// Invalid session configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ExecError {
    /// The row at which processing stopped, for aborts.
    #[must_use]
    pub const fn aborted_at(&self) -> Option<u64> {
        match self {
            Self::Aborted { row, .. } => Some(*row),
            _ => None,
        }
    }
}

/// Result type for execution.
pub type Result<T> = std::result::Result<T, ExecError>;
