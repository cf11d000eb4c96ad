//! # oxide-dbal
//!
//! Uniform statement execution, streaming and batched transactions over
//! SQL dialects.
//!
//! A [`Session`] pairs a driver [`Connection`] with a
//! [`Dialect`](oxide_dbal_core::Dialect) and exposes:
//! - `select`, `insert`, `insert_many`, `update`, `delete` and `merge`
//!   built by `oxide-dbal-core`
//! - `execute`/`query` for caller SQL in any placeholder style
//! - `stream`/`stream_batches` for forward-only row streams
//! - `apply` to write a stream back with periodic commits
//!
//! ## Example
//!
//! ```rust,ignore
//! use oxide_dbal::{ApplyOptions, Session};
//! use oxide_dbal_core::builder::Merge;
//! use oxide_dbal_core::Dialect;
//!
//! let source = Session::new(source_conn, Dialect::POSTGRES);
//! let target = Session::new(target_conn, Dialect::ORACLE);
//!
//! let rows = source.stream(
//!     "SELECT id, name FROM users WHERE active = %s",
//!     vec![true.into()],
//!     5,
//! )?;
//! let options = ApplyOptions {
//!     commit_every: 500,
//!     max_tolerated_errors: 5,
//! };
//! let report = target.apply(rows, options, |row, _| {
//!     target.merge(Merge::into_table("users", vec![row.clone()], &["id"]))
//! })?;
//! println!("{} rows, {} commits", report.rows_processed, report.commits);
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod result;
pub mod session;
pub mod stream;
pub mod transaction;

pub use config::SessionConfig;
pub use driver::{Connection, Cursor, CursorGuard, DriverError, DriverResult, RawRow};
pub use error::{ExecError, Result};
pub use result::ExecutionResult;
pub use session::Session;
pub use stream::{BatchItem, BatchStream, RowStatus, RowStream, StreamItem};
pub use transaction::{apply, ApplyOptions, ApplyReport, AutocommitGuard};
