//! # oxide-dbal-sqlite
//!
//! SQLite driver for `oxide-dbal`, built on [sqlx](https://docs.rs/sqlx).
//!
//! The `oxide-dbal` driver boundary is synchronous. [`SqliteConnection`]
//! owns a current-thread tokio runtime and blocks on every call, which
//! keeps the session layer free of `async` while reusing sqlx for the
//! actual database work.
//!
//! ## How SQLite differs
//!
//! - Placeholders are `?`
//! - Booleans are stored as integers and come back as [`SqlValue::Int`]
//! - Dates, timestamps and JSON documents are stored as text
//! - Upserts use `INSERT ... ON CONFLICT (...) DO UPDATE`
//! - Autocommit is emulated with an explicit `BEGIN`
//!
//! ## Example
//!
//! ```rust
//! use oxide_dbal::Session;
//! use oxide_dbal_core::builder::Merge;
//! use oxide_dbal_core::{Dialect, Row};
//! use oxide_dbal_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::memory().unwrap();
//! let session = Session::new(&conn, Dialect::SQLITE);
//! session
//!     .execute("CREATE TABLE t (email TEXT PRIMARY KEY, name TEXT)", ())
//!     .unwrap();
//!
//! let row = Row::new().with("email", "a@b.com").with("name", "A");
//! session
//!     .merge(Merge::into_table("t", vec![row], &["email"]))
//!     .unwrap();
//!
//! let result = session.query("SELECT name FROM t", ()).unwrap();
//! assert_eq!(result.rows.len(), 1);
//! ```
//!
//! Do not call into a [`SqliteConnection`] from inside another tokio
//! runtime; blocking there panics.
//!
//! [`SqlValue::Int`]: oxide_dbal_core::SqlValue::Int

mod bind;
mod connection;
mod cursor;

pub use bind::{bind_value, decode_row};
pub use connection::SqliteConnection;
pub use cursor::SqliteCursor;
