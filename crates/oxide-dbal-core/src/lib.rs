//! # oxide-dbal-core
//!
//! Dialect-aware SQL statement building and placeholder translation.
//!
//! This crate provides:
//! - A placeholder translator that accepts `?`, `%s`, `$1`, `:name`,
//!   `%(name)s` and `$name` and rewrites them for a target dialect
//! - Statement builders for SELECT, INSERT, UPDATE, DELETE and upsert
//! - Dialect capability records and an explicit registry
//! - A value model with a raw literal variant for engine keywords
//!
//! Nothing here performs I/O; execution lives in `oxide-dbal`.
//!
//! ## Placeholder Translation
//!
//! ```rust
//! use oxide_dbal_core::placeholder::{translate, Params, ParamMarker};
//! use oxide_dbal_core::SqlValue;
//!
//! let (sql, values) = translate(
//!     "SELECT * FROM users WHERE id = :id OR parent = :id",
//!     Params::named([("id", 7_i64)]),
//!     ParamMarker::PercentS,
//! )
//! .unwrap();
//!
//! assert_eq!(sql, "SELECT * FROM users WHERE id = %s OR parent = %s");
//! assert_eq!(values, vec![SqlValue::Int(7), SqlValue::Int(7)]);
//! ```
//!
//! ## Upserts
//!
//! ```rust
//! use oxide_dbal_core::builder::Merge;
//! use oxide_dbal_core::{Dialect, Row};
//!
//! let row = Row::new().with("email", "a@b.com").with("name", "A");
//! let stmts = Merge::into_table("t", vec![row], &["email"])
//!     .build(&Dialect::POSTGRES)
//!     .unwrap();
//!
//! assert_eq!(
//!     stmts[0].sql,
//!     "INSERT INTO t (email, name) VALUES (%s, %s) \
//!      ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name"
//! );
//! ```

pub mod builder;
pub mod dialect;
pub mod error;
pub mod placeholder;
pub mod predicate;
pub mod row;
pub mod scan;
pub mod serialize;
pub mod statement;
pub mod value;

pub use dialect::{Dialect, DialectRegistry};
pub use error::{Result, SqlError};
pub use placeholder::{translate, validate, ParamMarker, Params, PlaceholderStyle};
pub use predicate::{Condition, Predicate};
pub use row::Row;
pub use serialize::Prepared;
pub use statement::{BulkStatement, Operation, Statement};
pub use value::{SqlValue, ToSqlValue};
