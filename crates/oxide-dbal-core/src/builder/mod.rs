//! Dialect-aware statement builders.
//!
//! Each builder collects a table, data and an optional [`Predicate`] and
//! is turned into SQL for one [`Dialect`] by `build`:
//!
//! ```rust
//! use oxide_dbal_core::builder::Select;
//! use oxide_dbal_core::dialect::Dialect;
//! use oxide_dbal_core::predicate::Predicate;
//!
//! let stmt = Select::from("users")
//!     .columns(&["id", "name"])
//!     .filter(Predicate::new().eq("active", true))
//!     .limit(10)
//!     .build(&Dialect::SQLSERVER)
//!     .unwrap();
//!
//! assert_eq!(stmt.sql, "SELECT TOP 10 id, name FROM users WHERE active = ?");
//! ```
//!
//! Builders only produce text and values. Raw literal injection and
//! percent escaping happen later, in [`Statement::prepare`].
//!
//! [`Predicate`]: crate::predicate::Predicate
//! [`Statement::prepare`]: crate::statement::Statement::prepare

mod delete;
mod insert;
mod merge;
mod select;
mod update;

pub use delete::Delete;
pub use insert::{Insert, InsertMany};
pub use merge::{Merge, DEFAULT_MERGE_BATCH};
pub use select::{Order, Select};
pub use update::Update;

use crate::error::Result;
use crate::placeholder::MarkerSequence;
use crate::predicate::Predicate;
use crate::value::SqlValue;

/// Appends ` WHERE ...` for a non-empty predicate.
fn push_where(
    sql: &mut String,
    predicate: Option<&Predicate>,
    markers: &mut MarkerSequence,
    values: &mut Vec<SqlValue>,
) -> Result<()> {
    let Some(predicate) = predicate.filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    let fragment = predicate.compile(markers)?;
    sql.push_str(" WHERE ");
    sql.push_str(&fragment.sql);
    values.extend(fragment.values);
    Ok(())
}

/// `(m1, m2, ...)` with `count` fresh markers.
fn marker_group(markers: &mut MarkerSequence, count: usize) -> String {
    let list: Vec<_> = (0..count).map(|_| markers.next_marker()).collect();
    format!("({})", list.join(", "))
}
