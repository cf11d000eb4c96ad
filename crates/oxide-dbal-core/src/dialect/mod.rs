//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. Instead of one
//! implementation per database, a dialect here is a plain capability
//! record: the generic builders read it and emit the right syntax.
//! Records are immutable and cheap to copy.

mod builtin;
mod registry;

pub use registry::DialectRegistry;

use crate::placeholder::ParamMarker;

/// How a row limit is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStyle {
    /// `... LIMIT n`
    Limit,
    /// `... FETCH FIRST n ROWS ONLY`
    FetchFirst,
    /// `SELECT TOP n ...`
    Top,
}

/// How an upsert is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStrategy {
    /// `INSERT ... ON CONFLICT (keys) DO UPDATE SET col = <excluded>.col`
    OnConflict {
        /// Name of the pseudo table holding the proposed row.
        excluded: &'static str,
    },
    /// `INSERT ... ON DUPLICATE KEY UPDATE col = VALUES(col)`
    OnDuplicateKey,
    /// A full `MERGE INTO ... USING ...` statement.
    Merge(MergeSyntax),
}

impl ConflictStrategy {
    /// Whether the upsert is a clause on a plain INSERT.
    #[must_use]
    pub const fn is_inline(self) -> bool {
        !matches!(self, Self::Merge(_))
    }
}

/// Shape of the source relation in a `MERGE` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSource {
    /// `USING (VALUES (...), (...)) AS src (cols)`
    Values,
    /// `USING (SELECT ... FROM dual UNION ALL ...) src`
    SelectFromDual,
}

/// Per-dialect details of the `MERGE` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSyntax {
    /// Source relation shape.
    pub source: MergeSource,
    /// Whether the statement must end with `;`.
    pub terminated: bool,
}

/// How inserted rows are handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturningStyle {
    /// Not supported; callers re-query.
    None,
    /// `INSERT ... RETURNING cols`
    Returning,
    /// `INSERT INTO t (cols) OUTPUT INSERTED.col VALUES (...)`
    Output,
    /// `SELECT cols FROM FINAL TABLE (INSERT ...)`
    FinalTable,
}

/// How structured documents are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredStorage {
    /// Serialized to JSON text before binding.
    Text,
    /// Bound as a native document type.
    Native,
}

/// Upsert capabilities of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertPolicy {
    /// Conflict handling syntax.
    pub conflict: ConflictStrategy,
    /// Returning clause flavour.
    pub returning: ReturningStyle,
    /// Ceiling on bound parameters in one statement.
    pub max_bound_params: Option<usize>,
}

impl UpsertPolicy {
    /// Whether inserted rows can be returned by the same statement.
    #[must_use]
    pub const fn supports_returning(&self) -> bool {
        !matches!(self.returning, ReturningStyle::None)
    }

    /// How many rows of `columns` values fit in one statement.
    ///
    /// Falls back to `fallback` when there is no ceiling; never returns 0.
    #[must_use]
    pub fn rows_per_statement(&self, columns: usize, fallback: usize) -> usize {
        let rows = match self.max_bound_params {
            Some(max) if columns > 0 => (max / columns).min(fallback),
            _ => fallback,
        };
        rows.max(1)
    }
}

/// A dialect capability record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Registry name.
    pub name: &'static str,
    /// Positional bound-parameter marker.
    pub marker: ParamMarker,
    /// Row limit syntax.
    pub limit: LimitStyle,
    /// Upsert capabilities.
    pub upsert: UpsertPolicy,
    /// Structured document storage.
    pub structured: StructuredStorage,
}

impl Dialect {
    /// Returns the name of the dialect.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the positional parameter marker.
    #[must_use]
    pub const fn marker(&self) -> ParamMarker {
        self.marker
    }

    /// Whether literal `%` must be doubled in final SQL.
    #[must_use]
    pub const fn escapes_percent(&self) -> bool {
        self.marker.is_percent()
    }

    /// Returns whether the dialect supports a returning clause.
    #[must_use]
    pub const fn supports_returning(&self) -> bool {
        self.upsert.supports_returning()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_statement() {
        let policy = UpsertPolicy {
            conflict: ConflictStrategy::OnDuplicateKey,
            returning: ReturningStyle::None,
            max_bound_params: Some(10),
        };
        assert_eq!(policy.rows_per_statement(3, 100), 3);
        assert_eq!(policy.rows_per_statement(3, 2), 2);
        assert_eq!(policy.rows_per_statement(20, 100), 1);

        let unbounded = UpsertPolicy {
            max_bound_params: None,
            ..policy
        };
        assert_eq!(unbounded.rows_per_statement(3, 100), 100);
        assert_eq!(unbounded.rows_per_statement(3, 0), 1);
    }

    #[test]
    fn test_percent_escaping_follows_marker() {
        assert!(Dialect::POSTGRES.escapes_percent());
        assert!(Dialect::MYSQL.escapes_percent());
        assert!(!Dialect::SQLITE.escapes_percent());
        assert!(!Dialect::ORACLE.escapes_percent());
    }
}
