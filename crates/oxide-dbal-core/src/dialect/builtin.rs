//! Built-in dialect records.

use super::{
    ConflictStrategy, Dialect, LimitStyle, MergeSource, MergeSyntax, ReturningStyle,
    StructuredStorage, UpsertPolicy,
};
use crate::placeholder::ParamMarker;

impl Dialect {
    /// PostgreSQL (psycopg-style `%s` markers).
    pub const POSTGRES: Self = Self {
        name: "postgres",
        marker: ParamMarker::PercentS,
        limit: LimitStyle::Limit,
        upsert: UpsertPolicy {
            conflict: ConflictStrategy::OnConflict {
                excluded: "EXCLUDED",
            },
            returning: ReturningStyle::Returning,
            max_bound_params: Some(65_535),
        },
        structured: StructuredStorage::Native,
    };

    /// MySQL and MariaDB.
    pub const MYSQL: Self = Self {
        name: "mysql",
        marker: ParamMarker::PercentS,
        limit: LimitStyle::Limit,
        upsert: UpsertPolicy {
            conflict: ConflictStrategy::OnDuplicateKey,
            returning: ReturningStyle::None,
            max_bound_params: Some(65_535),
        },
        structured: StructuredStorage::Text,
    };

    /// SQLite 3.35+.
    pub const SQLITE: Self = Self {
        name: "sqlite",
        marker: ParamMarker::Question,
        limit: LimitStyle::Limit,
        upsert: UpsertPolicy {
            conflict: ConflictStrategy::OnConflict {
                excluded: "excluded",
            },
            returning: ReturningStyle::Returning,
            max_bound_params: Some(999),
        },
        structured: StructuredStorage::Text,
    };

    /// Oracle 12c+.
    pub const ORACLE: Self = Self {
        name: "oracle",
        marker: ParamMarker::Numbered(':'),
        limit: LimitStyle::FetchFirst,
        upsert: UpsertPolicy {
            conflict: ConflictStrategy::Merge(MergeSyntax {
                source: MergeSource::SelectFromDual,
                terminated: false,
            }),
            returning: ReturningStyle::None,
            max_bound_params: Some(1_000),
        },
        structured: StructuredStorage::Text,
    };

    /// Microsoft SQL Server.
    pub const SQLSERVER: Self = Self {
        name: "sqlserver",
        marker: ParamMarker::Question,
        limit: LimitStyle::Top,
        upsert: UpsertPolicy {
            conflict: ConflictStrategy::Merge(MergeSyntax {
                source: MergeSource::Values,
                terminated: true,
            }),
            returning: ReturningStyle::Output,
            max_bound_params: Some(2_000),
        },
        structured: StructuredStorage::Text,
    };

    /// IBM Db2.
    pub const DB2: Self = Self {
        name: "db2",
        marker: ParamMarker::Question,
        limit: LimitStyle::FetchFirst,
        upsert: UpsertPolicy {
            conflict: ConflictStrategy::Merge(MergeSyntax {
                source: MergeSource::Values,
                terminated: false,
            }),
            returning: ReturningStyle::FinalTable,
            max_bound_params: Some(32_767),
        },
        structured: StructuredStorage::Text,
    };

    /// Every built-in dialect.
    pub const BUILTIN: [Self; 6] = [
        Self::POSTGRES,
        Self::MYSQL,
        Self::SQLITE,
        Self::ORACLE,
        Self::SQLSERVER,
        Self::DB2,
    ];
}

/// Alternative names accepted by the registry.
pub(super) const ALIASES: [(&str, &str); 6] = [
    ("postgresql", "postgres"),
    ("pg", "postgres"),
    ("mariadb", "mysql"),
    ("sqlite3", "sqlite"),
    ("mssql", "sqlserver"),
    ("ibm_db", "db2"),
];
