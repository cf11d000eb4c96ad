//! Error types for statement translation and building.
//!
//! Every variant here is a precondition failure: it is raised before any
//! SQL reaches a database.

use thiserror::Error;

/// Errors raised while translating placeholders or building statements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// More than one placeholder style was found in a single statement.
    #[error("mixed placeholder styles in one statement: {}", .styles.join(", "))]
    MixedPlaceholderStyle {
        /// Names of the styles that were detected, in detection order.
        styles: Vec<&'static str>,
    },

    /// Named placeholders reference parameters that were not supplied.
    #[error("missing parameter(s): {}", .names.join(", "))]
    MissingParameter {
        /// Every missing name, in order of first appearance.
        names: Vec<String>,
    },

    /// The placeholder style cannot be produced or consumed here.
    #[error("unsupported placeholder style: {0}")]
    UnsupportedPlaceholderStyle(String),

    /// A name-to-value mapping was supplied for SQL with positional markers.
    #[error("named parameters supplied for SQL that only uses positional placeholders")]
    NamedParamsForPositionalSql,

    /// Rows of a bulk operation disagree on their column set.
    #[error("row {index} has a different column set than row 0")]
    InconsistentColumns {
        /// Zero-based index of the first offending row.
        index: usize,
    },

    /// A merge key column is absent from the data.
    #[error("key column '{column}' is not present in the data")]
    MissingKeyColumn {
        /// The missing key column.
        column: String,
    },

    /// A merge was requested without any key columns.
    #[error("merge requires at least one key column")]
    NoKeyColumns,

    /// The predicate cannot be compiled.
    #[error("invalid predicate on '{column}': {message}")]
    InvalidPredicate {
        /// Column the condition was attached to.
        column: String,
        /// What is wrong with it.
        message: String,
    },

    /// No dialect is registered under the requested name.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),
}

/// Result type for translation and building.
pub type Result<T> = std::result::Result<T, SqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_lists_every_name() {
        let err = SqlError::MissingParameter {
            names: vec![String::from("a"), String::from("b")],
        };
        assert_eq!(err.to_string(), "missing parameter(s): a, b");
    }

    #[test]
    fn test_mixed_style_display() {
        let err = SqlError::MixedPlaceholderStyle {
            styles: vec!["named-colon", "positional-question"],
        };
        assert!(err.to_string().contains("named-colon, positional-question"));
    }
}
