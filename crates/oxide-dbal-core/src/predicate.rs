//! WHERE clause mini-language.
//!
//! A [`Predicate`] maps column names to conditions that are joined with
//! `AND`:
//!
//! ```rust
//! use oxide_dbal_core::predicate::Predicate;
//!
//! let predicate = Predicate::new()
//!     .eq("status", "active")
//!     .op("name", "LIKE", "a%")
//!     .op("id", "IN", [1_i64, 2, 3])
//!     .inline("created_at", ">", oxide_dbal_core::SqlValue::raw("CURRENT_DATE"));
//! ```
//!
//! Inline conditions put the value into the SQL text instead of binding
//! it. The caller accepts the injection risk that comes with that.

use crate::error::{Result, SqlError};
use crate::placeholder::MarkerSequence;
use crate::value::{SqlValue, ToSqlValue};

/// A condition on one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `col = value` (`col IS NULL` for `Null`).
    Eq(SqlValue),
    /// `col <op> value`, e.g. `LIKE`, `>=`, `IN`.
    Op {
        /// Operator text.
        op: String,
        /// Operand.
        value: SqlValue,
    },
    /// Operator, value and whether the value is bound.
    Full {
        /// Operator text.
        op: String,
        /// Operand.
        value: SqlValue,
        /// `false` inlines the value as a literal.
        bind: bool,
    },
}

/// An ordered set of column conditions joined by `AND`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<(String, Condition)>,
}

/// A compiled predicate fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    /// SQL text without the `WHERE` keyword; empty when unconditional.
    pub sql: String,
    /// Values for the placeholders in `sql`.
    pub values: Vec<SqlValue>,
}

impl Predicate {
    /// Creates an empty predicate (matches every row).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn eq<T: ToSqlValue>(self, column: &str, value: T) -> Self {
        self.with(column, Condition::Eq(value.to_sql_value()))
    }

    /// Adds an operator condition with a bound value.
    #[must_use]
    pub fn op<T: ToSqlValue>(self, column: &str, op: &str, value: T) -> Self {
        self.with(
            column,
            Condition::Op {
                op: String::from(op),
                value: value.to_sql_value(),
            },
        )
    }

    /// Adds an operator condition whose value is inlined as a literal.
    #[must_use]
    pub fn inline<T: ToSqlValue>(self, column: &str, op: &str, value: T) -> Self {
        self.with(
            column,
            Condition::Full {
                op: String::from(op),
                value: value.to_sql_value(),
                bind: false,
            },
        )
    }

    /// Adds a condition.
    #[must_use]
    pub fn with(mut self, column: &str, condition: Condition) -> Self {
        self.conditions.push((String::from(column), condition));
        self
    }

    /// Whether there are no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The conditions in order.
    #[must_use]
    pub fn conditions(&self) -> &[(String, Condition)] {
        &self.conditions
    }

    /// Compiles the predicate, drawing markers from `markers`.
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::InvalidPredicate`] for malformed operators or
    /// operands (`IN` without a list, `BETWEEN` without two bounds).
    pub fn compile(&self, markers: &mut MarkerSequence) -> Result<Fragment> {
        let mut parts = Vec::with_capacity(self.conditions.len());
        let mut values = Vec::new();
        for (column, condition) in &self.conditions {
            let (op, value, bind) = match condition {
                Condition::Eq(value) => ("=", value, true),
                Condition::Op { op, value } => (op.as_str(), value, true),
                Condition::Full { op, value, bind } => (op.as_str(), value, *bind),
            };
            parts.push(compile_condition(column, op, value, bind, markers, &mut values)?);
        }
        Ok(Fragment {
            sql: parts.join(" AND "),
            values,
        })
    }
}

fn compile_condition(
    column: &str,
    op: &str,
    value: &SqlValue,
    bind: bool,
    markers: &mut MarkerSequence,
    values: &mut Vec<SqlValue>,
) -> Result<String> {
    let op = normalize_op(column, op)?;
    let mut operand = |v: &SqlValue| -> String {
        if bind {
            values.push(v.clone());
            markers.next_marker().into_owned()
        } else {
            v.to_sql_inline()
        }
    };

    match op.as_str() {
        "=" | "IS" if value.is_null() => Ok(format!("{column} IS NULL")),
        "!=" | "<>" | "IS NOT" if value.is_null() => Ok(format!("{column} IS NOT NULL")),
        "IN" | "NOT IN" => {
            let SqlValue::Array(items) = value else {
                return Err(invalid(column, "IN expects a list"));
            };
            if items.is_empty() {
                // An empty list matches nothing (or everything when negated).
                return Ok(String::from(if op == "IN" { "1 = 0" } else { "1 = 1" }));
            }
            let list: Vec<String> = items.iter().map(&mut operand).collect();
            Ok(format!("{column} {op} ({})", list.join(", ")))
        }
        "BETWEEN" | "NOT BETWEEN" => match value {
            SqlValue::Array(bounds) if bounds.len() == 2 => {
                let low = operand(&bounds[0]);
                let high = operand(&bounds[1]);
                Ok(format!("{column} {op} {low} AND {high}"))
            }
            _ => Err(invalid(column, "BETWEEN expects a list of two bounds")),
        },
        _ => Ok(format!("{column} {op} {}", operand(value))),
    }
}

fn normalize_op(column: &str, op: &str) -> Result<String> {
    let op = op.split_whitespace().collect::<Vec<_>>().join(" ");
    let allowed =
        |c: char| c.is_ascii_alphabetic() || matches!(c, '<' | '>' | '=' | '!' | '~' | ' ');
    if op.is_empty() || !op.chars().all(allowed) {
        return Err(invalid(column, &format!("unsupported operator '{op}'")));
    }
    Ok(op.to_ascii_uppercase())
}

fn invalid(column: &str, message: &str) -> SqlError {
    SqlError::InvalidPredicate {
        column: String::from(column),
        message: String::from(message),
    }
}
