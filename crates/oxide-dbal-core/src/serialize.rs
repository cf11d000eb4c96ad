//! Value serialization and final SQL preparation.
//!
//! The last steps before SQL reaches a driver, always in this order:
//!
//! 1. every value is serialized for the dialect ([`serialize`]);
//! 2. raw literals replace their placeholder in the text and leave the
//!    value list ([`inject_literals`]);
//! 3. for `%s` dialects, every `%` that is not part of a `%s` marker is
//!    doubled ([`escape_percent`]).
//!
//! Escaping runs once, on the fully substituted text, so literals that
//! contain `%` (`LIKE 'a%'`, injected raw SQL) are escaped exactly like
//! the rest of the statement.

use std::collections::HashMap;

use crate::dialect::{Dialect, StructuredStorage};
use crate::placeholder::{rewrite, PlaceholderStyle};
use crate::scan::{self, Token};
use crate::value::{SqlValue, DATETIME_FORMAT, DATE_FORMAT};

/// Result of serializing one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Serialized {
    /// Bind this value.
    Bound(SqlValue),
    /// Put this text in place of the placeholder.
    Literal(String),
}

/// SQL text and the values to bind, ready for a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    /// Final SQL text.
    pub sql: String,
    /// Values, one per remaining placeholder.
    pub values: Vec<SqlValue>,
}

/// Serializes one value for a dialect's storage conventions.
#[must_use]
pub fn serialize(value: SqlValue, structured: StructuredStorage) -> Serialized {
    match value {
        SqlValue::Raw(sql) => Serialized::Literal(sql),
        SqlValue::Date(d) => Serialized::Bound(SqlValue::Text(d.format(DATE_FORMAT).to_string())),
        SqlValue::DateTime(dt) => {
            Serialized::Bound(SqlValue::Text(dt.format(DATETIME_FORMAT).to_string()))
        }
        SqlValue::Json(doc) => Serialized::Bound(match structured {
            StructuredStorage::Text => SqlValue::Text(doc.to_string()),
            StructuredStorage::Native => SqlValue::Json(doc),
        }),
        SqlValue::Array(items) if matches!(items.first(), Some(SqlValue::Json(_))) => {
            let doc = serde_json::Value::Array(items.iter().map(SqlValue::to_json).collect());
            Serialized::Bound(match structured {
                StructuredStorage::Text => SqlValue::Text(doc.to_string()),
                StructuredStorage::Native => SqlValue::Json(doc),
            })
        }
        other => Serialized::Bound(other),
    }
}

/// Serializes `values` and injects raw literals into `sql`.
///
/// The n-th positional placeholder pairs with the n-th value (numbered
/// markers pair by their number). Literal values replace their
/// placeholder text; numbered markers are renumbered so the remaining
/// ones stay dense.
#[must_use]
pub fn inject_literals(sql: &str, values: Vec<SqlValue>, dialect: &Dialect) -> Prepared {
    let serialized: Vec<Serialized> = values
        .into_iter()
        .map(|v| serialize(v, dialect.structured))
        .collect();

    let tokens: Vec<Token<'_>> = scan::placeholders(sql)
        .filter(|t| !t.style.is_named())
        .collect();

    if !serialized.iter().any(|s| matches!(s, Serialized::Literal(_))) {
        return Prepared {
            sql: String::from(sql),
            values: serialized.into_iter().map(into_bound).collect(),
        };
    }

    // Old value index -> new one-based marker number for bound values.
    let mut renumber: HashMap<usize, usize> = HashMap::new();
    let mut bound = Vec::with_capacity(serialized.len());
    for (idx, value) in serialized.iter().enumerate() {
        if let Serialized::Bound(v) = value {
            bound.push(v.clone());
            renumber.insert(idx, bound.len());
        }
    }

    let mut position = 0;
    let sql = rewrite(sql, &tokens, |token| {
        let idx = match token.style {
            PlaceholderStyle::Numbered(_) => token.index.unwrap_or(1).saturating_sub(1),
            _ => {
                position += 1;
                position - 1
            }
        };
        match (serialized.get(idx), token.style) {
            (Some(Serialized::Literal(text)), _) => text.clone(),
            (Some(Serialized::Bound(_)), PlaceholderStyle::Numbered(prefix)) => {
                format!("{prefix}{}", renumber[&idx])
            }
            _ => String::from(token.text(sql)),
        }
    });

    Prepared { sql, values: bound }
}

fn into_bound(value: Serialized) -> SqlValue {
    match value {
        Serialized::Bound(v) => v,
        Serialized::Literal(text) => SqlValue::Text(text),
    }
}

/// Doubles every `%` that is not immediately followed by `s`.
#[must_use]
pub fn escape_percent(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if chars.peek() == Some(&'s') {
                out.push_str("%s");
                chars.next();
            } else {
                out.push_str("%%");
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Runs literal injection and, for `%s` dialects, percent escaping.
#[must_use]
pub fn finalize(sql: &str, values: Vec<SqlValue>, dialect: &Dialect) -> Prepared {
    let mut prepared = inject_literals(sql, values, dialect);
    if dialect.escapes_percent() {
        prepared.sql = escape_percent(&prepared.sql);
    }
    prepared
}
