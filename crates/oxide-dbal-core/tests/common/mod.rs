#![allow(dead_code)]

use oxide_dbal_core::placeholder::{translate, ParamMarker, Params};
use oxide_dbal_core::{Dialect, DialectRegistry, Row, SqlError, SqlValue, Statement};

pub fn dialect(name: &str) -> Dialect {
    DialectRegistry::with_builtins()
        .get(name)
        .unwrap_or_else(|e| panic!("Unknown dialect {name}: {e}"))
}

pub fn translated(sql: &str, params: Params, target: ParamMarker) -> (String, Vec<SqlValue>) {
    translate(sql, params, target)
        .unwrap_or_else(|e| panic!("Failed to translate: {sql}\nError: {e:?}"))
}

pub fn translate_err(sql: &str, params: Params) -> SqlError {
    translate(sql, params, ParamMarker::Question)
        .expect_err(&format!("Expected translation error for: {sql}"))
}

pub fn user(email: &str, name: &str) -> Row {
    Row::new().with("email", email).with("name", name)
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}

/// Final SQL and values as a driver would receive them.
pub fn prepared(stmt: Statement, dialect: &Dialect) -> (String, Vec<SqlValue>) {
    let prepared = stmt.prepare(dialect);
    (prepared.sql, prepared.values)
}
