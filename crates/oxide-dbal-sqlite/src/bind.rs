//! Conversions between [`SqlValue`] and SQLite values.

use oxide_dbal_core::value::{DATETIME_FORMAT, DATE_FORMAT};
use oxide_dbal_core::SqlValue;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, TypeInfo, ValueRef};

use oxide_dbal::{DriverError, DriverResult};

/// Binds a value to a SQLite query.
///
/// Values normally arrive already serialized for SQLite; dates and
/// documents that did not are bound as text.
pub fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) | SqlValue::Raw(s) => query.bind(s.clone()),
        SqlValue::Blob(b) => query.bind(b.clone()),
        SqlValue::Date(d) => query.bind(d.format(DATE_FORMAT).to_string()),
        SqlValue::DateTime(dt) => query.bind(dt.format(DATETIME_FORMAT).to_string()),
        SqlValue::Json(doc) => query.bind(doc.to_string()),
        SqlValue::Array(_) => query.bind(value.to_json().to_string()),
    }
}

/// Reads every column of a row by its storage class.
pub fn decode_row(row: &SqliteRow) -> DriverResult<Vec<SqlValue>> {
    (0..row.len()).map(|i| decode_column(row, i)).collect()
}

fn decode_column(row: &SqliteRow, index: usize) -> DriverResult<SqlValue> {
    let raw = row.try_get_raw(index).map_err(driver_error)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_ascii_uppercase();
    let value = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked(index).map_err(driver_error)?),
        "REAL" | "NUMERIC" => SqlValue::Float(row.try_get_unchecked(index).map_err(driver_error)?),
        "BLOB" => SqlValue::Blob(row.try_get_unchecked(index).map_err(driver_error)?),
        _ => SqlValue::Text(row.try_get_unchecked(index).map_err(driver_error)?),
    };
    Ok(value)
}

/// Wraps a sqlx error for the driver boundary.
pub fn driver_error(err: sqlx::Error) -> DriverError {
    DriverError::with_source(err.to_string(), err)
}
