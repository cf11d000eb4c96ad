//! SQL values and parameter handling.
//!
//! [`SqlValue`] is the logical value model shared by every layer: the
//! builders collect it, the serializer maps it to what a driver can bind,
//! and result rows are made of it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

/// A SQL value that can be used as a parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without zone.
    DateTime(NaiveDateTime),
    /// Structured document (object, array, ...).
    Json(serde_json::Value),
    /// Sequence of values; the driver decides how arrays are bound.
    Array(Vec<SqlValue>),
    /// Raw SQL text injected in place of its placeholder, never bound.
    ///
    /// Meant for engine keywords such as `CURRENT_TIMESTAMP` that some
    /// engines refuse as bound parameters. The text is trusted verbatim.
    Raw(String),
}

impl SqlValue {
    /// Creates a raw SQL literal.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Converts text using the back-tick raw-literal convention.
    ///
    /// `` `CURRENT_TIMESTAMP` `` becomes `Raw("CURRENT_TIMESTAMP")`, any
    /// other string stays `Text`. Only callers migrating data that relies
    /// on the convention should use this; plain `&str` conversions never
    /// sniff for it.
    #[must_use]
    pub fn from_marked_text(text: &str) -> Self {
        match text
            .strip_prefix('`')
            .and_then(|rest| rest.strip_suffix('`'))
        {
            Some(inner) if !inner.is_empty() => Self::Raw(String::from(inner)),
            _ => Self::Text(String::from(text)),
        }
    }

    /// Returns `true` for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for raw SQL literals.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Returns the text content, if this is a `Text` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an `Int` value.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer using parameterized queries instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => quote_text(s),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::Date(d) => quote_text(&d.format(DATE_FORMAT).to_string()),
            Self::DateTime(dt) => quote_text(&dt.format(DATETIME_FORMAT).to_string()),
            Self::Json(v) => quote_text(&v.to_string()),
            Self::Array(items) => {
                let parts: Vec<String> = items.iter().map(Self::to_sql_inline).collect();
                format!("({})", parts.join(", "))
            }
            Self::Raw(sql) => sql.clone(),
        }
    }

    /// Converts the value into a JSON document.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Self::Null => J::Null,
            Self::Bool(b) => J::Bool(*b),
            Self::Int(n) => J::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(J::Null, J::Number),
            Self::Text(s) | Self::Raw(s) => J::String(s.clone()),
            Self::Blob(b) => J::Array(b.iter().map(|byte| J::from(*byte)).collect()),
            Self::Date(d) => J::String(d.format(DATE_FORMAT).to_string()),
            Self::DateTime(dt) => J::String(dt.format(DATETIME_FORMAT).to_string()),
            Self::Json(v) => v.clone(),
            Self::Array(items) => J::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

/// Calendar date pattern used for serialized dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-time pattern with microsecond precision.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

fn quote_text(s: &str) -> String {
    // Escape single quotes by doubling them
    let escaped = s.replace('\'', "''");
    format!("'{escaped}'")
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for &SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! int_to_sql_value {
    ($($ty:ty),*) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

int_to_sql_value!(i64, i32, i16, i8, u32, u16, u8);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Date(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::DateTime(self)
    }
}

impl<Tz: TimeZone> ToSqlValue for DateTime<Tz> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::DateTime(self.naive_utc())
    }
}

impl ToSqlValue for serde_json::Value {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Json(self)
    }
}

impl<T: ToSqlValue, const N: usize> ToSqlValue for [T; N] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Array(self.into_iter().map(ToSqlValue::to_sql_value).collect())
    }
}

macro_rules! from_to_sql_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    value.to_sql_value()
                }
            }
        )*
    };
}

from_to_sql_value!(bool, i64, i32, f64, String, &str, NaiveDate, NaiveDateTime, serde_json::Value);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_inline_null() {
        assert_eq!(SqlValue::Null.to_sql_inline(), "NULL");
    }

    #[test]
    fn test_sql_value_inline_text_escaping() {
        assert_eq!(
            SqlValue::Text(String::from("O'Brien")).to_sql_inline(),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_sql_value_inline_blob() {
        assert_eq!(
            SqlValue::Blob(vec![0x48, 0x45, 0x4C, 0x4C, 0x4F]).to_sql_inline(),
            "X'48454C4C4F'"
        );
    }

    #[test]
    fn test_sql_value_inline_array() {
        let list = [1_i32, 2, 3].to_sql_value();
        assert_eq!(list.to_sql_inline(), "(1, 2, 3)");
    }

    #[test]
    fn test_sql_value_inline_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(12, 30, 5, 42)
            .unwrap();
        assert_eq!(
            SqlValue::DateTime(dt).to_sql_inline(),
            "'2024-03-01 12:30:05.000042'"
        );
    }

    #[test]
    fn test_marked_text() {
        assert_eq!(
            SqlValue::from_marked_text("`CURRENT_TIMESTAMP`"),
            SqlValue::raw("CURRENT_TIMESTAMP")
        );
        assert_eq!(
            SqlValue::from_marked_text("plain"),
            SqlValue::Text(String::from("plain"))
        );
        assert_eq!(
            SqlValue::from_marked_text("``"),
            SqlValue::Text(String::from("``"))
        );
    }

    #[test]
    fn test_plain_text_never_becomes_raw() {
        assert_eq!(
            "`NOW()`".to_sql_value(),
            SqlValue::Text(String::from("`NOW()`"))
        );
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(
            serde_json::json!({"a": 1}).to_sql_value(),
            SqlValue::Json(serde_json::json!({"a": 1}))
        );
    }

    #[test]
    fn test_to_json() {
        let value = SqlValue::Array(vec![SqlValue::Int(1), SqlValue::Text(String::from("x"))]);
        assert_eq!(value.to_json(), serde_json::json!([1, "x"]));
    }
}
