//! Placeholder translation.
//!
//! SQL reaching this layer may use any of the common parameter styles:
//!
//! | style | example |
//! |-------|---------|
//! | positional question | `a = ?` |
//! | positional percent | `a = %s` |
//! | positional numbered | `a = $1`, `a = :1` |
//! | named colon | `a = :id` |
//! | named percent | `a = %(id)s` |
//! | named dollar | `a = $id` |
//!
//! [`translate`] rewrites the SQL to the positional marker of a target
//! dialect and turns the supplied [`Params`] into the matching ordered
//! value list. One statement must use exactly one style; anything else
//! is rejected rather than guessed.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, SqlError};
use crate::scan::{self, Token};
use crate::value::{SqlValue, ToSqlValue};

/// A placeholder convention found in SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderStyle {
    /// `?`
    Question,
    /// `%s`
    PercentS,
    /// `$1`, `:1`, ... with the given prefix.
    Numbered(char),
    /// `:name`
    Colon,
    /// `%(name)s`
    PercentParen,
    /// `$name`
    Dollar,
}

impl PlaceholderStyle {
    /// Whether the style binds by name.
    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(self, Self::Colon | Self::PercentParen | Self::Dollar)
    }

    /// A short human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Question => "positional-question",
            Self::PercentS => "positional-percent-s",
            Self::Numbered(_) => "positional-numbered",
            Self::Colon => "named-colon",
            Self::PercentParen => "named-percent-paren",
            Self::Dollar => "named-dollar",
        }
    }
}

impl fmt::Display for PlaceholderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The positional bound-parameter marker a dialect expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamMarker {
    /// `?`
    Question,
    /// `%s`
    PercentS,
    /// `<prefix>1`, `<prefix>2`, ...
    Numbered(char),
}

impl ParamMarker {
    /// Renders the marker for the one-based parameter `index`.
    #[must_use]
    pub fn render(self, index: usize) -> Cow<'static, str> {
        match self {
            Self::Question => Cow::Borrowed("?"),
            Self::PercentS => Cow::Borrowed("%s"),
            Self::Numbered(prefix) => Cow::Owned(format!("{prefix}{index}")),
        }
    }

    /// The style the rendered marker is detected as.
    #[must_use]
    pub const fn style(self) -> PlaceholderStyle {
        match self {
            Self::Question => PlaceholderStyle::Question,
            Self::PercentS => PlaceholderStyle::PercentS,
            Self::Numbered(prefix) => PlaceholderStyle::Numbered(prefix),
        }
    }

    /// Whether literal `%` characters must be escaped for this marker.
    #[must_use]
    pub const fn is_percent(self) -> bool {
        matches!(self, Self::PercentS)
    }
}

/// Emits consecutive markers while a statement is being assembled.
#[derive(Debug, Clone)]
pub struct MarkerSequence {
    marker: ParamMarker,
    emitted: usize,
}

impl MarkerSequence {
    /// Starts a sequence at parameter 1.
    #[must_use]
    pub const fn new(marker: ParamMarker) -> Self {
        Self {
            marker,
            emitted: 0,
        }
    }

    /// Returns the marker for the next parameter.
    pub fn next_marker(&mut self) -> Cow<'static, str> {
        self.emitted += 1;
        self.marker.render(self.emitted)
    }

    /// Number of markers emitted so far.
    #[must_use]
    pub const fn emitted(&self) -> usize {
        self.emitted
    }
}

/// Caller supplied parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    /// No parameters.
    #[default]
    None,
    /// Ordered values for positional placeholders.
    Positional(Vec<SqlValue>),
    /// Values for named placeholders.
    Named(HashMap<String, SqlValue>),
}

impl Params {
    /// Builds positional parameters.
    pub fn positional<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSqlValue,
    {
        Self::Positional(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }

    /// Builds named parameters.
    pub fn named<I, K, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: ToSqlValue,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_sql_value()))
                .collect(),
        )
    }

    /// Whether no values were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Positional(values) => values.is_empty(),
            Self::Named(map) => map.is_empty(),
        }
    }
}

impl From<Vec<SqlValue>> for Params {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::Positional(values)
    }
}

impl From<HashMap<String, SqlValue>> for Params {
    fn from(map: HashMap<String, SqlValue>) -> Self {
        Self::Named(map)
    }
}

impl From<()> for Params {
    fn from((): ()) -> Self {
        Self::None
    }
}

/// Translates `sql` and `params` into `target` positional form.
///
/// - No parameters: the SQL is returned unchanged with no values.
/// - Positional parameters: values pass through untouched; the SQL's
///   positional markers are rewritten when they differ from `target`.
///   Numbered markers (`$2`, `:1`) bind by number, so rewriting them to
///   `?` or `%s` reorders (and repeats) the values to match.
/// - Named parameters: each occurrence is replaced by a `target` marker
///   and the values are returned in occurrence order. A name used twice
///   binds its value twice.
///
/// # Errors
///
/// Fails with [`SqlError::MixedPlaceholderStyle`] when more than one
/// style is present, [`SqlError::MissingParameter`] when named
/// placeholders have no value, [`SqlError::NamedParamsForPositionalSql`]
/// when a mapping meets positional SQL and
/// [`SqlError::UnsupportedPlaceholderStyle`] when a value list meets
/// named SQL.
pub fn translate(
    sql: &str,
    params: Params,
    target: ParamMarker,
) -> Result<(String, Vec<SqlValue>)> {
    let tokens: Vec<Token<'_>> = scan::placeholders(sql).collect();
    let style = check(sql, &tokens, &params)?;

    match params {
        Params::None => Ok((String::from(sql), vec![])),
        Params::Positional(values) if values.is_empty() => Ok((String::from(sql), vec![])),
        Params::Named(map) if map.is_empty() => Ok((String::from(sql), vec![])),
        Params::Positional(values) => match (style, target) {
            (Some(found), _) if found == target.style() => Ok((String::from(sql), values)),
            (Some(PlaceholderStyle::Numbered(_)), ParamMarker::Numbered(_)) => {
                let sql = rewrite(sql, &tokens, |t| target.render(t.index.unwrap_or_default()));
                Ok((sql, values))
            }
            (Some(PlaceholderStyle::Numbered(_)), _) => {
                // Numbered markers bind by number; reorder for sequential ones.
                let ordered = tokens
                    .iter()
                    .filter_map(|t| numbered_value(t, &values).cloned())
                    .collect();
                let sql = rewrite(sql, &tokens, |_| target.render(0));
                Ok((sql, ordered))
            }
            (Some(_), _) => {
                let mut markers = MarkerSequence::new(target);
                let sql = rewrite(sql, &tokens, |_| markers.next_marker());
                Ok((sql, values))
            }
            (None, _) => Ok((String::from(sql), values)),
        },
        Params::Named(map) => {
            if tokens.is_empty() {
                return Ok((String::from(sql), vec![]));
            }
            let values = tokens
                .iter()
                .filter_map(|t| t.name.and_then(|name| map.get(name)).cloned())
                .collect();
            let mut markers = MarkerSequence::new(target);
            let sql = rewrite(sql, &tokens, |_| markers.next_marker());
            Ok((sql, values))
        }
    }
}

/// Checks that `params` can be translated against `sql`.
///
/// Runs every check [`translate`] runs without building anything.
///
/// # Errors
///
/// Returns the same errors as [`translate`].
pub fn validate(sql: &str, params: &Params) -> Result<()> {
    let tokens: Vec<Token<'_>> = scan::placeholders(sql).collect();
    check(sql, &tokens, params).map(|_| ())
}

/// Detects the single placeholder style in use, if any.
///
/// # Errors
///
/// Fails with [`SqlError::MixedPlaceholderStyle`] if styles are mixed.
pub fn detect_style(sql: &str) -> Result<Option<PlaceholderStyle>> {
    let tokens: Vec<Token<'_>> = scan::placeholders(sql).collect();
    single_style(&tokens)
}

fn single_style(tokens: &[Token<'_>]) -> Result<Option<PlaceholderStyle>> {
    let mut seen: Vec<PlaceholderStyle> = Vec::new();
    for token in tokens {
        if !seen.contains(&token.style) {
            seen.push(token.style);
        }
    }
    match seen.len() {
        0 => Ok(None),
        1 => Ok(Some(seen[0])),
        _ => Err(SqlError::MixedPlaceholderStyle {
            styles: seen.iter().map(|s| s.label()).collect(),
        }),
    }
}

fn check(sql: &str, tokens: &[Token<'_>], params: &Params) -> Result<Option<PlaceholderStyle>> {
    let style = single_style(tokens)?;
    match (params, style) {
        (Params::Named(map), Some(found)) if !map.is_empty() => {
            if !found.is_named() {
                return Err(SqlError::NamedParamsForPositionalSql);
            }
            let mut missing: Vec<String> = Vec::new();
            for name in tokens.iter().filter_map(|t| t.name) {
                if !map.contains_key(name) && !missing.iter().any(|m| m == name) {
                    missing.push(String::from(name));
                }
            }
            if missing.is_empty() {
                Ok(style)
            } else {
                Err(SqlError::MissingParameter { names: missing })
            }
        }
        (Params::Positional(values), Some(found)) if !values.is_empty() && found.is_named() => {
            Err(SqlError::UnsupportedPlaceholderStyle(format!(
                "{found} placeholders need named parameters"
            )))
        }
        (Params::Positional(values), Some(PlaceholderStyle::Numbered(_))) if !values.is_empty() => {
            let mut missing: Vec<String> = Vec::new();
            for token in tokens.iter().filter(|t| numbered_value(t, values).is_none()) {
                let text = String::from(token.text(sql));
                if !missing.contains(&text) {
                    missing.push(text);
                }
            }
            if missing.is_empty() {
                Ok(style)
            } else {
                Err(SqlError::MissingParameter { names: missing })
            }
        }
        _ => Ok(style),
    }
}

/// The value a numbered marker refers to, if it is in range.
fn numbered_value<'v>(token: &Token<'_>, values: &'v [SqlValue]) -> Option<&'v SqlValue> {
    token
        .index
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| values.get(i))
}

/// Copies `sql`, replacing every token with `replacement(token)`.
pub(crate) fn rewrite<'t, F, S>(sql: &str, tokens: &[Token<'t>], mut replacement: F) -> String
where
    F: FnMut(&Token<'t>) -> S,
    S: AsRef<str>,
{
    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for token in tokens {
        out.push_str(&sql[last..token.start]);
        out.push_str(replacement(token).as_ref());
        last = token.end;
    }
    out.push_str(&sql[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_passthrough_keeps_order() {
        let values = vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)];
        let (sql, out) = translate(
            "SELECT * FROM t WHERE a = ? AND b = ? AND c = ?",
            Params::Positional(values.clone()),
            ParamMarker::Question,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = ? AND b = ? AND c = ?");
        assert_eq!(out, values);
    }

    #[test]
    fn test_positional_symbol_rewrite() {
        let (sql, _) = translate(
            "INSERT INTO t (a, b) VALUES (%s, %s)",
            Params::positional([1_i64, 2]),
            ParamMarker::Question,
        )
        .unwrap();
        assert_eq!(sql, "INSERT INTO t (a, b) VALUES (?, ?)");

        let (sql, _) = translate(
            "INSERT INTO t (a, b) VALUES (?, ?)",
            Params::positional([1_i64, 2]),
            ParamMarker::Numbered(':'),
        )
        .unwrap();
        assert_eq!(sql, "INSERT INTO t (a, b) VALUES (:1, :2)");
    }

    #[test]
    fn test_numbered_to_sequential_reorders_values() {
        let (sql, values) = translate(
            "SELECT * FROM t WHERE a = $2 AND b = $1",
            Params::positional(["first", "second"]),
            ParamMarker::Question,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = ? AND b = ?");
        assert_eq!(values, vec![SqlValue::from("second"), SqlValue::from("first")]);

        let (sql, values) = translate(
            "SELECT * FROM t WHERE a = :1 OR b = :1",
            Params::positional(["x"]),
            ParamMarker::PercentS,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = %s OR b = %s");
        assert_eq!(values, vec![SqlValue::from("x"), SqlValue::from("x")]);
    }

    #[test]
    fn test_numbered_to_numbered_keeps_numbers() {
        let (sql, values) = translate(
            "SELECT * FROM t WHERE a = $2 AND b = $1",
            Params::positional([1_i64, 2]),
            ParamMarker::Numbered('$'),
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = $2 AND b = $1");
        assert_eq!(values, vec![SqlValue::Int(1), SqlValue::Int(2)]);

        let (sql, _) = translate(
            "SELECT * FROM t WHERE a = $2 AND b = $1",
            Params::positional([1_i64, 2]),
            ParamMarker::Numbered(':'),
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = :2 AND b = :1");
    }

    #[test]
    fn test_numbered_out_of_range_is_missing() {
        let err = translate(
            "SELECT * FROM t WHERE a = $1 AND b = $3",
            Params::positional([1_i64, 2]),
            ParamMarker::Question,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SqlError::MissingParameter {
                names: vec![String::from("$3")]
            }
        );
    }

    #[test]
    fn test_no_params_returns_sql_unchanged() {
        let (sql, values) = translate("SELECT :x", Params::None, ParamMarker::Question).unwrap();
        assert_eq!(sql, "SELECT :x");
        assert!(values.is_empty());
    }

    #[test]
    fn test_named_follows_occurrence_order() {
        let params = Params::named([("b", 2_i64), ("a", 1_i64), ("unused", 9_i64)]);
        let (sql, values) = translate(
            "UPDATE t SET x = :b WHERE id = :a OR parent = :b",
            params,
            ParamMarker::PercentS,
        )
        .unwrap();
        assert_eq!(sql, "UPDATE t SET x = %s WHERE id = %s OR parent = %s");
        assert_eq!(
            values,
            vec![SqlValue::Int(2), SqlValue::Int(1), SqlValue::Int(2)]
        );
    }

    #[test]
    fn test_named_percent_paren_and_dollar() {
        let (sql, values) = translate(
            "SELECT * FROM t WHERE a = %(a)s",
            Params::named([("a", "x")]),
            ParamMarker::Question,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = ?");
        assert_eq!(values, vec![SqlValue::Text(String::from("x"))]);

        let (sql, _) = translate(
            "SELECT * FROM t WHERE a = $a AND b = $b",
            Params::named([("a", 1_i64), ("b", 2_i64)]),
            ParamMarker::Numbered('$'),
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = $1 AND b = $2");
    }

    #[test]
    fn test_named_ignores_casts() {
        let (sql, values) = translate(
            "SELECT :v::int",
            Params::named([("v", "5")]),
            ParamMarker::PercentS,
        )
        .unwrap();
        assert_eq!(sql, "SELECT %s::int");
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_missing_parameters_all_reported() {
        let err = translate(
            "SELECT * FROM t WHERE a = :a AND b = :b AND c = :c AND d = :b",
            Params::named([("a", 1_i64)]),
            ParamMarker::Question,
        )
        .unwrap_err();
        assert_eq!(
            err,
            SqlError::MissingParameter {
                names: vec![String::from("b"), String::from("c")]
            }
        );
    }

    #[test]
    fn test_mixed_styles_always_fail() {
        for params in [
            Params::None,
            Params::positional([1_i64, 2]),
            Params::named([("a", 1_i64)]),
        ] {
            let err = translate("SELECT ? , :a", params, ParamMarker::Question).unwrap_err();
            assert!(matches!(err, SqlError::MixedPlaceholderStyle { .. }));
        }
        assert!(matches!(
            detect_style("a = :a AND b = %(b)s"),
            Err(SqlError::MixedPlaceholderStyle { .. })
        ));
    }

    #[test]
    fn test_mapping_for_positional_sql_is_rejected() {
        let err = translate(
            "SELECT * FROM t WHERE a = ?",
            Params::named([("a", 1_i64)]),
            ParamMarker::Question,
        )
        .unwrap_err();
        assert_eq!(err, SqlError::NamedParamsForPositionalSql);
    }

    #[test]
    fn test_values_for_named_sql_are_rejected() {
        let err = validate("SELECT :a", &Params::positional([1_i64])).unwrap_err();
        assert!(matches!(err, SqlError::UnsupportedPlaceholderStyle(_)));
    }

    #[test]
    fn test_validate_does_not_build() {
        assert!(validate("SELECT :a", &Params::named([("a", 1_i64)])).is_ok());
        assert!(validate("SELECT :a", &Params::named([("b", 1_i64)])).is_err());
    }

    #[test]
    fn test_marker_sequence() {
        let mut seq = MarkerSequence::new(ParamMarker::Numbered('$'));
        assert_eq!(seq.next_marker(), "$1");
        assert_eq!(seq.next_marker(), "$2");
        assert_eq!(seq.emitted(), 2);
    }
}
