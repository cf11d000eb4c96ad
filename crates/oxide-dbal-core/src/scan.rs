//! Lexical scanning of SQL text.
//!
//! The scanner only understands what it needs to find placeholders and
//! statement boundaries safely: quoted strings, quoted identifiers,
//! comments and `::` casts are skipped, everything else is left alone.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::placeholder::PlaceholderStyle;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
          (?P<skip>
              '(?:[^']|'')*'
            | "(?:[^"]|"")*"
            | --[^\n]*
            | /\*(?s:.*?)\*/
            | ::
            | %%
          )
        | %\((?P<pparen>[A-Za-z_][A-Za-z0-9_]*)\)s
        | (?P<percent_s>%s)
        | (?P<question>\?)
        | :(?P<colon>[A-Za-z_][A-Za-z0-9_]*)
        | :(?P<colon_num>[0-9]+)
        | \$(?P<dollar>[A-Za-z_][A-Za-z0-9_]*)
        | \$(?P<dollar_num>[0-9]+)
        | (?P<semi>;)
        "#,
    )
    .expect("Invalid SQL token regex")
});

/// A placeholder occurrence in SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Detected style.
    pub style: PlaceholderStyle,
    /// Parameter name for named styles.
    pub name: Option<&'a str>,
    /// One-based index for numbered positional styles.
    pub index: Option<usize>,
}

impl Token<'_> {
    /// The original text of the token.
    #[must_use]
    pub fn text<'s>(&self, sql: &'s str) -> &'s str {
        &sql[self.start..self.end]
    }
}

/// Returns every placeholder in `sql`, in order of appearance.
pub fn placeholders(sql: &str) -> impl Iterator<Item = Token<'_>> {
    TOKEN
        .captures_iter(sql)
        .filter_map(|caps| placeholder_from(&caps))
}

fn placeholder_from<'a>(caps: &Captures<'a>) -> Option<Token<'a>> {
    let whole = caps.get(0)?;
    let (style, name, index) = if let Some(m) = caps.name("pparen") {
        (PlaceholderStyle::PercentParen, Some(m.as_str()), None)
    } else if caps.name("percent_s").is_some() {
        (PlaceholderStyle::PercentS, None, None)
    } else if caps.name("question").is_some() {
        (PlaceholderStyle::Question, None, None)
    } else if let Some(m) = caps.name("colon") {
        (PlaceholderStyle::Colon, Some(m.as_str()), None)
    } else if let Some(m) = caps.name("colon_num") {
        (PlaceholderStyle::Numbered(':'), None, m.as_str().parse().ok())
    } else if let Some(m) = caps.name("dollar") {
        (PlaceholderStyle::Dollar, Some(m.as_str()), None)
    } else if let Some(m) = caps.name("dollar_num") {
        (PlaceholderStyle::Numbered('$'), None, m.as_str().parse().ok())
    } else {
        return None;
    };
    Some(Token {
        start: whole.start(),
        end: whole.end(),
        style,
        name,
        index,
    })
}

/// Splits a script into statements on `;` outside quotes and comments.
///
/// Statements are trimmed; empty ones (including comment-only tails) are
/// dropped.
#[must_use]
pub fn split_statements(script: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut start = 0;
    for caps in TOKEN.captures_iter(script) {
        if let Some(semi) = caps.name("semi") {
            push_statement(&mut statements, &script[start..semi.start()]);
            start = semi.end();
        }
    }
    push_statement(&mut statements, &script[start..]);
    statements
}

fn push_statement<'a>(statements: &mut Vec<&'a str>, piece: &'a str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() && !is_only_comments(trimmed) {
        statements.push(trimmed);
    }
}

fn is_only_comments(piece: &str) -> bool {
    piece
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(sql: &str) -> Vec<PlaceholderStyle> {
        placeholders(sql).map(|t| t.style).collect()
    }

    #[test]
    fn test_positional_styles() {
        assert_eq!(
            styles("SELECT * FROM t WHERE a = ? AND b = ?"),
            vec![PlaceholderStyle::Question, PlaceholderStyle::Question]
        );
        assert_eq!(
            styles("INSERT INTO t VALUES (%s, %s)"),
            vec![PlaceholderStyle::PercentS, PlaceholderStyle::PercentS]
        );
    }

    #[test]
    fn test_named_styles() {
        let tokens: Vec<_> = placeholders("a = :id AND b = %(name)s AND c = $code").collect();
        assert_eq!(tokens[0].style, PlaceholderStyle::Colon);
        assert_eq!(tokens[0].name, Some("id"));
        assert_eq!(tokens[1].style, PlaceholderStyle::PercentParen);
        assert_eq!(tokens[1].name, Some("name"));
        assert_eq!(tokens[2].style, PlaceholderStyle::Dollar);
        assert_eq!(tokens[2].name, Some("code"));
    }

    #[test]
    fn test_numbered_styles() {
        let tokens: Vec<_> = placeholders("a = $2 AND b = :1").collect();
        assert_eq!(tokens[0].style, PlaceholderStyle::Numbered('$'));
        assert_eq!(tokens[0].index, Some(2));
        assert_eq!(tokens[1].style, PlaceholderStyle::Numbered(':'));
        assert_eq!(tokens[1].index, Some(1));
    }

    #[test]
    fn test_casts_are_not_placeholders() {
        assert_eq!(
            styles("SELECT a::text FROM t WHERE b = :b"),
            vec![PlaceholderStyle::Colon]
        );
    }

    #[test]
    fn test_quoted_text_is_skipped() {
        assert!(styles("SELECT '?', 'it''s :x', \"col?\" FROM t -- ?\n").is_empty());
        assert!(styles("SELECT 1 /* :skip ? */").is_empty());
    }

    #[test]
    fn test_split_statements() {
        let script = "CREATE TABLE t (a TEXT);\nINSERT INTO t VALUES ('x;y');\n-- done\n";
        assert_eq!(
            split_statements(script),
            vec!["CREATE TABLE t (a TEXT)", "INSERT INTO t VALUES ('x;y')"]
        );
    }
}
