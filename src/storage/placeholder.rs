//! Rewrites the canonical `%s` parameter marker into dialect syntax.

use crate::{config::Dialect, query::CANONICAL_PLACEHOLDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Positional `?` (MySQL, SQLite).
    QuestionMark,
    /// Numbered `$1, $2, ...` (PostgreSQL).
    Numbered,
}

impl PlaceholderStyle {
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::MySql | Dialect::Sqlite => PlaceholderStyle::QuestionMark,
            Dialect::PostgreSql => PlaceholderStyle::Numbered,
        }
    }
}

/// Replaces every `%s` outside single-quoted literals, numbering left to right.
pub fn translate_placeholders(query: &str, style: PlaceholderStyle) -> String {
    let mut out = String::with_capacity(query.len());
    let mut in_literal = false;
    let mut index = 0;
    let mut rest = query;

    while let Some(ch) = rest.chars().next() {
        if !in_literal && rest.starts_with(CANONICAL_PLACEHOLDER) {
            index += 1;
            match style {
                PlaceholderStyle::QuestionMark => out.push('?'),
                PlaceholderStyle::Numbered => {
                    out.push('$');
                    out.push_str(&index.to_string());
                }
            }
            rest = &rest[CANONICAL_PLACEHOLDER.len()..];
            continue;
        }
        if ch == '\'' {
            in_literal = !in_literal;
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}
