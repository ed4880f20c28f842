//! Free-form date text to canonical `YYYY-MM-DD`.
//!
//! Numeric forms with the year last are read month-first and fall back to
//! day-first when the month is out of range, so `01.02.2023` is January 2nd
//! while `14.04.2023` is April 14th. A `%Y` field only takes a four-digit year
//! and a `%y` field only a two-digit one, so `01/05/22` is 2022-01-05.

use chrono::NaiveDate;

use crate::errors::{ExpenseError, Result};

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

const FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%m.%d.%y",
    "%d.%m.%y",
    "%m-%d-%y",
    "%d-%m-%y",
    "%b %d %Y",
    "%d %b %Y",
    "%Y %b %d",
];

pub struct DateNormalizer;

impl DateNormalizer {
    /// Parses human-entered date text into a calendar date.
    pub fn parse(text: &str) -> Result<NaiveDate> {
        let cleaned = clean(text);
        if cleaned.is_empty() {
            return Err(ExpenseError::InvalidDateFormat(text.to_string()));
        }
        if let Some(date) = try_formats(&cleaned) {
            return Ok(date);
        }
        // "2023-01-03 10:00" or "2023-01-03T10:00:00"
        let date_part = cleaned
            .split(|c: char| c == ' ' || c == 't')
            .next()
            .unwrap_or_default();
        if date_part.len() < cleaned.len() {
            if let Some(date) = try_formats(date_part) {
                return Ok(date);
            }
        }
        Err(ExpenseError::InvalidDateFormat(text.to_string()))
    }

    /// Returns the canonical `YYYY-MM-DD` form of `text`.
    pub fn normalize(text: &str) -> Result<String> {
        Ok(Self::parse(text)?.format(CANONICAL_FORMAT).to_string())
    }

    /// Canonical form wrapped as a single-quoted SQL string literal.
    pub fn quoted(text: &str) -> Result<String> {
        Ok(format!("'{}'", Self::normalize(text)?))
    }
}

fn try_formats(candidate: &str) -> Option<NaiveDate> {
    FORMATS
        .iter()
        .filter(|format| year_width_matches(candidate, format))
        .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
}

fn is_separator(c: char) -> bool {
    matches!(c, '-' | '/' | '.' | ' ')
}

/// chrono reads any digit run as `%Y`, so the year field width is checked first.
fn year_width_matches(candidate: &str, format: &str) -> bool {
    let fields: Vec<&str> = candidate.split(is_separator).collect();
    let specs: Vec<&str> = format.split(is_separator).collect();
    if fields.len() != specs.len() {
        return false;
    }
    fields.iter().zip(&specs).all(|(field, spec)| {
        let digits = field.len() == field.chars().filter(char::is_ascii_digit).count();
        match *spec {
            "%Y" => digits && field.len() == 4,
            "%y" => digits && field.len() == 2,
            _ => true,
        }
    })
}

/// Lowercases, drops commas and ordinal suffixes, and collapses whitespace.
fn clean(text: &str) -> String {
    text.to_lowercase()
        .replace(',', " ")
        .split_whitespace()
        .map(strip_ordinal)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_ordinal(token: &str) -> &str {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(number) = token.strip_suffix(suffix) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return number;
            }
        }
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_month_name_forms() {
        assert_eq!(DateNormalizer::normalize("jan 5th 2022").unwrap(), "2022-01-05");
        assert_eq!(DateNormalizer::normalize("Jan 3rd 2023").unwrap(), "2023-01-03");
        assert_eq!(DateNormalizer::normalize("4th June 2021").unwrap(), "2021-06-04");
        assert_eq!(DateNormalizer::normalize("June 4, 2021").unwrap(), "2021-06-04");
        assert_eq!(DateNormalizer::normalize("1st  August 2020").unwrap(), "2020-08-01");
    }

    #[test]
    fn parses_numeric_forms() {
        assert_eq!(DateNormalizer::normalize("14.04.2023").unwrap(), "2023-04-14");
        assert_eq!(DateNormalizer::normalize("01.02.2023").unwrap(), "2023-01-02");
        assert_eq!(DateNormalizer::normalize("2023/04/14").unwrap(), "2023-04-14");
        assert_eq!(DateNormalizer::normalize("31-12-2021").unwrap(), "2021-12-31");
        assert_eq!(DateNormalizer::normalize("2023-01-03 10:00").unwrap(), "2023-01-03");
        assert_eq!(DateNormalizer::normalize("2023-01-03T10:00:00").unwrap(), "2023-01-03");
    }

    #[test]
    fn two_digit_years_are_read_as_short_years() {
        assert_eq!(DateNormalizer::normalize("01/05/22").unwrap(), "2022-01-05");
        assert_eq!(DateNormalizer::normalize("5.1.22").unwrap(), "2022-05-01");
        assert_eq!(DateNormalizer::normalize("25.12.21").unwrap(), "2021-12-25");
        assert_eq!(DateNormalizer::normalize("12-31-99").unwrap(), "1999-12-31");
    }

    #[test]
    fn short_year_fields_never_parse_as_tiny_years() {
        for text in ["01/05/22", "5.1.22", "22-01-05", "1/2/3"] {
            if let Ok(date) = DateNormalizer::parse(text) {
                assert!(date.year() >= 1970, "{text:?} parsed as {date}");
            }
        }
        assert!(DateNormalizer::parse("1/2/123").is_err());
    }

    #[test]
    fn canonical_input_is_unchanged() {
        for canonical in ["2022-01-05", "1999-12-31", "2024-02-29"] {
            assert_eq!(DateNormalizer::normalize(canonical).unwrap(), canonical);
            let again = DateNormalizer::normalize(&DateNormalizer::normalize(canonical).unwrap());
            assert_eq!(again.unwrap(), canonical);
        }
    }

    #[test]
    fn quoted_wraps_in_single_quotes() {
        assert_eq!(DateNormalizer::quoted("4th June 2021").unwrap(), "'2021-06-04'");
    }

    #[test]
    fn rejects_unparseable_text() {
        for bad in ["", "   ", "someday", "2023-02-30", "jan 2022", "32.01.2020"] {
            let err = DateNormalizer::normalize(bad).unwrap_err();
            assert!(
                matches!(err, ExpenseError::InvalidDateFormat(ref text) if text == bad),
                "unexpected error for {bad:?}: {err:?}"
            );
        }
    }
}
