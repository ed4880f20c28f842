//! Expense records: the validated input form and the stored row form.

use std::fmt;

use chrono::NaiveDate;

use crate::{
    domain::date::{DateNormalizer, CANONICAL_FORMAT},
    errors::{ExpenseError, Result},
    storage::{Row, SqlValue},
};

/// An expense that passed validation but has not been stored yet. It carries no
/// id: keys are always assigned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    name: String,
    amount: f64,
    category: String,
    date: NaiveDate,
}

impl NewExpense {
    /// Validates the expense invariants, reporting the first one violated.
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Result<Self> {
        let name = name.into();
        let category = category.into();
        if name.trim().is_empty() {
            return Err(ExpenseError::Validation("Missing name.".into()));
        }
        if !amount.is_finite() {
            return Err(ExpenseError::Validation(
                "The amount should be a number!".into(),
            ));
        }
        if amount <= 0.0 {
            return Err(ExpenseError::Validation("The amount has to be > 0!".into()));
        }
        if category.trim().is_empty() {
            return Err(ExpenseError::Validation("Missing category.".into()));
        }
        Ok(Self {
            name,
            amount,
            category,
            date,
        })
    }

    /// Builds an expense from raw command-line text.
    pub fn parse(name: &str, amount: &str, category: &str, date: &str) -> Result<Self> {
        let date = DateNormalizer::parse(date)?;
        if name.trim().is_empty() {
            return Err(ExpenseError::Validation("Missing name.".into()));
        }
        let trimmed = amount.trim();
        if trimmed.is_empty() {
            return Err(ExpenseError::Validation("Missing amount argument!".into()));
        }
        let amount = trimmed.parse::<f64>().map_err(|_| {
            ExpenseError::Validation(format!("The amount should be a number, got `{trimmed}`!"))
        })?;
        Self::new(name, amount, category, date)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Date in the canonical text form used for storage and comparisons.
    pub fn date_text(&self) -> String {
        self.date.format(CANONICAL_FORMAT).to_string()
    }
}

/// A stored expense as returned by a report: `(id, name, amount, category, date)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
}

impl Expense {
    pub fn from_row(row: &Row) -> Result<Self> {
        if row.len() < 5 {
            return Err(ExpenseError::Query(format!(
                "expected 5 columns in an expense row, got {}",
                row.len()
            )));
        }
        let column = |idx: usize, label: &str| -> ExpenseError {
            ExpenseError::Query(format!("column {idx} ({label}) has an unexpected value"))
        };
        Ok(Self {
            id: row[0].as_i64().ok_or_else(|| column(0, "id"))?,
            name: row[1].as_text().ok_or_else(|| column(1, "name"))?,
            amount: row[2].as_f64().ok_or_else(|| column(2, "amount"))?,
            category: row[3].as_text().ok_or_else(|| column(3, "category"))?,
            date: match &row[4] {
                SqlValue::Null => String::new(),
                other => other.as_text().ok_or_else(|| column(4, "date"))?,
            },
        })
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {:.2} [{}] {}",
            self.id, self.name, self.amount, self.category, self.date
        )
    }
}
