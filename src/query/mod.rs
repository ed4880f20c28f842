//! Dialect-independent SQL text for inserting expenses and filtering reports.
//!
//! Parameterized statements use the canonical `%s` marker; connectors rewrite
//! it into their own placeholder syntax before execution.

use crate::{
    config::{Config, SchemaLayout},
    domain::{DateNormalizer, NewExpense},
    errors::Result,
    storage::SqlValue,
};

pub const CANONICAL_PLACEHOLDER: &str = "%s";

pub const EXPENSES_TABLE: &str = "expenses";
pub const CATEGORIES_TABLE: &str = "categories";
pub const REPORT_VIEW: &str = "expense_report";

const SELECT_ALL: &str = "SELECT * FROM";
const DATE_MIN: &str = "date >";
const DATE_MAX: &str = "date <";
const CATEGORY_EQ: &str = "category = ";

/// Optional report filters, consumed once to build a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub date_min: Option<String>,
    pub date_max: Option<String>,
    pub category: Option<String>,
}

impl ReportFilter {
    pub fn new(
        date_min: Option<String>,
        date_max: Option<String>,
        category: Option<String>,
    ) -> Self {
        Self {
            date_min,
            date_max,
            category,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date_min.is_none() && self.date_max.is_none() && self.category.is_none()
    }
}

/// Builds statements for one schema layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    layout: SchemaLayout,
    table: String,
}

impl QueryBuilder {
    pub fn new(layout: SchemaLayout, table: impl Into<String>) -> Self {
        Self {
            layout,
            table: table.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.layout, config.table.clone())
    }

    pub fn layout(&self) -> SchemaLayout {
        self.layout
    }

    /// Relation the report selects from: the flat table, or the joined view.
    pub fn report_source(&self) -> &str {
        match self.layout {
            SchemaLayout::Flat => &self.table,
            SchemaLayout::Normalized => REPORT_VIEW,
        }
    }

    /// Builds `SELECT * FROM <source> [WHERE ...];` with clauses always in the
    /// order date-min, date-max, category. Fails without a partial query when a
    /// date cannot be normalized.
    pub fn report_query(&self, filter: &ReportFilter) -> Result<String> {
        let mut query = format!("{SELECT_ALL} {}", self.report_source());
        if filter.is_empty() {
            query.push(';');
            return Ok(query);
        }

        let mut clauses = Vec::with_capacity(3);
        if let Some(date_min) = &filter.date_min {
            clauses.push(format!("{DATE_MIN}{}", DateNormalizer::quoted(date_min)?));
        }
        if let Some(date_max) = &filter.date_max {
            clauses.push(format!("{DATE_MAX}{}", DateNormalizer::quoted(date_max)?));
        }
        if let Some(category) = &filter.category {
            clauses.push(format!("{CATEGORY_EQ}{}", quote_literal(category)));
        }

        query.push_str(" WHERE ");
        query.push_str(&clauses.join(" AND "));
        query.push(';');
        Ok(query)
    }

    /// Insert statement for an expense; the id column is left to storage.
    pub fn insert_expense(&self) -> String {
        match self.layout {
            SchemaLayout::Flat => format!(
                "INSERT INTO {} (name, amount, category, date) VALUES (%s, %s, %s, %s);",
                self.table
            ),
            SchemaLayout::Normalized => format!(
                "INSERT INTO {EXPENSES_TABLE} (name, amount, category_id, date) VALUES (%s, %s, {}, %s);",
                category_lookup_subquery()
            ),
        }
    }

    /// Parameters matching [`QueryBuilder::insert_expense`], in marker order.
    pub fn insert_params(expense: &NewExpense) -> Vec<SqlValue> {
        vec![
            SqlValue::from(expense.name()),
            SqlValue::Real(expense.amount()),
            SqlValue::from(expense.category()),
            SqlValue::Text(expense.date_text()),
        ]
    }

    pub fn select_category_by_name() -> String {
        format!("SELECT category_id, category_name FROM {CATEGORIES_TABLE} WHERE category_name = %s;")
    }

    pub fn insert_category() -> String {
        format!("INSERT INTO {CATEGORIES_TABLE} (category_name) VALUES (%s);")
    }
}

/// Nested lookup resolving a category name to its key inside the insert.
pub fn category_lookup_subquery() -> String {
    format!("(SELECT category_id FROM {CATEGORIES_TABLE} WHERE category_name = %s)")
}

/// Wraps raw text as a single-quoted SQL literal.
///
/// WARNING: embedded quotes are not escaped, so a category containing `'` can
/// alter the report query. Report filters are the only caller; a parameterized
/// filter would replace this function.
pub fn quote_literal(text: &str) -> String {
    format!("'{text}'")
}
