//! Adding expenses and building reports against an open session.

use crate::{
    config::{Config, SchemaLayout},
    domain::{Category, Expense, NewExpense},
    errors::{ExpenseError, Result},
    query::{QueryBuilder, ReportFilter},
    storage::{Row, Session},
};

/// Result of a successful add.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    pub expense: NewExpense,
    /// True when the category row did not exist and was inserted first.
    pub category_created: bool,
}

/// Report rows in storage order. Rows are decoded as they are pulled and the
/// sequence cannot be restarted.
#[derive(Debug)]
pub struct Report {
    rows: std::vec::IntoIter<Row>,
}

impl Report {
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for Report {
    type Item = Result<Expense>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| Expense::from_row(&row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Orchestrates validation, category bookkeeping and queries for one session.
pub struct ExpenseService<'s> {
    session: &'s mut Session,
    queries: QueryBuilder,
}

impl<'s> ExpenseService<'s> {
    pub fn new(session: &'s mut Session, config: &Config) -> Self {
        Self {
            session,
            queries: QueryBuilder::from_config(config),
        }
    }

    /// Validates raw command-line input and stores it. Nothing touches storage
    /// until every field is valid.
    pub fn add_expense(
        &mut self,
        name: &str,
        amount: &str,
        category: &str,
        date: &str,
    ) -> Result<AddOutcome> {
        let expense = NewExpense::parse(name, amount, category, date)?;
        self.add(expense)
    }

    pub fn add(&mut self, expense: NewExpense) -> Result<AddOutcome> {
        let category_created = match self.queries.layout() {
            SchemaLayout::Flat => false,
            SchemaLayout::Normalized => self.ensure_category(expense.category())?,
        };

        let insert = self.queries.insert_expense();
        let params = QueryBuilder::insert_params(&expense);
        if let Err(err) = self.session.execute(&insert, &params) {
            if category_created {
                tracing::warn!(
                    category = expense.category(),
                    error = %err,
                    "category was created but the expense insert failed; the category remains"
                );
            }
            return Err(err);
        }

        tracing::info!(
            name = expense.name(),
            amount = expense.amount(),
            category = expense.category(),
            date = %expense.date_text(),
            "expense added"
        );
        Ok(AddOutcome {
            expense,
            category_created,
        })
    }

    /// Looks a category up by exact name. More than one match means the
    /// uniqueness invariant is broken and is reported, never resolved.
    pub fn find_category(&mut self, name: &str) -> Result<Option<Category>> {
        let rows = self
            .session
            .execute(&QueryBuilder::select_category_by_name(), &[name.into()])?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => Category::from_row(row).map(Some),
            many => Err(ExpenseError::DataIntegrity(format!(
                "found {} categories named `{name}`; category names must be unique",
                many.len()
            ))),
        }
    }

    /// Returns true when the category had to be created.
    fn ensure_category(&mut self, name: &str) -> Result<bool> {
        if self.find_category(name)?.is_some() {
            return Ok(false);
        }
        self.session
            .execute(&QueryBuilder::insert_category(), &[name.into()])?;
        tracing::info!(category = name, "category created");
        Ok(true)
    }

    /// Runs the filtered report query and hands back the rows in storage order.
    pub fn build_report(&mut self, filter: &ReportFilter) -> Result<Report> {
        let query = self.queries.report_query(filter)?;
        let rows = self.session.execute(&query, &[])?;
        tracing::debug!(rows = rows.len(), "report fetched");
        Ok(Report {
            rows: rows.into_iter(),
        })
    }
}
