//! Command-line surface: argument parsing, dispatch and human-facing output.

pub mod output;
pub mod table;

use std::io::{self, Write};

use clap::{Parser, Subcommand};

use crate::{
    config::{Config, ConfigManager},
    core::services::{ExpenseService, ProvisionReport, ProvisionService, StepOutcome},
    domain::{Expense, NewExpense},
    errors::{CliError, ExpenseError, Result},
    query::ReportFilter,
    storage::Session,
    utils::build_info,
};

use self::table::Table;

/// Record personal expenses and report on them.
#[derive(Parser, Debug)]
#[command(name = "expense_tracker")]
#[command(version, long_version = build_info::long_version())]
#[command(about = "Record personal expenses in MySQL, PostgreSQL or SQLite", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the database and its tables.
    #[command(alias = "create_database")]
    CreateDatabase,
    /// Add one expense.
    Add {
        name: String,
        /// Positive amount, integer or decimal.
        #[arg(allow_hyphen_values = true)]
        amount: String,
        category: String,
        /// Date in any supported format; stored as YYYY-MM-DD.
        date: String,
    },
    /// List expenses, optionally bounded by dates (exclusive) and a category.
    Report {
        date_min: Option<String>,
        date_max: Option<String>,
        category: Option<String>,
    },
}

/// Parses the process arguments, resolves configuration and runs the command.
pub fn run_cli() -> std::result::Result<(), CliError> {
    let cli = Cli::parse();
    let config = ConfigManager::new().resolve()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli.command, &config, &mut out)
}

pub fn run<W: Write>(
    command: Command,
    config: &Config,
    out: &mut W,
) -> std::result::Result<(), CliError> {
    tracing::debug!(?command, dialect = %config.dialect, "running command");
    match command {
        Command::CreateDatabase => {
            let report = ProvisionService::provision(config)?;
            print_provision(out, &report)
        }
        Command::Add {
            name,
            amount,
            category,
            date,
        } => add(out, config, NewExpense::parse(&name, &amount, &category, &date)?),
        Command::Report {
            date_min,
            date_max,
            category,
        } => {
            let filter = ReportFilter::new(date_min, date_max, category);
            let expenses = fetch_report(config, &filter)?;
            print_report(out, &expenses)
        }
    }
}

fn add<W: Write>(
    out: &mut W,
    config: &Config,
    expense: NewExpense,
) -> std::result::Result<(), CliError> {
    let mut session = match Session::open(config) {
        Err(ExpenseError::MissingDatabase(database)) => {
            output::warning(out, format!("Database `{database}` does not exist, creating it."))?;
            let report = ProvisionService::provision(config)?;
            print_provision(out, &report)?;
            Session::open(config)?
        }
        opened => opened?,
    };

    let outcome = ExpenseService::new(&mut session, config).add(expense)?;
    session.close()?;

    if outcome.category_created {
        output::info(out, format!("Category '{}' created.", outcome.expense.category()))?;
    }
    output::success(out, "Expense added.")
}

fn fetch_report(config: &Config, filter: &ReportFilter) -> Result<Vec<Expense>> {
    let mut session = Session::open(config)?;
    let expenses = ExpenseService::new(&mut session, config)
        .build_report(filter)?
        .collect::<Result<Vec<_>>>()?;
    session.close()?;
    Ok(expenses)
}

fn print_report<W: Write>(out: &mut W, expenses: &[Expense]) -> std::result::Result<(), CliError> {
    if expenses.is_empty() {
        writeln!(out, "No expenses found.")?;
        return Ok(());
    }
    writeln!(out, "{}", Table::for_expenses(expenses).render())?;
    let total: f64 = expenses.iter().map(|expense| expense.amount).sum();
    writeln!(out, "Total: {total:.2} ({} expenses)", expenses.len())?;
    Ok(())
}

fn print_provision<W: Write>(
    out: &mut W,
    report: &ProvisionReport,
) -> std::result::Result<(), CliError> {
    for step in &report.steps {
        match step.outcome {
            StepOutcome::Done => output::success(out, step)?,
            StepOutcome::Skipped(_) => output::warning(out, step)?,
        }
    }
    Ok(())
}
