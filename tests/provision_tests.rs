mod common;

use common::sqlite_db;
use expense_tracker::{
    config::{Config, Dialect, SchemaLayout},
    core::services::{ProvisionService, StepOutcome},
    storage::{SqlValue, Session},
    ExpenseError,
};

#[test]
fn provisions_flat_table_once() {
    let db = sqlite_db(SchemaLayout::Flat);

    let first = ProvisionService::provision(&db.config).unwrap();
    assert_eq!(first.steps.len(), 1);
    assert_eq!(first.steps[0].target, "expenses_list");
    assert_eq!(first.steps[0].outcome, StepOutcome::Done);
    assert!(db.dir.path().join("expenses.db").exists());

    let second = ProvisionService::provision(&db.config).unwrap();
    assert!(matches!(
        second.steps[0].outcome,
        StepOutcome::Skipped(ref m) if m.contains("already exists")
    ));
}

#[test]
fn custom_table_name_is_honoured() {
    let mut db = sqlite_db(SchemaLayout::Flat);
    db.config.table = "root_expenses".into();
    ProvisionService::provision(&db.config).unwrap();

    let mut session = Session::open(&db.config).unwrap();
    let rows = session
        .execute(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = %s;",
            &["root_expenses".into()],
        )
        .unwrap();
    assert_eq!(rows, vec![vec![SqlValue::from("root_expenses")]]);
}

#[test]
fn normalized_layout_creates_tables_and_view() {
    let db = sqlite_db(SchemaLayout::Normalized);
    let report = ProvisionService::provision(&db.config).unwrap();
    let targets: Vec<&str> = report.created().map(|step| step.target.as_str()).collect();
    assert_eq!(targets, vec!["categories", "expenses", "expense_report"]);

    let mut session = Session::open(&db.config).unwrap();
    let columns = session.execute("SELECT * FROM expense_report;", &[]).unwrap();
    assert!(columns.is_empty());
}

#[test]
fn postgres_without_database_name_fails_before_connecting() {
    let mut config = Config::sqlite("unused.db", SchemaLayout::Flat);
    config.dialect = Dialect::PostgreSql;
    config.filename = None;
    let err = ProvisionService::provision(&config).unwrap_err();
    assert!(matches!(err, ExpenseError::Config(_)), "{err:?}");
}
