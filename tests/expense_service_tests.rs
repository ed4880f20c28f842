mod common;

use common::{provisioned_db, TestDb};
use expense_tracker::{
    config::SchemaLayout,
    core::services::ExpenseService,
    domain::Expense,
    query::ReportFilter,
    storage::{Session, SessionState},
    ExpenseError, Result,
};

fn report(session: &mut Session, db: &TestDb, filter: ReportFilter) -> Vec<Expense> {
    ExpenseService::new(session, &db.config)
        .build_report(&filter)
        .expect("build report")
        .collect::<Result<Vec<_>>>()
        .expect("decode rows")
}

#[test]
fn expenses_persist_across_sessions() {
    let db = provisioned_db(SchemaLayout::Flat);
    {
        let mut session = Session::open(&db.config).unwrap();
        let mut service = ExpenseService::new(&mut session, &db.config);
        service.add_expense("rent", "950", "housing", "jan 1st 2023").unwrap();
        service.add_expense("lunch", "11.40", "food", "2023/01/02").unwrap();
    }

    let mut session = Session::open(&db.config).unwrap();
    let rows = report(&mut session, &db, ReportFilter::default());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].date, "2023-01-01");
    assert_eq!(rows[1].name, "lunch");
    assert_eq!(rows[1].amount, 11.4);
}

#[test]
fn date_bounds_are_exclusive() {
    let db = provisioned_db(SchemaLayout::Flat);
    let mut session = Session::open(&db.config).unwrap();
    {
        let mut service = ExpenseService::new(&mut session, &db.config);
        for (name, date) in [("a", "2023-01-05"), ("b", "2023-01-06"), ("c", "2023-01-07")] {
            service.add_expense(name, "1", "misc", date).unwrap();
        }
    }

    let filter = ReportFilter::new(Some("2023-01-05".into()), Some("2023-01-07".into()), None);
    let names: Vec<String> = report(&mut session, &db, filter)
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["b"]);
}

#[test]
fn unknown_category_yields_empty_report() {
    let db = provisioned_db(SchemaLayout::Normalized);
    let mut session = Session::open(&db.config).unwrap();
    ExpenseService::new(&mut session, &db.config)
        .add_expense("pizza", "12", "food", "2023-01-10")
        .unwrap();

    let filter = ReportFilter::new(None, None, Some("travel".into()));
    assert!(report(&mut session, &db, filter).is_empty());
}

#[test]
fn normalized_layout_reuses_categories() {
    let db = provisioned_db(SchemaLayout::Normalized);
    let mut session = Session::open(&db.config).unwrap();
    {
        let mut service = ExpenseService::new(&mut session, &db.config);
        for (name, category, date, created) in [
            ("pizza", "food", "2023-01-10", true),
            ("train", "travel", "2023-01-11", true),
            ("bread", "food", "2023-01-12", false),
        ] {
            let outcome = service.add_expense(name, "2", category, date).unwrap();
            assert_eq!(outcome.category_created, created, "{name}");
        }
    }

    let categories = session
        .execute("SELECT category_name FROM categories ORDER BY category_id;", &[])
        .unwrap();
    assert_eq!(categories.len(), 2);

    let rows = report(&mut session, &db, ReportFilter::new(None, None, Some("food".into())));
    let names: Vec<&str> = rows.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["pizza", "bread"]);
}

#[test]
fn validation_failures_leave_storage_untouched() {
    let db = provisioned_db(SchemaLayout::Normalized);
    let mut session = Session::open(&db.config).unwrap();
    {
        let mut service = ExpenseService::new(&mut session, &db.config);
        for (name, amount, category, date) in [
            ("", "3", "food", "2023-01-01"),
            ("pizza", "0", "food", "2023-01-01"),
            ("pizza", "abc", "food", "2023-01-01"),
            ("pizza", "3", "", "2023-01-01"),
            ("pizza", "3", "food", "13/13/2023"),
        ] {
            let err = service.add_expense(name, amount, category, date).unwrap_err();
            assert!(err.is_validation(), "{name:?} {amount:?} {date:?}: {err:?}");
        }
    }

    assert!(session.execute("SELECT * FROM categories;", &[]).unwrap().is_empty());
    assert!(session.execute("SELECT * FROM expenses;", &[]).unwrap().is_empty());
}

#[test]
fn closed_session_rejects_further_work() {
    let db = provisioned_db(SchemaLayout::Flat);
    let mut session = Session::open(&db.config).unwrap();
    let err = ExpenseService::new(&mut session, &db.config)
        .add_expense("pizza", "-1", "food", "2023-01-01")
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(session.state(), SessionState::Open);

    session.close().unwrap();
    session.close().unwrap();
    assert_eq!(session.state(), SessionState::Closed);
    assert!(matches!(
        session.execute("SELECT 1;", &[]),
        Err(ExpenseError::SessionClosed)
    ));
}
