use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("expense_tracker").unwrap();
    cmd.env("EXPENSES_HOME", home.path())
        .env("EXPENSES_RDBM", "sqlite")
        .env("EXPENSES_FILENAME", home.path().join("expenses.db"))
        .env_remove("EXPENSES_SCHEMA")
        .env_remove("SCHEMA")
        .env_remove("EXPENSES_TABLE")
        .env_remove("TABLE")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn add_then_report_round_trip() {
    let home = TempDir::new().unwrap();

    cli(&home)
        .arg("create-database")
        .assert()
        .success()
        .stdout(contains("created expenses_list"));

    cli(&home)
        .args(["add", "pizza", "12.5", "food", "jan 5th 2023"])
        .assert()
        .success()
        .stdout(contains("Expense added."));

    cli(&home)
        .args(["report"])
        .assert()
        .success()
        .stdout(contains("pizza"))
        .stdout(contains("12.50"))
        .stdout(contains("2023-01-05"))
        .stdout(contains("Total: 12.50"));
}

#[test]
fn add_requires_provisioned_tables() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .args(["add", "coffee", "3", "food", "2023-02-01"])
        .assert()
        .failure()
        .stderr(contains("no such table"));

    cli(&home).arg("create_database").assert().success();
    cli(&home)
        .args(["add", "coffee", "3", "food", "2023-02-01"])
        .assert()
        .success();
}

#[test]
fn normalized_layout_reports_new_category() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .env("EXPENSES_SCHEMA", "normalized")
        .arg("create-database")
        .assert()
        .success();

    cli(&home)
        .env("EXPENSES_SCHEMA", "normalized")
        .args(["add", "train", "40", "travel", "2023-03-01"])
        .assert()
        .success()
        .stdout(contains("Category 'travel' created."));

    cli(&home)
        .env("EXPENSES_SCHEMA", "normalized")
        .args(["report", "2023-01-01", "2023-12-31", "travel"])
        .assert()
        .success()
        .stdout(contains("train"));
}

#[test]
fn empty_report_is_announced() {
    let home = TempDir::new().unwrap();
    cli(&home).arg("create-database").assert().success();
    cli(&home)
        .arg("report")
        .assert()
        .success()
        .stdout(contains("No expenses found."));
}

#[test]
fn invalid_input_exits_non_zero() {
    let home = TempDir::new().unwrap();
    cli(&home).arg("create-database").assert().success();

    cli(&home)
        .args(["add", "pizza", "-4", "food", "2023-01-01"])
        .assert()
        .failure()
        .stderr(contains("The amount has to be > 0!"));

    cli(&home)
        .args(["add", "pizza", "4", "food", "someday"])
        .assert()
        .failure()
        .stderr(contains("Wrong date format"));
}

#[test]
fn unknown_dialect_is_rejected() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .env("EXPENSES_RDBM", "oracle")
        .arg("report")
        .assert()
        .failure()
        .stderr(contains("oracle"));
}

#[test]
fn version_shows_build_metadata() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}
