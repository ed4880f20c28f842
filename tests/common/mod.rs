#![allow(dead_code)]

use expense_tracker::{
    config::{Config, SchemaLayout},
    core::services::ProvisionService,
};
use tempfile::TempDir;

/// A SQLite database file inside a temporary directory that lives as long as
/// the guard.
pub struct TestDb {
    pub dir: TempDir,
    pub config: Config,
}

pub fn sqlite_db(layout: SchemaLayout) -> TestDb {
    let dir = TempDir::new().expect("create temp dir");
    let config = Config::sqlite(dir.path().join("expenses.db"), layout);
    TestDb { dir, config }
}

/// Like [`sqlite_db`] with every relation already created.
pub fn provisioned_db(layout: SchemaLayout) -> TestDb {
    let db = sqlite_db(layout);
    ProvisionService::provision(&db.config).expect("provision test database");
    db
}
