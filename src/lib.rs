#![doc(test(attr(deny(warnings))))]

//! Expense Tracker records personal expenses and reports on them through a
//! storage connector that speaks MySQL, PostgreSQL or SQLite.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod query;
pub mod storage;
pub mod utils;

pub use errors::{ExpenseError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Expense tracker tracing initialized.");
    });
}
