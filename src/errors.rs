use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for validation, configuration and storage failures.
#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Wrong date format: `{0}`")]
    InvalidDateFormat(String),
    #[error("Failed to connect to database: {0}")]
    Connection(String),
    #[error("Database `{0}` does not exist")]
    MissingDatabase(String),
    #[error("Failed creating table: {0}")]
    Schema(String),
    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Session is closed")]
    SessionClosed,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = StdResult<T, ExpenseError>;

impl ExpenseError {
    /// True for user-input failures, including unparseable dates.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExpenseError::Validation(_) | ExpenseError::InvalidDateFormat(_)
        )
    }
}

impl From<serde_json::Error> for ExpenseError {
    fn from(err: serde_json::Error) -> Self {
        ExpenseError::Config(err.to_string())
    }
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] ExpenseError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_failures_count_as_validation() {
        assert!(ExpenseError::InvalidDateFormat("someday".into()).is_validation());
        assert!(ExpenseError::Validation("Missing name.".into()).is_validation());
        assert!(!ExpenseError::Connection("refused".into()).is_validation());
        assert!(!ExpenseError::DataIntegrity("dupe".into()).is_validation());
    }

    #[test]
    fn cli_error_is_transparent_over_core_errors() {
        let err = CliError::from(ExpenseError::MissingDatabase("expenses".into()));
        assert_eq!(err.to_string(), "Database `expenses` does not exist");
    }
}
