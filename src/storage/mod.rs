//! Storage connectors: one implementation per SQL dialect behind a common trait.

pub mod mysql_backend;
pub mod placeholder;
pub mod postgres_backend;
pub mod schema;
pub mod session;
pub mod sqlite_backend;

use crate::{
    config::{Config, Dialect},
    errors::Result,
};

pub use mysql_backend::MySqlConnector;
pub use placeholder::{translate_placeholders, PlaceholderStyle};
pub use postgres_backend::PostgresConnector;
pub use session::{Session, SessionState};
pub use sqlite_backend::SqliteConnector;

/// A single column value crossing the connector boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// One result row, columns in select order.
pub type Row = Vec<SqlValue>;

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer view of the value; numeric text is accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(value) => Some(*value),
            SqlValue::Real(value) if value.fract() == 0.0 => Some(*value as i64),
            SqlValue::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Floating point view of the value; numeric text is accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Integer(value) => Some(*value as f64),
            SqlValue::Real(value) => Some(*value),
            SqlValue::Text(text) => text.trim().parse().ok(),
            SqlValue::Null => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            SqlValue::Text(text) => Some(text.clone()),
            SqlValue::Integer(value) => Some(value.to_string()),
            SqlValue::Real(value) => Some(value.to_string()),
            SqlValue::Null => None,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// Uniform contract over the supported database dialects.
///
/// Implementors supply the raw driver calls; placeholder translation and the
/// commit-on-parameters rule live in the provided [`StorageConnector::execute`].
pub trait StorageConnector {
    fn dialect(&self) -> Dialect;

    /// Opens a connection to the configured database.
    fn connect(config: &Config) -> Result<Self>
    where
        Self: Sized;

    /// Creates the configured database before any connection to it exists.
    fn create_database(config: &Config, ddl: &str) -> Result<()>
    where
        Self: Sized;

    /// Runs a DDL statement, mapping "relation exists" to `TableAlreadyExists`.
    fn run_ddl(&mut self, sql: &str) -> Result<()>;

    /// Runs a parameterless statement without committing.
    fn query(&mut self, sql: &str) -> Result<Vec<Row>>;

    /// Runs a parameterized statement inside a transaction and commits it.
    fn query_committed(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>>;

    /// Releases the connection. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    fn create_table(&mut self, table_desc: &str) -> Result<()> {
        self.run_ddl(&format!("CREATE TABLE {table_desc}"))
    }

    fn create_view(&mut self, view_desc: &str) -> Result<()> {
        self.run_ddl(&format!("CREATE VIEW {view_desc}"))
    }

    /// Executes a statement written with canonical `%s` markers.
    fn execute(&mut self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let style = PlaceholderStyle::for_dialect(self.dialect());
        let sql = translate_placeholders(query, style);
        tracing::debug!(
            dialect = %self.dialect(),
            %sql,
            params = params.len(),
            "executing statement"
        );
        if params.is_empty() {
            self.query(&sql)
        } else {
            self.query_committed(&sql, params)
        }
    }
}

/// Opens a connector for the configured dialect.
pub fn connect(config: &Config) -> Result<Box<dyn StorageConnector>> {
    tracing::info!(dialect = %config.dialect, "connecting to database");
    let connector: Box<dyn StorageConnector> = match config.dialect {
        Dialect::MySql => Box::new(MySqlConnector::connect(config)?),
        Dialect::PostgreSql => Box::new(PostgresConnector::connect(config)?),
        Dialect::Sqlite => Box::new(SqliteConnector::connect(config)?),
    };
    Ok(connector)
}

/// Creates the configured database using the dialect's own rules.
pub fn create_database(config: &Config, ddl: &str) -> Result<()> {
    match config.dialect {
        Dialect::MySql => MySqlConnector::create_database(config, ddl),
        Dialect::PostgreSql => PostgresConnector::create_database(config, ddl),
        Dialect::Sqlite => SqliteConnector::create_database(config, ddl),
    }
}
