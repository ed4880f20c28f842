use std::{fs, path::PathBuf};

use rusqlite::{
    params_from_iter,
    types::{ToSqlOutput, Value, ValueRef},
    Connection, Statement, ToSql,
};

use crate::{
    config::{Config, Dialect},
    errors::{ExpenseError, Result},
};

use super::{Row, SqlValue, StorageConnector};

/// Embedded SQLite database stored in a single file.
pub struct SqliteConnector {
    conn: Option<Connection>,
    path: PathBuf,
}

impl SqliteConnector {
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn conn(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(ExpenseError::SessionClosed)
    }
}

impl StorageConnector for SqliteConnector {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn connect(config: &Config) -> Result<Self> {
        let path = config
            .filename
            .clone()
            .ok_or_else(|| ExpenseError::Config("no SQLite filename configured".into()))?;
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn =
            Connection::open(&path).map_err(|err| ExpenseError::Connection(err.to_string()))?;
        tracing::info!(path = %path.display(), "opened SQLite database");
        Ok(Self {
            conn: Some(conn),
            path,
        })
    }

    /// SQLite creates the database file on first connect.
    fn create_database(config: &Config, _ddl: &str) -> Result<()> {
        tracing::debug!(filename = ?config.filename, "SQLite needs no database creation");
        Ok(())
    }

    fn run_ddl(&mut self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql).map_err(map_ddl_error)
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        collect_rows(&mut stmt, &[])
    }

    fn query_committed(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let tx = self.conn()?.transaction()?;
        let rows = {
            let mut stmt = tx.prepare(sql)?;
            collect_rows(&mut stmt, params)?
        };
        tx.commit()?;
        Ok(rows)
    }

    fn close(&mut self) -> Result<()> {
        match self.conn.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, err)| ExpenseError::Connection(err.to_string())),
            None => Ok(()),
        }
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

fn collect_rows(stmt: &mut Statement<'_>, params: &[SqlValue]) -> Result<Vec<Row>> {
    let columns = stmt.column_count();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns);
        for idx in 0..columns {
            values.push(match row.get_ref(idx)? {
                ValueRef::Null => SqlValue::Null,
                ValueRef::Integer(value) => SqlValue::Integer(value),
                ValueRef::Real(value) => SqlValue::Real(value),
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                    SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
                }
            });
        }
        out.push(values);
    }
    Ok(out)
}

fn map_ddl_error(err: rusqlite::Error) -> ExpenseError {
    let message = err.to_string();
    if message.contains("already exists") {
        ExpenseError::TableAlreadyExists(message)
    } else {
        ExpenseError::Schema(message)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(value) => ToSqlOutput::Owned(Value::Integer(*value)),
            SqlValue::Real(value) => ToSqlOutput::Owned(Value::Real(*value)),
            SqlValue::Text(text) => ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes())),
        })
    }
}

impl From<rusqlite::Error> for ExpenseError {
    fn from(err: rusqlite::Error) -> Self {
        ExpenseError::Query(err.to_string())
    }
}
