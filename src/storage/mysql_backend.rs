use mysql::{prelude::Queryable, Conn, MySqlError, Opts, OptsBuilder, Params, TxOpts, Value};

use crate::{
    config::{Config, Dialect},
    errors::{ExpenseError, Result},
};

use super::{Row, SqlValue, StorageConnector};

const DEFAULT_PORT: u16 = 3306;
const ER_BAD_DB_ERROR: u16 = 1049;
const ER_TABLE_EXISTS_ERROR: u16 = 1050;

pub struct MySqlConnector {
    conn: Option<Conn>,
}

impl MySqlConnector {
    fn conn(&mut self) -> Result<&mut Conn> {
        self.conn.as_mut().ok_or(ExpenseError::SessionClosed)
    }
}

/// Server options; `database` is left out when creating the database itself.
fn server_opts(config: &Config, database: Option<&str>) -> Opts {
    OptsBuilder::new()
        .ip_or_hostname(Some(config.host_or_default()))
        .tcp_port(config.port.unwrap_or(DEFAULT_PORT))
        .user(config.user.as_deref())
        .pass(config.password.as_deref())
        .db_name(database)
        .into()
}

impl StorageConnector for MySqlConnector {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn connect(config: &Config) -> Result<Self> {
        let database = config.database_name()?;
        let conn = Conn::new(server_opts(config, Some(database))).map_err(|err| {
            match server_code(&err) {
                Some(ER_BAD_DB_ERROR) => ExpenseError::MissingDatabase(database.to_string()),
                _ => ExpenseError::Connection(err.to_string()),
            }
        })?;
        tracing::info!(host = config.host_or_default(), database, "connected to MySQL");
        Ok(Self { conn: Some(conn) })
    }

    fn create_database(config: &Config, ddl: &str) -> Result<()> {
        let mut conn = Conn::new(server_opts(config, None))
            .map_err(|err| ExpenseError::Connection(err.to_string()))?;
        conn.query_drop(ddl)
            .map_err(|err| ExpenseError::Schema(format!("Failed creating database: {err}")))?;
        tracing::info!(database = ?config.database, "created MySQL database");
        Ok(())
    }

    fn run_ddl(&mut self, sql: &str) -> Result<()> {
        self.conn()?
            .query_drop(sql)
            .map_err(|err| match server_code(&err) {
                Some(ER_TABLE_EXISTS_ERROR) => ExpenseError::TableAlreadyExists(err.to_string()),
                _ => ExpenseError::Schema(err.to_string()),
            })
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let rows: Vec<mysql::Row> = self.conn()?.query(sql)?;
        Ok(rows.into_iter().map(decode_row).collect())
    }

    fn query_committed(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let values: Vec<Value> = params.iter().map(encode).collect();
        let mut tx = self.conn()?.start_transaction(TxOpts::default())?;
        let rows: Vec<mysql::Row> = tx.exec(sql, Params::Positional(values))?;
        tx.commit()?;
        Ok(rows.into_iter().map(decode_row).collect())
    }

    fn close(&mut self) -> Result<()> {
        // dropping the connection sends COM_QUIT
        self.conn.take();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

fn server_code(err: &mysql::Error) -> Option<u16> {
    match err {
        mysql::Error::MySqlError(MySqlError { code, .. }) => Some(*code),
        _ => None,
    }
}

fn encode(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Integer(v) => Value::Int(*v),
        SqlValue::Real(v) => Value::Double(*v),
        SqlValue::Text(text) => Value::Bytes(text.as_bytes().to_vec()),
    }
}

fn decode_row(row: mysql::Row) -> Row {
    row.unwrap_raw()
        .into_iter()
        .map(|value| value.map_or(SqlValue::Null, decode_value))
        .collect()
}

/// Text-protocol results arrive as bytes; binary-protocol results are typed.
fn decode_value(value: Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Bytes(bytes) => SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
        Value::Int(v) => SqlValue::Integer(v),
        Value::UInt(v) => i64::try_from(v)
            .map(SqlValue::Integer)
            .unwrap_or_else(|_| SqlValue::Text(v.to_string())),
        Value::Float(v) => SqlValue::Real(f64::from(v)),
        Value::Double(v) => SqlValue::Real(v),
        Value::Date(year, month, day, ..) => {
            SqlValue::Text(format!("{year:04}-{month:02}-{day:02}"))
        }
        Value::Time(negative, days, hours, minutes, seconds, _) => {
            let sign = if negative { "-" } else { "" };
            let hours = u32::from(hours) + days * 24;
            SqlValue::Text(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}"))
        }
    }
}

impl From<mysql::Error> for ExpenseError {
    fn from(err: mysql::Error) -> Self {
        ExpenseError::Query(err.to_string())
    }
}
