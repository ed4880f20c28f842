use postgres::{
    error::SqlState,
    types::{ToSql, Type},
    Client, NoTls,
};

use crate::{
    config::{Config, Dialect},
    errors::{ExpenseError, Result},
};

use super::{Row, SqlValue, StorageConnector};

const DEFAULT_PORT: u16 = 5432;

const CREATE_DATABASE_GUIDANCE: &str = "PostgreSQL databases are not created by this tool. \
     Log in with a PostgreSQL client (e.g. `createdb <name>`) and create the database first.";

pub struct PostgresConnector {
    client: Option<Client>,
}

impl PostgresConnector {
    fn client(&mut self) -> Result<&mut Client> {
        self.client.as_mut().ok_or(ExpenseError::SessionClosed)
    }
}

impl StorageConnector for PostgresConnector {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
    }

    fn connect(config: &Config) -> Result<Self> {
        let database = config.database_name()?;
        let mut pg = postgres::Config::new();
        pg.host(config.host_or_default())
            .port(config.port.unwrap_or(DEFAULT_PORT))
            .dbname(database);
        if let Some(user) = &config.user {
            pg.user(user);
        }
        if let Some(password) = &config.password {
            pg.password(password);
        }
        let client = pg
            .connect(NoTls)
            .map_err(|err| map_connect_error(err, database))?;
        tracing::info!(host = config.host_or_default(), database, "connected to PostgreSQL");
        Ok(Self {
            client: Some(client),
        })
    }

    /// The database must already exist on the server; this always fails.
    fn create_database(_config: &Config, _ddl: &str) -> Result<()> {
        Err(ExpenseError::UnsupportedOperation(
            CREATE_DATABASE_GUIDANCE.to_string(),
        ))
    }

    fn run_ddl(&mut self, sql: &str) -> Result<()> {
        self.client()?.batch_execute(sql).map_err(map_ddl_error)
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let rows = self.client()?.query(sql, &[])?;
        rows.iter().map(decode_row).collect()
    }

    fn query_committed(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let mut tx = self.client()?.transaction()?;
        let stmt = tx.prepare(sql)?;
        let bound = stmt
            .params()
            .iter()
            .zip(params)
            .map(|(ty, value)| bind(value, ty))
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&(dyn ToSql + Sync)> = bound.iter().map(|value| value.as_ref()).collect();
        let rows = tx.query(&stmt, &refs)?;
        tx.commit()?;
        rows.iter().map(decode_row).collect()
    }

    fn close(&mut self) -> Result<()> {
        match self.client.take() {
            Some(client) => client
                .close()
                .map_err(|err| ExpenseError::Connection(err.to_string())),
            None => Ok(()),
        }
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

/// Converts a value into the concrete Rust type the server expects for `ty`.
fn bind(value: &SqlValue, ty: &Type) -> Result<Box<dyn ToSql + Sync>> {
    let mismatch = || {
        ExpenseError::Query(format!(
            "cannot bind {value:?} to a parameter of type {ty}"
        ))
    };
    let bound: Box<dyn ToSql + Sync> = match *ty {
        Type::INT2 => Box::new(match value.as_i64() {
            Some(v) => Some(i16::try_from(v).map_err(|_| mismatch())?),
            None if value.is_null() => None,
            None => return Err(mismatch()),
        }),
        Type::INT4 => Box::new(match value.as_i64() {
            Some(v) => Some(i32::try_from(v).map_err(|_| mismatch())?),
            None if value.is_null() => None,
            None => return Err(mismatch()),
        }),
        Type::INT8 => Box::new(match value.as_i64() {
            Some(v) => Some(v),
            None if value.is_null() => None,
            None => return Err(mismatch()),
        }),
        Type::FLOAT4 => Box::new(match value.as_f64() {
            Some(v) => Some(v as f32),
            None if value.is_null() => None,
            None => return Err(mismatch()),
        }),
        Type::FLOAT8 => Box::new(match value.as_f64() {
            Some(v) => Some(v),
            None if value.is_null() => None,
            None => return Err(mismatch()),
        }),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            Box::new(value.as_text())
        }
        _ => return Err(mismatch()),
    };
    Ok(bound)
}

fn decode_row(row: &postgres::Row) -> Result<Row> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| -> Result<SqlValue> {
            let value: SqlValue = match *column.type_() {
                Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(i64::from).into(),
                Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(i64::from).into(),
                Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.into(),
                Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(f64::from).into(),
                Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.into(),
                Type::BOOL => row
                    .try_get::<_, Option<bool>>(idx)?
                    .map(i64::from)
                    .into(),
                _ => row.try_get::<_, Option<String>>(idx)?.into(),
            };
            Ok(value)
        })
        .collect()
}

fn map_connect_error(err: postgres::Error, database: &str) -> ExpenseError {
    if err.code() == Some(&SqlState::INVALID_CATALOG_NAME) {
        ExpenseError::MissingDatabase(database.to_string())
    } else {
        ExpenseError::Connection(err.to_string())
    }
}

fn map_ddl_error(err: postgres::Error) -> ExpenseError {
    if err.code() == Some(&SqlState::DUPLICATE_TABLE) {
        ExpenseError::TableAlreadyExists(err.to_string())
    } else {
        ExpenseError::Schema(err.to_string())
    }
}

impl From<postgres::Error> for ExpenseError {
    fn from(err: postgres::Error) -> Self {
        ExpenseError::Query(err.to_string())
    }
}
