//! Runtime configuration: which dialect to talk to and how to reach it.
//!
//! Values come from an optional `config.json` in the data directory, then
//! environment variables on top. Each key is looked up as `EXPENSES_<KEY>`
//! first and then under its bare legacy name (`RDBM`, `HOST`, `USER`, ...).

use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    errors::{ExpenseError, Result},
    utils,
};

pub const DEFAULT_TABLE: &str = "expenses_list";
const ENV_PREFIX: &str = "EXPENSES_";

/// Database backend selected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "postgresql", alias = "postgres")]
    PostgreSql,
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::PostgreSql => "postgresql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ExpenseError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(ExpenseError::Config(format!(
                "`{other}` is an incorrect RDBM choice (expected mysql, postgresql or sqlite)"
            ))),
        }
    }
}

/// Storage layout: one flat relation, or expenses referencing a category table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaLayout {
    #[default]
    Flat,
    Normalized,
}

impl FromStr for SchemaLayout {
    type Err = ExpenseError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(SchemaLayout::Flat),
            "normalized" | "normalised" => Ok(SchemaLayout::Normalized),
            other => Err(ExpenseError::Config(format!(
                "unknown schema layout `{other}` (expected flat or normalized)"
            ))),
        }
    }
}

/// Fully resolved configuration, built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub dialect: Dialect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
    #[serde(default)]
    pub layout: SchemaLayout,
    pub table: String,
}

impl Config {
    /// SQLite configuration pointing at `filename`, mostly useful for tests.
    pub fn sqlite(filename: impl Into<PathBuf>, layout: SchemaLayout) -> Self {
        Self {
            dialect: Dialect::Sqlite,
            host: None,
            port: None,
            user: None,
            password: None,
            database: None,
            filename: Some(filename.into()),
            layout,
            table: DEFAULT_TABLE.into(),
        }
    }

    /// Name of the database on a server dialect.
    pub fn database_name(&self) -> Result<&str> {
        self.database
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                ExpenseError::Config(format!("no database name configured for {}", self.dialect))
            })
    }

    pub fn host_or_default(&self) -> &str {
        self.host.as_deref().unwrap_or("localhost")
    }
}

/// Partial configuration as stored in `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub dialect: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub filename: Option<PathBuf>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(utils::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        let path = utils::config_file_in(&base);
        Self { base, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_file(&self) -> Result<ConfigFile> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(ConfigFile::default())
        }
    }

    /// Resolves the configuration against the process environment.
    pub fn resolve(&self) -> Result<Config> {
        self.resolve_with(|key| env::var(key).ok())
    }

    /// Resolves the configuration using `lookup` in place of the environment.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = self.load_file()?;
        let var = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .flat_map(|key| [format!("{ENV_PREFIX}{key}"), key.to_string()])
                .find_map(|key| lookup(&key))
                .filter(|value| !value.is_empty())
        };

        let dialect = var(&["RDBM"]).or(file.dialect).ok_or_else(|| {
            ExpenseError::Config(
                "no database selected; set RDBM to mysql, postgresql or sqlite".into(),
            )
        })?;
        let dialect = dialect.parse::<Dialect>()?;

        let port = match var(&["PORT"]) {
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| {
                ExpenseError::Config(format!("`{raw}` is not a valid port"))
            })?),
            None => file.port,
        };

        let layout = match var(&["SCHEMA"]).or(file.layout) {
            Some(raw) => raw.parse::<SchemaLayout>()?,
            None => SchemaLayout::default(),
        };

        // relative paths in config.json are anchored at the directory holding it
        let filename = var(&["FILENAME"])
            .map(PathBuf::from)
            .or_else(|| file.filename.map(|path| self.base.join(path)));
        let filename = match dialect {
            Dialect::Sqlite => {
                Some(filename.unwrap_or_else(|| utils::default_sqlite_file_in(&self.base)))
            }
            _ => filename,
        };

        Ok(Config {
            dialect,
            host: var(&["HOST"]).or(file.host),
            port,
            user: var(&["USER"]).or(file.user),
            password: var(&["PASSWORD"]).or(file.password),
            database: var(&["DB", "DATABASE"]).or(file.database),
            filename,
            layout,
            table: var(&["TABLE"])
                .or(file.table)
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
        })
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
