//! Per-dialect DDL for the flat and normalized layouts.

use crate::{
    config::{Config, Dialect, SchemaLayout},
    errors::Result,
    query::{CATEGORIES_TABLE, EXPENSES_TABLE, REPORT_VIEW},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Table,
    View,
}

/// A relation to create, described without its `CREATE TABLE`/`CREATE VIEW` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDefinition {
    pub name: String,
    pub kind: RelationKind,
    pub description: String,
}

impl RelationDefinition {
    fn table(name: &str, columns: &[String]) -> Self {
        Self {
            name: name.to_string(),
            kind: RelationKind::Table,
            description: format!("{name} ({})", columns.join(", ")),
        }
    }
}

fn primary_key(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySql => "BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY",
        Dialect::PostgreSql => "BIGSERIAL PRIMARY KEY",
        Dialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
    }
}

fn amount_type(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySql => "DOUBLE",
        Dialect::PostgreSql => "DOUBLE PRECISION",
        Dialect::Sqlite => "REAL",
    }
}

/// Category text compares byte-exact; MySQL's default utf8mb4 collation ignores case.
fn category_type(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySql => "VARCHAR(50) COLLATE utf8mb4_bin",
        Dialect::PostgreSql | Dialect::Sqlite => "VARCHAR(50)",
    }
}

/// Statement creating the configured database; empty for SQLite.
pub fn create_database_ddl(config: &Config) -> Result<String> {
    match config.dialect {
        Dialect::Sqlite => Ok(String::new()),
        Dialect::MySql => Ok(format!(
            "CREATE DATABASE {} DEFAULT CHARACTER SET 'utf8mb4'",
            config.database_name()?
        )),
        Dialect::PostgreSql => Ok(format!("CREATE DATABASE {}", config.database_name()?)),
    }
}

/// Relations to create, in dependency order.
pub fn relations(dialect: Dialect, layout: SchemaLayout, table: &str) -> Vec<RelationDefinition> {
    let pk = primary_key(dialect);
    let amount = amount_type(dialect);
    let category = category_type(dialect);
    match layout {
        SchemaLayout::Flat => vec![RelationDefinition::table(
            table,
            &[
                format!("id {pk}"),
                "name VARCHAR(50) NOT NULL".into(),
                format!("amount {amount} NOT NULL"),
                format!("category {category} NOT NULL"),
                "date VARCHAR(10) NOT NULL".into(),
            ],
        )],
        SchemaLayout::Normalized => vec![
            RelationDefinition::table(
                CATEGORIES_TABLE,
                &[
                    format!("category_id {pk}"),
                    format!("category_name {category} NOT NULL UNIQUE"),
                ],
            ),
            RelationDefinition::table(
                EXPENSES_TABLE,
                &[
                    format!("id {pk}"),
                    "name VARCHAR(50) NOT NULL".into(),
                    format!("amount {amount} NOT NULL"),
                    "category_id BIGINT NOT NULL".into(),
                    "date VARCHAR(10) NOT NULL".into(),
                    format!(
                        "FOREIGN KEY (category_id) REFERENCES {CATEGORIES_TABLE} (category_id)"
                    ),
                ],
            ),
            RelationDefinition {
                name: REPORT_VIEW.to_string(),
                kind: RelationKind::View,
                description: format!(
                    "{REPORT_VIEW} AS SELECT e.id, e.name, e.amount, \
                     c.category_name AS category, e.date \
                     FROM {EXPENSES_TABLE} e \
                     JOIN {CATEGORIES_TABLE} c ON e.category_id = c.category_id"
                ),
            },
        ],
    }
}
