//! Declarative table definitions
//!
//! Each target table is described once in code as a list of
//! [`ColumnDefinition`]s. `CREATE TABLE` statements and `INSERT` column lists
//! are generated from that description, and [`SchemaIntrospector`] reads the
//! live schema back for existence checks and verification.
//!
//! # Usage
//!
//! ```rust,ignore
//! pub struct PatchesTable;
//!
//! impl TableSchema for PatchesTable {
//!     fn table_name() -> &'static str { "patches" }
//!
//!     fn expected_columns() -> Vec<ColumnDefinition> {
//!         vec![
//!             ColumnDefinition::new("patch_id", "INTEGER").primary_key(),
//!             ColumnDefinition::new("region", "TEXT"),
//!         ]
//!     }
//! }
//!
//! let sql = create_table_sql::<PatchesTable>();
//! ```

use crate::Result;
use sqlx::{Row, SqlitePool};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER", "REAL")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// Part of the PRIMARY KEY; more than one column makes it composite
    pub primary_key: bool,
    /// REFERENCES target, e.g. "birds(bird_id)"
    pub references: Option<String>,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            references: None,
        }
    }

    /// Mark column as (part of) the PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Add a foreign key to `target`, written as `table(column)`
    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.references = Some(target.into());
        self
    }

    /// Column clause for CREATE TABLE
    fn to_sql(&self, inline_primary_key: bool) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key && inline_primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if self.not_null || self.primary_key {
            sql.push_str(" NOT NULL");
        }
        if let Some(target) = &self.references {
            sql.push_str(&format!(" REFERENCES {}", target));
        }
        sql
    }
}

/// Defines expected schema for a database table
pub trait TableSchema {
    /// Table name in database
    fn table_name() -> &'static str;

    /// Expected column definitions (order matters for table creation and inserts)
    fn expected_columns() -> Vec<ColumnDefinition>;
}

/// Build the `CREATE TABLE` statement for `T`
///
/// A single primary-key column is declared inline; several become a
/// table-level `PRIMARY KEY (...)` constraint.
pub fn create_table_sql<T: TableSchema>() -> String {
    let columns = T::expected_columns();
    let key_columns: Vec<&str> = columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| c.name.as_str())
        .collect();
    let inline = key_columns.len() == 1;

    let mut clauses: Vec<String> = columns.iter().map(|c| c.to_sql(inline)).collect();
    if key_columns.len() > 1 {
        clauses.push(format!("PRIMARY KEY ({})", key_columns.join(", ")));
    }

    format!(
        "CREATE TABLE {} (\n    {}\n)",
        T::table_name(),
        clauses.join(",\n    ")
    )
}

/// Comma-separated column list in declaration order
pub fn column_list<T: TableSchema>() -> String {
    T::expected_columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Actual column from database introspection (PRAGMA table_info result)
#[derive(Debug, Clone)]
pub struct ActualColumn {
    /// Column ID (position in table)
    pub cid: i32,
    /// Column name
    pub name: String,
    /// SQL type from PRAGMA table_info
    pub type_name: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// Position within the primary key (1-based), 0 when not a key column
    pub pk: i32,
}

/// Schema introspection - read actual database schema
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Read actual columns from database table using PRAGMA table_info
    ///
    /// Returns columns in database order (by cid)
    pub async fn introspect_table(pool: &SqlitePool, table_name: &str) -> Result<Vec<ActualColumn>> {
        let query = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&query).fetch_all(pool).await?;

        let mut columns: Vec<ActualColumn> = rows
            .iter()
            .map(|row| ActualColumn {
                cid: row.get("cid"),
                name: row.get("name"),
                type_name: row.get("type"),
                not_null: row.get::<i32, _>("notnull") != 0,
                pk: row.get("pk"),
            })
            .collect();

        columns.sort_by_key(|c| c.cid);

        Ok(columns)
    }

    /// Check if table exists
    pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type='table' AND name = ?
            )
            "#,
        )
        .bind(table_name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Primary-key columns in key order
    pub async fn primary_key(pool: &SqlitePool, table_name: &str) -> Result<Vec<String>> {
        let mut key: Vec<ActualColumn> = Self::introspect_table(pool, table_name)
            .await?
            .into_iter()
            .filter(|c| c.pk > 0)
            .collect();
        key.sort_by_key(|c| c.pk);
        Ok(key.into_iter().map(|c| c.name).collect())
    }
}
