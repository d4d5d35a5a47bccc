//! Sink: persist derived relations to SQLite
//!
//! Each relation is written by [`Sink::write`] inside its own transaction:
//! the table is created from its [`TableSchema`] declaration and then
//! filled with multi-row `INSERT` statements. Tables are independent, so a
//! failure part-way through a load leaves the earlier tables committed.

use crate::config::{DatabaseConfig, ExistingTablePolicy};
use crate::db::init::connect;
use crate::db::schema::{column_list, create_table_sql, SchemaIntrospector, TableSchema};
use crate::{Error, Result};
use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, warn};

/// SQLite's bound-parameter limit per statement (SQLITE_MAX_VARIABLE_NUMBER)
pub const SQLITE_MAX_VARIABLES: usize = 32_766;

/// A row that can be written to the table `Table`
///
/// `bind_columns` must push one value per column of
/// `Table::expected_columns()`, in declaration order.
pub trait SinkRow {
    type Table: TableSchema;

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Sqlite, &'static str>);
}

/// Wrap a sqlx failure with the table it happened on
fn write_error(table: &str) -> impl Fn(sqlx::Error) -> Error + Copy + '_ {
    move |source| Error::TableWrite {
        table: table.to_string(),
        source,
    }
}

/// Explicit storage handle for one load
pub struct Sink {
    pool: SqlitePool,
    policy: ExistingTablePolicy,
}

impl Sink {
    /// Wrap an already-open pool
    pub fn new(pool: SqlitePool, policy: ExistingTablePolicy) -> Self {
        Self { pool, policy }
    }

    /// Connect to `url` using the `[database]` settings
    pub async fn open(url: &str, config: &DatabaseConfig) -> Result<Self> {
        let pool = connect(url, config.echo).await?;
        Ok(Self::new(pool, config.on_existing))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn policy(&self) -> ExistingTablePolicy {
        self.policy
    }

    /// Apply the re-run policy to every table before anything is written
    ///
    /// `tables` must be in dependency order (parents first). Under `Fail`
    /// the first table already present is reported; under `Replace` present
    /// tables are dropped children-first.
    pub async fn prepare(&self, tables: &[&str]) -> Result<()> {
        match self.policy {
            ExistingTablePolicy::Fail => {
                for table in tables {
                    if self.table_exists(table).await? {
                        return Err(Error::TableExists(table.to_string()));
                    }
                }
                debug!("No target tables present");
            }
            ExistingTablePolicy::Replace => {
                let mut present = Vec::new();
                for table in tables.iter().rev() {
                    if self.table_exists(table).await? {
                        present.push(*table);
                    }
                }

                let Some(first) = present.first() else {
                    return Ok(());
                };
                let mut tx = self.pool.begin().await.map_err(write_error(first))?;
                for table in &present {
                    sqlx::query(&format!("DROP TABLE {}", table))
                        .execute(&mut *tx)
                        .await
                        .map_err(write_error(table))?;
                    warn!("Dropped existing table '{}'", table);
                }
                tx.commit().await.map_err(write_error(first))?;
            }
        }
        Ok(())
    }

    /// Create `R::Table` and insert every row; returns rows inserted
    pub async fn write<R: SinkRow>(&self, rows: &[R]) -> Result<u64> {
        let table = R::Table::table_name();
        let on_error = write_error(table);

        let exists = self.table_exists(table).await?;
        if exists && self.policy == ExistingTablePolicy::Fail {
            return Err(Error::TableExists(table.to_string()));
        }

        let width = R::Table::expected_columns().len().max(1);
        let rows_per_statement = (SQLITE_MAX_VARIABLES / width).max(1);
        let insert = format!("INSERT INTO {} ({}) ", table, column_list::<R::Table>());

        let mut tx = self.pool.begin().await.map_err(on_error)?;

        if exists {
            sqlx::query(&format!("DROP TABLE {}", table))
                .execute(&mut *tx)
                .await
                .map_err(on_error)?;
            warn!("Dropped existing table '{}'", table);
        }

        sqlx::query(&create_table_sql::<R::Table>())
            .execute(&mut *tx)
            .await
            .map_err(on_error)?;

        let mut written = 0u64;
        for chunk in rows.chunks(rows_per_statement) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(&insert);
            builder.push_values(chunk, |mut row, record| record.bind_columns(&mut row));
            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(on_error)?;
            written += result.rows_affected();
            debug!("{}: {} / {} rows", table, written, rows.len());
        }

        tx.commit().await.map_err(on_error)?;

        info!("Wrote {} rows to '{}'", written, table);
        Ok(written)
    }

    /// Existence check whose failures name the table
    async fn table_exists(&self, table: &str) -> Result<bool> {
        SchemaIntrospector::table_exists(&self.pool, table)
            .await
            .map_err(|e| match e {
                Error::Database(source) => Error::TableWrite {
                    table: table.to_string(),
                    source,
                },
                other => other,
            })
    }

    /// Row count of a table
    pub async fn row_count(&self, table: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Release the connection
    pub async fn close(self) {
        self.pool.close().await;
        debug!("Database connection closed");
    }
}
