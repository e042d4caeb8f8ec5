use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use blur_core::{Error, Result, Row, RowUpdate};
use blur_engine::{Database, IndexDef};

use crate::{queries, sql};

/// Schema used when none is configured.
pub const DEFAULT_SCHEMA: &str = "public";

/// `Database` capability backed by a PostgreSQL pool, scoped to one schema.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    schema: String,
}

impl PostgresDatabase {
    /// Create a new capability using a pre-configured pool.
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// Connect to `url`. The engine keeps at most one statement in flight,
    /// so the pool stays small.
    pub async fn connect(url: &str, schema: impl Into<String>) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        Ok(Self::new(pool, schema))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub async fn database_name(&self) -> Result<String> {
        queries::fetch_database_name(&self.pool).await
    }
}

fn into_rows(values: Vec<Value>) -> Result<Vec<Row>> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Object(row) => Ok(row),
            other => Err(Error::Db(format!("expected a JSON row object, got {other}"))),
        })
        .collect()
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn list_tables(&self) -> Result<Vec<String>> {
        queries::list_tables(&self.pool, &self.schema).await
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        queries::list_columns(&self.pool, &self.schema, table).await
    }

    async fn list_indexes(&self, table: &str) -> Result<Vec<IndexDef>> {
        queries::list_indexes(&self.pool, &self.schema, table).await
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&sql::count_sql(&self.schema, table))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        Ok(count.max(0) as u64)
    }

    async fn fetch_chunk(
        &self,
        table: &str,
        keys: &[String],
        after: Option<&Row>,
        limit: usize,
    ) -> Result<Vec<Row>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let values: Vec<Value> = match after {
            None => {
                let query = sql::first_chunk_sql(&self.schema, table, keys);
                sqlx::query_scalar(&query)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            Some(cursor) => {
                let query = sql::next_chunk_sql(&self.schema, table, keys);
                sqlx::query_scalar(&query)
                    .bind(Value::Object(cursor.clone()))
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|err| Error::Db(err.to_string()))?;

        debug!(table, rows = values.len(), "chunk fetched");
        into_rows(values)
    }

    async fn delete_all(&self, table: &str) -> Result<u64> {
        let result = sqlx::query(&sql::delete_sql(&self.schema, table))
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn upsert(
        &self,
        table: &str,
        rows: &[RowUpdate],
        keys: &[String],
        columns: &[String],
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let query = sql::upsert_sql(&self.schema, table, keys, columns);
        let payload = Value::Array(rows.iter().cloned().map(Value::Object).collect());
        sqlx::query(&query)
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Db(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_become_rows() {
        let rows = into_rows(vec![json!({"id": 1, "name": "a"})]).expect("rows");
        assert_eq!(rows[0]["name"], json!("a"));
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(into_rows(vec![json!([1, 2])]).is_err());
    }
}
