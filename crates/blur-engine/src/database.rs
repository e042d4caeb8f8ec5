use async_trait::async_trait;
use blur_core::{Result, Row, RowUpdate};

/// Index metadata reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
    pub is_primary: bool,
    pub is_unique: bool,
}

/// Database capabilities the engine consumes.
#[async_trait]
pub trait Database: Send + Sync {
    /// Names of the tables the engine may touch.
    async fn list_tables(&self) -> Result<Vec<String>>;

    async fn list_columns(&self, table: &str) -> Result<Vec<String>>;

    async fn list_indexes(&self, table: &str) -> Result<Vec<IndexDef>>;

    async fn count_rows(&self, table: &str) -> Result<u64>;

    /// Up to `limit` rows ordered by the `keys` tuple ascending, restricted
    /// to rows whose key tuple sorts after the key values in `after` when
    /// given.
    async fn fetch_chunk(
        &self,
        table: &str,
        keys: &[String],
        after: Option<&Row>,
        limit: usize,
    ) -> Result<Vec<Row>>;

    /// Delete every row; returns the number of deleted rows.
    async fn delete_all(&self, table: &str) -> Result<u64>;

    /// Insert-or-update `rows` matched on `keys`, setting only `columns`.
    async fn upsert(
        &self,
        table: &str,
        rows: &[RowUpdate],
        keys: &[String],
        columns: &[String],
    ) -> Result<()>;
}
