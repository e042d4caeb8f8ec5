use sqlx::{PgPool, Row};

use blur_core::Result;
use blur_engine::IndexDef;

fn db_error(err: sqlx::Error) -> blur_core::Error {
    blur_core::Error::Db(err.to_string())
}

pub async fn fetch_database_name(pool: &PgPool) -> Result<String> {
    sqlx::query_scalar::<_, String>("select current_database()")
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

/// Ordinary and partitioned tables of `schema`.
pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select c.relname::text
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relkind in ('r','p')
        order by c.relname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

pub async fn list_columns(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select column_name::text
        from information_schema.columns
        where table_schema = $1
          and table_name = $2
        order by ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

pub async fn list_indexes(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<IndexDef>> {
    let rows = sqlx::query(
        r#"
        select
          idx.relname::text as name,
          i.indisunique as is_unique,
          i.indisprimary as is_primary,
          array(
            select a.attname::text
            from unnest(i.indkey::int2[]) with ordinality as k(attnum, ord)
            join pg_attribute a on a.attrelid = i.indrelid and a.attnum = k.attnum
            order by k.ord
          ) as columns
        from pg_index i
        join pg_class tbl on tbl.oid = i.indrelid
        join pg_namespace nsp on nsp.oid = tbl.relnamespace
        join pg_class idx on idx.oid = i.indexrelid
        where nsp.nspname = $1
          and tbl.relname = $2
        order by idx.relname
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    rows.into_iter()
        .map(|row| {
            Ok(IndexDef {
                name: row.try_get("name").map_err(db_error)?,
                columns: row.try_get("columns").map_err(db_error)?,
                is_primary: row.try_get("is_primary").map_err(db_error)?,
                is_unique: row.try_get("is_unique").map_err(db_error)?,
            })
        })
        .collect()
}
