use std::env;

use anyhow::{Context, Result, anyhow};
use sqlx::PgPool;

use blur_core::parse_config;
use blur_engine::{Coordinator, Database, NoopProgress, RunOptions, TableStatus};
use blur_postgres::PostgresDatabase;

const SCHEMA: &str = "blur_it";

const FIXTURE: &[&str] = &[
    "drop schema if exists blur_it cascade",
    "create schema blur_it",
    r#"create table blur_it.users (
        id bigserial primary key,
        username text not null,
        name text not null,
        password text not null,
        created_at timestamptz not null default now()
    )"#,
    r#"insert into blur_it.users (username, name, password, created_at)
       select 'user' || g, 'Original ' || g, 'secret-hash', timestamptz '2023-05-01 10:00:00+00'
       from generate_series(1, 120) as g"#,
    "create table blur_it.sessions (id text primary key, payload text)",
    "insert into blur_it.sessions values ('a', 'x'), ('b', 'y')",
    "create table blur_it.empty_log (id serial primary key, message text)",
    r#"create table blur_it.members (
        tenant int not null,
        id int not null,
        name text not null,
        joined date not null,
        primary key (tenant, id)
    )"#,
    r#"insert into blur_it.members values
        (1, 1, 'a', '2020-01-01'), (1, 2, 'b', '2020-01-01'),
        (1, 3, 'c', '2020-01-01'), (2, 1, 'd', '2020-01-01')"#,
];

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

async fn reset_fixtures(pool: &PgPool) -> Result<()> {
    for statement in FIXTURE {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("executing fixture statement: {statement}"))?;
    }
    Ok(())
}

#[tokio::test]
async fn obfuscates_a_live_schema() -> Result<()> {
    let Some(url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL to run Postgres tests");
        return Ok(());
    };
    let db = PostgresDatabase::connect(&url, SCHEMA)
        .await
        .context("connecting to Postgres")?;
    reset_fixtures(db.pool()).await?;

    let tables = db.list_tables().await?;
    assert_eq!(tables, vec!["empty_log", "members", "sessions", "users"]);

    let indexes = db.list_indexes("users").await?;
    let primary = indexes
        .iter()
        .find(|index| index.is_primary)
        .ok_or_else(|| anyhow!("expected a primary key on users"))?;
    assert_eq!(primary.columns, vec!["id"]);

    let config = parse_config(
        r#"
        seed = 11

        [tables.users]
        chunk_size = 40

        [tables.users.columns]
        username = "faker:userName"
        name = "fixed:Redacted"

        [tables.sessions]
        method = "clear"

        [tables.empty_log.columns]
        message = "fixed:gone"

        [tables.members]
        chunk_size = 2

        [tables.members.columns]
        name = "fixed:X"
        "#,
    )?;

    let result = Coordinator::new()
        .run(&db, &config, RunOptions::default(), &mut NoopProgress)
        .await?;

    assert!(result.success);
    assert_eq!(result.status("users"), Some(&TableStatus::Obfuscated { rows: 120 }));
    assert_eq!(result.status("sessions"), Some(&TableStatus::Cleared { rows_deleted: 2 }));
    assert_eq!(result.status("empty_log"), Some(&TableStatus::SkippedEmpty));
    assert_eq!(result.status("members"), Some(&TableStatus::Obfuscated { rows: 4 }));

    let unchanged: i64 = sqlx::query_scalar(
        "select count(*) from blur_it.users where password = 'secret-hash' \
         and created_at = timestamptz '2023-05-01 10:00:00+00' and name = 'Redacted'",
    )
    .fetch_one(db.pool())
    .await?;
    assert_eq!(unchanged, 120);

    let original_usernames: i64 =
        sqlx::query_scalar("select count(*) from blur_it.users where username = 'user' || id")
            .fetch_one(db.pool())
            .await?;
    assert_eq!(original_usernames, 0);

    let untouched_members: i64 = sqlx::query_scalar(
        "select count(*) from blur_it.members where name = 'X' and joined = date '2020-01-01'",
    )
    .fetch_one(db.pool())
    .await?;
    assert_eq!(untouched_members, 4);

    assert_eq!(db.count_rows("sessions").await?, 0);
    Ok(())
}
