#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use blur_core::{Error, Result, Row, RowUpdate};
use blur_engine::{Database, IndexDef};

pub struct MemoryTable {
    pub columns: Vec<String>,
    pub primary_key: Vec<String>,
    pub rows: Vec<Row>,
}

/// One recorded upsert call.
#[derive(Debug, Clone)]
pub struct UpsertCall {
    pub table: String,
    pub rows: usize,
    pub columns: Vec<String>,
}

type FetchHook = Box<dyn FnMut(&str, usize, &mut BTreeMap<String, MemoryTable>) + Send>;

/// In-memory `Database` that records every call it receives.
#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<BTreeMap<String, MemoryTable>>,
    calls: Mutex<Vec<String>>,
    upserts: Mutex<Vec<UpsertCall>>,
    fetches: Mutex<BTreeMap<String, usize>>,
    fail_upsert: Mutex<Option<(String, usize)>>,
    fail_count: Mutex<Option<String>>,
    on_fetch: Mutex<Option<FetchHook>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str, columns: &[&str], primary_key: &[&str], rows: Vec<Value>) -> Self {
        let table = MemoryTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            primary_key: primary_key.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.as_object().cloned().expect("row must be an object"))
                .collect(),
        };
        self.tables.lock().unwrap().insert(name.to_string(), table);
        self
    }

    /// Fail the `nth` (zero-based) upsert issued against `table`.
    pub fn fail_upsert_at(self, table: &str, nth: usize) -> Self {
        *self.fail_upsert.lock().unwrap() = Some((table.to_string(), nth));
        self
    }

    pub fn fail_count(self, table: &str) -> Self {
        *self.fail_count.lock().unwrap() = Some(table.to_string());
        self
    }

    /// Run `hook` after every chunk fetch with the table name and the
    /// zero-based fetch number for that table.
    pub fn on_fetch<F>(self, hook: F) -> Self
    where
        F: FnMut(&str, usize, &mut BTreeMap<String, MemoryTable>) + Send + 'static,
    {
        *self.on_fetch.lock().unwrap() = Some(Box::new(hook));
        self
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn row(&self, table: &str, id: i64) -> Row {
        self.rows(table)
            .into_iter()
            .find(|row| row.get("id") == Some(&Value::from(id)))
            .expect("row exists")
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn upserts(&self, table: &str) -> Vec<UpsertCall> {
        self.upserts
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.table == table)
            .cloned()
            .collect()
    }

    pub fn batch_sizes(&self, table: &str) -> Vec<usize> {
        self.upserts(table).iter().map(|call| call.rows).collect()
    }

    pub fn writes_to(&self, table: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == format!("upsert:{table}") || **call == format!("delete:{table}"))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .unwrap_or_default()
            .partial_cmp(&b.as_f64().unwrap_or_default())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => left.to_string().cmp(&right.to_string()),
    }
}

/// Lexicographic order over the `keys` columns of two rows.
pub fn compare_keys(left: &Row, right: &Row, keys: &[String]) -> Ordering {
    keys.iter()
        .map(|key| {
            compare_values(
                left.get(key).unwrap_or(&Value::Null),
                right.get(key).unwrap_or(&Value::Null),
            )
        })
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn missing(table: &str) -> Error {
    Error::Db(format!("relation \"{table}\" does not exist"))
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn list_tables(&self) -> Result<Vec<String>> {
        self.record("list_tables".to_string());
        Ok(self.tables.lock().unwrap().keys().cloned().collect())
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<String>> {
        self.record(format!("list_columns:{table}"));
        let tables = self.tables.lock().unwrap();
        let entry = tables.get(table).ok_or_else(|| missing(table))?;
        Ok(entry.columns.clone())
    }

    async fn list_indexes(&self, table: &str) -> Result<Vec<IndexDef>> {
        self.record(format!("list_indexes:{table}"));
        let tables = self.tables.lock().unwrap();
        let entry = tables.get(table).ok_or_else(|| missing(table))?;
        if entry.primary_key.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![IndexDef {
            name: format!("{table}_pkey"),
            columns: entry.primary_key.clone(),
            is_primary: true,
            is_unique: true,
        }])
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        self.record(format!("count:{table}"));
        if self.fail_count.lock().unwrap().as_deref() == Some(table) {
            return Err(Error::Db("canceling statement due to statement timeout".to_string()));
        }
        let tables = self.tables.lock().unwrap();
        let entry = tables.get(table).ok_or_else(|| missing(table))?;
        Ok(entry.rows.len() as u64)
    }

    async fn fetch_chunk(
        &self,
        table: &str,
        keys: &[String],
        after: Option<&Row>,
        limit: usize,
    ) -> Result<Vec<Row>> {
        self.record(format!("fetch:{table}"));
        let mut tables = self.tables.lock().unwrap();
        let entry = tables.get(table).ok_or_else(|| missing(table))?;

        let mut rows: Vec<Row> = entry
            .rows
            .iter()
            .filter(|row| match after {
                None => true,
                Some(cursor) => compare_keys(row, cursor, keys) == Ordering::Greater,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_keys(a, b, keys));
        rows.truncate(limit);

        let nth = {
            let mut fetches = self.fetches.lock().unwrap();
            let counter = fetches.entry(table.to_string()).or_insert(0);
            let nth = *counter;
            *counter += 1;
            nth
        };
        if let Some(hook) = self.on_fetch.lock().unwrap().as_mut() {
            hook(table, nth, &mut *tables);
        }
        Ok(rows)
    }

    async fn delete_all(&self, table: &str) -> Result<u64> {
        self.record(format!("delete:{table}"));
        let mut tables = self.tables.lock().unwrap();
        let entry = tables.get_mut(table).ok_or_else(|| missing(table))?;
        let deleted = entry.rows.len() as u64;
        entry.rows.clear();
        Ok(deleted)
    }

    async fn upsert(
        &self,
        table: &str,
        rows: &[RowUpdate],
        keys: &[String],
        columns: &[String],
    ) -> Result<()> {
        self.record(format!("upsert:{table}"));
        let nth = self.upserts(table).len();
        self.upserts.lock().unwrap().push(UpsertCall {
            table: table.to_string(),
            rows: rows.len(),
            columns: columns.to_vec(),
        });
        if let Some((failing, at)) = self.fail_upsert.lock().unwrap().as_ref() {
            if failing == table && *at == nth {
                return Err(Error::Db(
                    "duplicate key value violates unique constraint".to_string(),
                ));
            }
        }

        let mut tables = self.tables.lock().unwrap();
        let entry = tables.get_mut(table).ok_or_else(|| missing(table))?;
        for update in rows {
            let mut matched = false;
            for row in entry
                .rows
                .iter_mut()
                .filter(|row| keys.iter().all(|key| row.get(key) == update.get(key)))
            {
                matched = true;
                for column in columns {
                    if let Some(value) = update.get(column) {
                        row.insert(column.clone(), value.clone());
                    }
                }
            }
            if matched {
                continue;
            }

            // Every column of a fake table is NOT NULL without a default.
            let mut row = Row::new();
            for column in keys.iter().chain(columns) {
                if let Some(value) = update.get(column) {
                    row.insert(column.clone(), value.clone());
                }
            }
            if let Some(absent) = entry.columns.iter().find(|column| !row.contains_key(*column)) {
                return Err(Error::Db(format!(
                    "null value in column \"{absent}\" of relation \"{table}\" violates not-null constraint"
                )));
            }
            entry.rows.push(row);
        }
        Ok(())
    }
}

/// `count` user rows with ids `1..=count`.
pub fn users(count: i64) -> Vec<Value> {
    (1..=count)
        .map(|id| {
            serde_json::json!({
                "id": id,
                "name": format!("User {id}"),
                "email": format!("user{id}@corp.test"),
                "username": format!("user{id}"),
                "created_at": "2024-01-01T00:00:00Z",
            })
        })
        .collect()
}

pub const USER_COLUMNS: &[&str] = &["id", "name", "email", "username", "created_at"];
