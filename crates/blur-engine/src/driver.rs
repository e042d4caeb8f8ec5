use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use blur_core::{Method, Row, validate_table_against_columns};
use blur_generate::{GeneratorCache, GeneratorRegistry, ModifierChain, ModifierRegistry};

use crate::database::{Database, IndexDef};
use crate::errors::EngineError;
use crate::model::{TableSpec, TableStatus};
use crate::progress::ProgressSink;
use crate::transformer::RowTransformer;
use crate::writer::BatchWriter;

/// Lifecycle of a single table inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Init,
    Counting,
    Empty,
    Streaming,
    Done,
    Failed,
}

/// Key columns for a table: the configured override, else the primary key,
/// else `["id"]`.
pub fn resolve_keys(configured: Option<&[String]>, indexes: &[IndexDef]) -> Vec<String> {
    if let Some(keys) = configured.filter(|keys| !keys.is_empty()) {
        return keys.to_vec();
    }
    indexes
        .iter()
        .find(|index| index.is_primary && !index.columns.is_empty())
        .map(|index| index.columns.clone())
        .unwrap_or_else(|| vec!["id".to_string()])
}

/// Processes one table: clears it, or streams it in key order and rewrites
/// the configured columns.
pub struct TableDriver<'a> {
    db: &'a dyn Database,
    generators: &'a GeneratorRegistry,
    modifiers: &'a ModifierRegistry,
    seed: Option<u64>,
    cancel: CancellationToken,
}

impl<'a> TableDriver<'a> {
    pub fn new(
        db: &'a dyn Database,
        generators: &'a GeneratorRegistry,
        modifiers: &'a ModifierRegistry,
    ) -> Self {
        Self {
            db,
            generators,
            modifiers,
            seed: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(
        &self,
        spec: &TableSpec,
        progress: &mut dyn ProgressSink,
    ) -> Result<TableStatus, EngineError> {
        let mut cache = match self.seed {
            Some(seed) => GeneratorCache::seeded(self.generators, seed, &spec.name),
            None => GeneratorCache::new(self.generators),
        };
        let mut state = TableState::Init;

        let result = self.process(spec, &mut cache, &mut state, progress).await;
        if result.is_err() {
            transition(&spec.name, &mut state, TableState::Failed);
        }

        debug!(table = %spec.name, generators = cache.len(), "releasing generator instances");
        cache.clear();
        result
    }

    async fn process(
        &self,
        spec: &TableSpec,
        cache: &mut GeneratorCache<'_>,
        state: &mut TableState,
        progress: &mut dyn ProgressSink,
    ) -> Result<TableStatus, EngineError> {
        let table = spec.name.as_str();

        if spec.method == Method::Clear {
            let rows_deleted = self.db.delete_all(table).await?;
            info!(table, rows_deleted, "table cleared");
            transition(table, state, TableState::Done);
            return Ok(TableStatus::Cleared { rows_deleted });
        }

        let indexes = self.db.list_indexes(table).await?;
        let keys = resolve_keys(spec.keys.as_deref(), &indexes);
        let chain = ModifierChain::resolve(self.modifiers, &spec.modifiers)?;

        transition(table, state, TableState::Counting);
        let total = self.db.count_rows(table).await?;
        if total == 0 {
            transition(table, state, TableState::Empty);
            return Ok(TableStatus::SkippedEmpty);
        }

        let columns = self.db.list_columns(table).await?;
        let targets: Vec<String> = spec.columns.iter().map(|(column, _)| column.clone()).collect();
        let report =
            validate_table_against_columns(table, &targets, &chain.targets(), &keys, &columns);
        if !report.is_ok() {
            let message = report
                .errors
                .iter()
                .map(|issue| issue.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(EngineError::InvalidTable {
                table: table.to_string(),
                message,
            });
        }
        progress.table_started(table, total);

        transition(table, state, TableState::Streaming);
        let transformer = RowTransformer::new(table, &keys, &spec.columns, &chain);
        let mut writer = BatchWriter::new(self.db, table, &keys, spec.chunk_size);
        let mut cursor: Option<Row> = None;
        let mut rows_processed: u64 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(EngineError::Cancelled(table.to_string()));
            }

            let chunk = self
                .db
                .fetch_chunk(table, &keys, cursor.as_ref(), spec.chunk_size)
                .await?;
            if chunk.is_empty() {
                break;
            }

            for record in &chunk {
                let update = transformer.transform(cache, record)?;
                writer.append(update).await?;
            }
            writer.flush().await?;

            rows_processed += chunk.len() as u64;
            progress.advance(table, chunk.len() as u64);

            let next = match chunk.last() {
                Some(record) => key_cursor(table, &keys, record)?,
                None => break,
            };
            if cursor.as_ref() == Some(&next) {
                return Err(EngineError::InvalidTable {
                    table: table.to_string(),
                    message: format!("key columns {keys:?} did not advance"),
                });
            }
            cursor = Some(next);

            if chunk.len() < spec.chunk_size {
                break;
            }
        }

        if rows_processed < total {
            let remaining = self.db.count_rows(table).await?;
            if remaining > rows_processed {
                return Err(EngineError::InvalidTable {
                    table: table.to_string(),
                    message: format!(
                        "visited {rows_processed} of {remaining} rows; key columns {keys:?} do not identify rows uniquely"
                    ),
                });
            }
            debug!(table, counted = total, remaining, "rows deleted while streaming");
        }

        debug!(
            table,
            rows = rows_processed,
            written = writer.rows_written(),
            batches = writer.flushes(),
            "table streamed"
        );
        transition(table, state, TableState::Done);
        Ok(TableStatus::Obfuscated {
            rows: rows_processed,
        })
    }
}

/// Key values of `record`, used as the exclusive lower bound of the next chunk.
fn key_cursor(table: &str, keys: &[String], record: &Row) -> Result<Row, EngineError> {
    keys.iter()
        .map(|key| match record.get(key) {
            Some(value) if !value.is_null() => Ok((key.clone(), value.clone())),
            _ => Err(EngineError::InvalidTable {
                table: table.to_string(),
                message: format!("key column '{key}' is null; cannot page rows"),
            }),
        })
        .collect()
}

fn transition(table: &str, state: &mut TableState, next: TableState) {
    debug!(table, from = ?*state, to = ?next, "table state");
    *state = next;
}
