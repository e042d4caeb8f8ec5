use std::collections::BTreeSet;

use blur_core::RowUpdate;
use blur_generate::modifiers::describe_keys;
use tracing::debug;

use crate::database::Database;
use crate::errors::EngineError;

/// Upper bound on rows per upsert.
pub const MAX_BATCH_SIZE: usize = 50;

/// Accumulates row updates and writes them as bounded upsert batches.
///
/// Each flush sets only the non-key columns present in the batch. Batches
/// are independent: a failed flush leaves earlier batches committed.
pub struct BatchWriter<'a> {
    db: &'a dyn Database,
    table: &'a str,
    keys: &'a [String],
    threshold: usize,
    pending: Vec<RowUpdate>,
    rows_written: u64,
    flushes: u64,
}

impl<'a> BatchWriter<'a> {
    pub fn new(db: &'a dyn Database, table: &'a str, keys: &'a [String], chunk_size: usize) -> Self {
        let threshold = MAX_BATCH_SIZE.min(chunk_size).max(1);
        Self {
            db,
            table,
            keys,
            threshold,
            pending: Vec::with_capacity(threshold),
            rows_written: 0,
            flushes: 0,
        }
    }

    pub async fn append(&mut self, update: RowUpdate) -> Result<(), EngineError> {
        self.pending.push(update);
        if self.pending.len() >= self.threshold {
            self.flush().await?;
        }
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), EngineError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = std::mem::take(&mut self.pending);

        let columns = update_columns(&batch, self.keys);
        if columns.is_empty() {
            debug!(table = self.table, rows = batch.len(), "batch has no columns to set");
            return Ok(());
        }

        self.db
            .upsert(self.table, &batch, self.keys, &columns)
            .await
            .map_err(|source| EngineError::Write {
                table: self.table.to_string(),
                rows: batch.len(),
                keys: batch_keys(&batch, self.keys),
                source,
            })?;

        self.rows_written += batch.len() as u64;
        self.flushes += 1;
        debug!(table = self.table, rows = batch.len(), "batch written");
        Ok(())
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }
}

fn update_columns(batch: &[RowUpdate], keys: &[String]) -> Vec<String> {
    let columns: BTreeSet<&String> = batch
        .iter()
        .flat_map(|update| update.keys())
        .filter(|column| !keys.contains(*column))
        .collect();
    columns.into_iter().cloned().collect()
}

fn batch_keys(batch: &[RowUpdate], keys: &[String]) -> String {
    const SHOWN: usize = 3;
    let mut shown: Vec<String> = batch
        .iter()
        .take(SHOWN)
        .map(|update| describe_keys(update, keys))
        .collect();
    if batch.len() > SHOWN {
        shown.push(format!("... {} more", batch.len() - SHOWN));
    }
    format!("[{}]", shown.join(", "))
}
