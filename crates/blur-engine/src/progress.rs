use tracing::{info, warn};

use crate::model::{RunResult, TableStatus};

/// Receives progress events while a run executes.
pub trait ProgressSink: Send {
    fn table_started(&mut self, _table: &str, _total_rows: u64) {}

    fn advance(&mut self, _table: &str, _rows: u64) {}

    fn table_finished(&mut self, _table: &str, _status: &TableStatus) {}

    fn run_finished(&mut self, _result: &RunResult) {}
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// Emits progress as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingProgress {
    total: u64,
    done: u64,
}

impl ProgressSink for TracingProgress {
    fn table_started(&mut self, table: &str, total_rows: u64) {
        self.total = total_rows;
        self.done = 0;
        info!(table, total_rows, "obfuscating table");
    }

    fn advance(&mut self, table: &str, rows: u64) {
        self.done += rows;
        let percent = if self.total > 0 {
            (self.done.min(self.total) * 100) / self.total
        } else {
            100
        };
        info!(table, done = self.done, total = self.total, percent, "progress");
    }

    fn table_finished(&mut self, table: &str, status: &TableStatus) {
        match status {
            TableStatus::SkippedEmpty => info!(table, "table is empty"),
            TableStatus::Cleared { rows_deleted } => info!(table, rows_deleted, "table cleared"),
            TableStatus::Obfuscated { rows } => info!(table, rows, "table obfuscated"),
            TableStatus::Failed { error } => warn!(table, error = %error, "table failed"),
        }
    }

    fn run_finished(&mut self, result: &RunResult) {
        info!(
            run_id = %result.run_id,
            obfuscated = result.count("obfuscated"),
            cleared = result.count("cleared"),
            empty = result.count("skipped (empty)"),
            failed = result.count("failed"),
            skipped = result.skipped.len(),
            success = result.success,
            "database obfuscation finished"
        );
    }
}
