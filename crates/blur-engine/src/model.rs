use chrono::{DateTime, Utc};
use serde::Serialize;

use blur_core::{FailurePolicy, Method, TableConfig, TransformSpec};

/// Name of the environment the run targets (`local`, `staging`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment(String);

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_production(&self) -> bool {
        self.0.trim().eq_ignore_ascii_case("production")
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new("local")
    }
}

/// Processing instructions for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    /// Configured key override; `None` falls back to the primary key, then `id`.
    pub keys: Option<Vec<String>>,
    pub columns: Vec<(String, TransformSpec)>,
    pub method: Method,
    pub chunk_size: usize,
    pub modifiers: Vec<String>,
}

impl TableSpec {
    pub fn from_config(name: &str, config: &TableConfig) -> Self {
        Self {
            name: name.to_string(),
            keys: config.keys.clone(),
            columns: config
                .columns
                .iter()
                .map(|(column, spec)| (column.clone(), TransformSpec::parse(spec)))
                .collect(),
            method: config.method,
            chunk_size: config.chunk_size.max(1) as usize,
            modifiers: config.modifiers.clone(),
        }
    }
}

/// Terminal status of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    SkippedEmpty,
    Cleared { rows_deleted: u64 },
    Obfuscated { rows: u64 },
    Failed { error: String },
}

impl TableStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SkippedEmpty => "skipped (empty)",
            Self::Cleared { .. } => "cleared",
            Self::Obfuscated { .. } => "obfuscated",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableOutcome {
    pub table: String,
    #[serde(flatten)]
    pub status: TableStatus,
    pub duration_ms: u64,
}

/// Aggregated outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub policy: FailurePolicy,
    pub tables: Vec<TableOutcome>,
    /// Tables skipped because they sort before the continuation marker.
    pub skipped: Vec<String>,
    /// The run stopped early (cancellation or fail-fast).
    pub interrupted: bool,
    pub success: bool,
}

impl RunResult {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            policy,
            tables: Vec::new(),
            skipped: Vec::new(),
            interrupted: false,
            success: true,
        }
    }

    pub fn status(&self, table: &str) -> Option<&TableStatus> {
        self.tables
            .iter()
            .find(|outcome| outcome.table == table)
            .map(|outcome| &outcome.status)
    }

    pub fn failed_tables(&self) -> impl Iterator<Item = &TableOutcome> {
        self.tables.iter().filter(|outcome| outcome.status.is_failed())
    }

    /// Table to pass as the continuation marker when rerunning.
    pub fn resume_marker(&self) -> Option<&str> {
        self.failed_tables()
            .next()
            .map(|outcome| outcome.table.as_str())
    }

    pub fn count(&self, label: &str) -> usize {
        self.tables
            .iter()
            .filter(|outcome| outcome.status.label() == label)
            .count()
    }

    pub(crate) fn finish(&mut self) {
        let any_failed = self.failed_tables().next().is_some();
        self.success = match self.policy {
            FailurePolicy::Lenient => !self.interrupted,
            FailurePolicy::Strict | FailurePolicy::FailFast => !any_failed,
        };
        self.finished_at = Some(Utc::now());
    }
}
