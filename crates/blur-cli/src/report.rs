use std::fs;
use std::path::Path;

use blur_engine::{RunResult, TableStatus};

use crate::CliError;

pub fn write_report(path: &Path, result: &RunResult) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(result)?;
    fs::write(path, json)?;
    Ok(())
}

/// Final per-table summary for the terminal.
pub fn render_summary(result: &RunResult) -> String {
    let mut out = String::new();
    let width = result
        .tables
        .iter()
        .map(|outcome| outcome.table.len())
        .chain(result.skipped.iter().map(String::len))
        .max()
        .unwrap_or(0);

    for name in &result.skipped {
        out.push_str(&format!("{name:<width$}  skipped (before continuation marker)\n"));
    }
    for outcome in &result.tables {
        let detail = match &outcome.status {
            TableStatus::SkippedEmpty => "skipped (empty)".to_string(),
            TableStatus::Cleared { rows_deleted } => format!("cleared ({rows_deleted} rows)"),
            TableStatus::Obfuscated { rows } => format!("obfuscated ({rows} rows)"),
            TableStatus::Failed { error } => format!("failed: {error}"),
        };
        out.push_str(&format!("{:<width$}  {detail}\n", outcome.table));
    }

    out.push_str(&format!(
        "{} obfuscated, {} cleared, {} empty, {} failed\n",
        result.count("obfuscated"),
        result.count("cleared"),
        result.count("skipped (empty)"),
        result.count("failed"),
    ));
    if let Some(marker) = result.resume_marker() {
        out.push_str(&format!("to resume, rerun with --continue-from {marker}\n"));
    }
    out
}
