use crate::config::{BlurConfig, Method, TableConfig};

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Structured validation issue with location and hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub path: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        severity: IssueSeverity,
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            path: path.into(),
            message: message.into(),
            hint,
        }
    }
}

/// Aggregated validation report with errors and warnings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    pub fn push_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Check a configuration for problems that need no database access.
pub fn validate_config(config: &BlurConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (name, table) in &config.tables {
        validate_table(name, table, &mut report);
    }
    report
}

fn validate_table(name: &str, table: &TableConfig, report: &mut ValidationReport) {
    let path = format!("tables.{name}");

    if table.chunk_size == 0 {
        report.push_error(ValidationIssue::new(
            IssueSeverity::Error,
            "invalid_chunk_size",
            format!("{path}.chunk_size"),
            "chunk_size must be greater than zero",
            None,
        ));
    }

    if let Some(keys) = &table.keys {
        if keys.is_empty() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "empty_keys",
                format!("{path}.keys"),
                "keys override must name at least one column",
                Some("remove `keys` to fall back to the primary key".to_string()),
            ));
        }
        for key in keys {
            if table.columns.contains_key(key) {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "key_column_transformed",
                    format!("{path}.columns.{key}"),
                    format!("key column '{key}' cannot be a transform target"),
                    None,
                ));
            }
        }
    }

    for (column, spec) in &table.columns {
        if spec.trim().is_empty() {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "empty_transform_spec",
                format!("{path}.columns.{column}"),
                "transform spec must not be empty",
                Some("use e.g. \"faker:name\" or \"fixed:REDACTED\"".to_string()),
            ));
        }
    }

    if table.method == Method::Transform && table.columns.is_empty() && table.modifiers.is_empty()
    {
        report.push_warning(ValidationIssue::new(
            IssueSeverity::Warning,
            "nothing_to_transform",
            path,
            "table has no columns or modifiers; rows will be left unchanged",
            None,
        ));
    }
}

/// Check transform targets, modifier targets and key columns against the
/// columns of the live table.
///
/// `keys` are the resolved key columns (override, primary key or `id`).
/// `modifier_targets` are the columns written by the table's modifiers.
pub fn validate_table_against_columns(
    name: &str,
    targets: &[String],
    modifier_targets: &[String],
    keys: &[String],
    columns: &[String],
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let path = format!("tables.{name}");

    for key in keys {
        if !columns.contains(key) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "unknown_key_column",
                format!("{path}.keys"),
                format!("key column '{key}' does not exist in table '{name}'"),
                None,
            ));
        }
        if targets.contains(key) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "key_column_transformed",
                format!("{path}.columns.{key}"),
                format!("key column '{key}' cannot be a transform target"),
                None,
            ));
        }
        if modifier_targets.contains(key) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "key_column_modified",
                format!("{path}.modifiers"),
                format!("key column '{key}' cannot be rewritten by a modifier"),
                None,
            ));
        }
    }

    for column in targets {
        if !columns.contains(column) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "unknown_column",
                format!("{path}.columns.{column}"),
                format!("column '{column}' does not exist in table '{name}'"),
                None,
            ));
        }
    }

    for column in modifier_targets {
        if !columns.contains(column) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "unknown_modifier_target",
                format!("{path}.modifiers"),
                format!("modifier target '{column}' does not exist in table '{name}'"),
                None,
            ));
        }
    }

    report
}
