use blur_core::{
    BlurConfig, IssueSeverity, Method, TransformSpec, ValidationIssue, ValidationReport,
    validate_config, validate_table_against_columns,
};
use blur_engine::{Database, resolve_keys};
use blur_generate::{FakerCategory, GeneratorRegistry, ModifierChain, ModifierRegistry};

/// Checks that need no database: known generators, known faker categories
/// and resolvable modifiers.
pub fn check_registries(
    config: &BlurConfig,
    generators: &GeneratorRegistry,
    modifiers: &ModifierRegistry,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (table, table_config) in &config.tables {
        for (column, raw) in &table_config.columns {
            let spec = TransformSpec::parse(raw);
            let path = format!("tables.{table}.columns.{column}");
            if !generators.contains(&spec.generator) {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "unknown_generator",
                    path,
                    format!("unknown generator '{}'", spec.generator),
                    Some(format!("registered: {}", generators.names().join(", "))),
                ));
                continue;
            }
            if spec.generator == "faker" {
                match spec.arguments.first() {
                    Some(category) if FakerCategory::parse(category).is_none() => {
                        report.push_error(ValidationIssue::new(
                            IssueSeverity::Error,
                            "unsupported_category",
                            path,
                            format!("unsupported faker category '{category}'"),
                            Some("run `blur generators` for the list".to_string()),
                        ));
                    }
                    None => report.push_error(missing_argument(path, &spec)),
                    Some(_) => {}
                }
            } else if spec.generator == "fixed" && spec.arguments.is_empty() {
                report.push_error(missing_argument(path, &spec));
            }
        }

        if let Err(err) = ModifierChain::resolve(modifiers, &table_config.modifiers) {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_modifier",
                format!("tables.{table}.modifiers"),
                err.to_string(),
                None,
            ));
        }
    }

    report
}

fn missing_argument(path: String, spec: &TransformSpec) -> ValidationIssue {
    ValidationIssue::new(
        IssueSeverity::Error,
        "missing_parameter",
        path,
        format!("generator '{}' needs an argument", spec.generator),
        Some(format!("write it as \"{}:<value>\"", spec.generator)),
    )
}

/// Checks against the live schema: configured tables exist, key, target and
/// modifier target columns exist.
pub async fn check_schema(
    db: &dyn Database,
    config: &BlurConfig,
    modifiers: &ModifierRegistry,
) -> blur_core::Result<ValidationReport> {
    let mut report = ValidationReport::default();
    let tables = db.list_tables().await?;

    for (name, table) in &config.tables {
        if !tables.contains(name) {
            report.push_warning(ValidationIssue::new(
                IssueSeverity::Warning,
                "missing_table",
                format!("tables.{name}"),
                format!("table '{name}' does not exist and will be ignored"),
                None,
            ));
            continue;
        }
        if table.method == Method::Clear {
            continue;
        }
        let indexes = db.list_indexes(name).await?;
        let keys = resolve_keys(table.keys.as_deref(), &indexes);
        let columns = db.list_columns(name).await?;
        let targets: Vec<String> = table.columns.keys().cloned().collect();
        // Unresolvable chains are already reported by `check_registries`.
        let modifier_targets = ModifierChain::resolve(modifiers, &table.modifiers)
            .map(|chain| chain.targets())
            .unwrap_or_default();
        report.merge(validate_table_against_columns(
            name,
            &targets,
            &modifier_targets,
            &keys,
            &columns,
        ));
    }

    Ok(report)
}

pub fn full_report(config: &BlurConfig, registries: ValidationReport) -> ValidationReport {
    let mut report = validate_config(config);
    report.merge(registries);
    report
}

pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    for issue in report.errors.iter().chain(&report.warnings) {
        let level = match issue.severity {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
        };
        out.push_str(&format!("{level}[{}] {}: {}\n", issue.code, issue.path, issue.message));
        if let Some(hint) = &issue.hint {
            out.push_str(&format!("  hint: {hint}\n"));
        }
    }
    out
}
