use std::collections::BTreeSet;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use blur_core::{BlurConfig, FailurePolicy};
use blur_generate::{GeneratorRegistry, ModifierRegistry};

use crate::database::Database;
use crate::driver::TableDriver;
use crate::errors::EngineError;
use crate::model::{Environment, RunResult, TableOutcome, TableSpec, TableStatus};
use crate::progress::ProgressSink;

/// Per-invocation options supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub environment: Environment,
    /// Explicit subset of the candidate tables; `Some(vec![])` selects nothing.
    pub selection: Option<Vec<String>>,
    /// Skip every table that sorts before this name.
    pub continue_from: Option<String>,
    /// Overrides the configured failure policy.
    pub failure_policy: Option<FailurePolicy>,
    /// Overrides the configured seed.
    pub seed: Option<u64>,
    pub cancel: CancellationToken,
}

/// Runs the configured tables one after another and aggregates the outcome.
#[derive(Debug, Default)]
pub struct Coordinator {
    generators: GeneratorRegistry,
    modifiers: ModifierRegistry,
}

impl Coordinator {
    /// Coordinator with the built-in generators and modifiers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registries(generators: GeneratorRegistry, modifiers: ModifierRegistry) -> Self {
        Self {
            generators,
            modifiers,
        }
    }

    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    pub fn modifiers(&self) -> &ModifierRegistry {
        &self.modifiers
    }

    /// Configured tables that exist in the database, in lexical order.
    ///
    /// Refuses to touch the database at all in a production environment.
    pub async fn candidate_tables(
        &self,
        db: &dyn Database,
        config: &BlurConfig,
        environment: &Environment,
    ) -> Result<Vec<String>, EngineError> {
        if environment.is_production() {
            return Err(EngineError::ProductionGuard(environment.name().to_string()));
        }

        let existing: BTreeSet<String> = db.list_tables().await?.into_iter().collect();
        let candidates: Vec<String> = config
            .tables
            .keys()
            .filter(|name| existing.contains(*name))
            .cloned()
            .collect();

        for name in config.tables.keys().filter(|name| !existing.contains(*name)) {
            warn!(table = %name, "configured table does not exist; ignoring");
        }

        if candidates.is_empty() {
            return Err(EngineError::NoConfiguredTables);
        }
        Ok(candidates)
    }

    pub async fn run(
        &self,
        db: &dyn Database,
        config: &BlurConfig,
        options: RunOptions,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunResult, EngineError> {
        let policy = options.failure_policy.unwrap_or(config.failure_policy);
        let seed = options.seed.or(config.seed);
        let mut result = RunResult::new(policy);

        let candidates = self
            .candidate_tables(db, config, &options.environment)
            .await?;
        let tables = match &options.selection {
            Some(selection) => narrow(candidates, selection),
            None => candidates,
        };

        info!(
            run_id = %result.run_id,
            environment = options.environment.name(),
            tables = tables.len(),
            policy = policy.as_str(),
            "database obfuscation started"
        );

        let driver = TableDriver::new(db, &self.generators, &self.modifiers)
            .with_seed(seed)
            .with_cancellation(options.cancel.clone());

        for name in &tables {
            if let Some(marker) = options.continue_from.as_deref() {
                if name.as_str() < marker {
                    info!(table = %name, marker, "before continuation marker; skipping");
                    result.skipped.push(name.clone());
                    continue;
                }
            }

            if options.cancel.is_cancelled() {
                let status = TableStatus::Failed {
                    error: EngineError::Cancelled(name.clone()).to_string(),
                };
                progress.table_finished(name, &status);
                result.tables.push(TableOutcome {
                    table: name.clone(),
                    status,
                    duration_ms: 0,
                });
                result.interrupted = true;
                break;
            }

            let Some(table_config) = config.tables.get(name) else {
                continue;
            };
            let spec = TableSpec::from_config(name, table_config);

            let started = Instant::now();
            let (status, cancelled) = match driver.run(&spec, progress).await {
                Ok(status) => (status, false),
                Err(err) => {
                    error!(table = %name, error = %err, "table failed");
                    let cancelled = matches!(err, EngineError::Cancelled(_));
                    (
                        TableStatus::Failed {
                            error: err.to_string(),
                        },
                        cancelled,
                    )
                }
            };
            progress.table_finished(name, &status);

            let failed = status.is_failed();
            result.tables.push(TableOutcome {
                table: name.clone(),
                status,
                duration_ms: started.elapsed().as_millis() as u64,
            });

            if cancelled || (failed && policy == FailurePolicy::FailFast) {
                result.interrupted = true;
                break;
            }
        }

        result.finish();
        progress.run_finished(&result);
        Ok(result)
    }
}

/// Keep the candidates named by `selection`, preserving candidate order.
fn narrow(candidates: Vec<String>, selection: &[String]) -> Vec<String> {
    for name in selection.iter().filter(|name| !candidates.contains(*name)) {
        warn!(table = %name, "selected table is not a candidate; ignoring");
    }
    candidates
        .into_iter()
        .filter(|name| selection.contains(name))
        .collect()
}
