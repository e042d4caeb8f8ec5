use blur_generate::GenerationError;
use thiserror::Error;

/// Errors emitted by the obfuscation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("environment '{0}' is production; refusing to obfuscate")]
    ProductionGuard(String),
    #[error("no tables configured for obfuscation exist in the database")]
    NoConfiguredTables,
    #[error("table '{table}': {message}")]
    InvalidTable { table: String, message: String },
    #[error("table '{table}': row has no value for key column '{column}'")]
    MissingKeyColumn { table: String, column: String },
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("table '{table}': write of {rows} rows failed (keys {keys}): {source}")]
    Write {
        table: String,
        rows: usize,
        keys: String,
        #[source]
        source: blur_core::Error,
    },
    #[error(transparent)]
    Database(#[from] blur_core::Error),
    #[error("table '{0}': cancelled")]
    Cancelled(String),
}
