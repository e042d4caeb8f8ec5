//! Core contracts and helpers for Blur.
//!
//! This crate defines the configuration model, transform-spec parsing,
//! validation helpers and the shared error type used by the generator
//! registry, the obfuscation engine, database adapters and the CLI.

pub mod config;
pub mod error;
pub mod redaction;
pub mod transform_spec;
pub mod validation;

pub use config::{
    BlurConfig, DEFAULT_CHUNK_SIZE, FailurePolicy, Method, TableConfig, load_config,
    parse_config,
};
pub use error::{Error, Result};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use transform_spec::TransformSpec;
pub use validation::{
    IssueSeverity, ValidationIssue, ValidationReport, validate_config,
    validate_table_against_columns,
};

/// A database row keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Replacement values for one row: key columns plus transformed columns.
pub type RowUpdate = serde_json::Map<String, serde_json::Value>;
