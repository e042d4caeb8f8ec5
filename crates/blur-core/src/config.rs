use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation::validate_config;

/// Default number of rows fetched per chunk.
pub const DEFAULT_CHUNK_SIZE: u32 = 2000;

/// Top-level obfuscation configuration (`blur.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct BlurConfig {
    /// What a table failure means for the rest of the run.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Optional seed for reproducible synthetic values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Tables to obfuscate, keyed by table name.
    #[serde(default)]
    pub tables: BTreeMap<String, TableConfig>,
}

/// Per-table obfuscation settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    /// Key columns used to match rows on write. Defaults to the primary key,
    /// then to `["id"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    /// Column name to transform spec (`"faker:name"`, `"fixed:REDACTED"`).
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub method: Method,
    /// Rows fetched per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
    /// Modifier ids applied in order to every row update.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            keys: None,
            columns: BTreeMap::new(),
            method: Method::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            modifiers: Vec::new(),
        }
    }
}

/// How rows of a table are processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Rewrite configured columns row by row.
    #[default]
    #[serde(alias = "update")]
    Transform,
    /// Delete every row of the table.
    Clear,
}

/// Policy applied when a single table fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Continue with the remaining tables; the run still succeeds.
    #[default]
    Lenient,
    /// Continue with the remaining tables; the run fails if any table failed.
    Strict,
    /// Stop at the first failed table; the run fails.
    FailFast,
}

impl FailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
            Self::FailFast => "fail_fast",
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            "fail_fast" | "fail-fast" => Ok(Self::FailFast),
            other => Err(Error::InvalidConfig(format!(
                "unknown failure policy '{other}' (expected lenient, strict or fail_fast)"
            ))),
        }
    }
}

fn default_chunk_size() -> u32 {
    DEFAULT_CHUNK_SIZE
}

/// Parse and statically validate a TOML configuration document.
pub fn parse_config(contents: &str) -> Result<BlurConfig> {
    let config: BlurConfig = toml::from_str(contents)?;
    let report = validate_config(&config);
    if !report.is_ok() {
        let messages: Vec<String> = report
            .errors
            .iter()
            .map(|issue| format!("{}: {}", issue.path, issue.message))
            .collect();
        return Err(Error::InvalidConfig(messages.join("; ")));
    }
    Ok(config)
}

/// Read a configuration file from disk.
pub fn load_config(path: &Path) -> Result<BlurConfig> {
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}
