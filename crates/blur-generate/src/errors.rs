use thiserror::Error;

/// Errors raised while computing replacement values.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unknown generator '{0}'")]
    UnknownGenerator(String),
    #[error("generator '{generator}' requires a parameter")]
    MissingParameter { generator: String },
    #[error("unsupported faker category '{0}'")]
    UnsupportedCategory(String),
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
    #[error("invalid modifier '{modifier}': {message}")]
    InvalidModifier { modifier: String, message: String },
    #[error("modifier '{modifier}' failed on row {keys}: {message}")]
    Modifier {
        modifier: String,
        keys: String,
        message: String,
    },
}
