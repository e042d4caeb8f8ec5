use serde_json::Value;

use crate::errors::GenerationError;
use crate::generators::Generator;

/// Returns its first argument verbatim (`"fixed:REDACTED"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGenerator;

impl Generator for FixedGenerator {
    fn generate(&mut self, parameters: &[String]) -> Result<Value, GenerationError> {
        let value = parameters
            .first()
            .ok_or_else(|| GenerationError::MissingParameter {
                generator: "fixed".to_string(),
            })?;
        Ok(Value::String(value.clone()))
    }
}
