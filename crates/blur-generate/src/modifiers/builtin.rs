use blur_core::RowUpdate;
use serde_json::Value;

use crate::errors::GenerationError;
use crate::modifiers::{Modifier, ModifierError, ModifierRegistry};

pub fn register(registry: &mut ModifierRegistry) {
    registry.register("email_from_name", |args| {
        let (source, target) = two_columns("email_from_name", args)?;
        let domain = args
            .get(2)
            .filter(|domain| !domain.is_empty())
            .cloned()
            .unwrap_or_else(|| "example.com".to_string());
        Ok(Box::new(EmailFromNameModifier {
            source,
            target,
            domain,
        }) as Box<dyn Modifier>)
    });
    registry.register("copy", |args| {
        let (source, target) = two_columns("copy", args)?;
        Ok(Box::new(CopyModifier { source, target }) as Box<dyn Modifier>)
    });
    registry.register("lowercase", |args| {
        Ok(Box::new(CaseModifier {
            column: one_column("lowercase", args)?,
            upper: false,
        }) as Box<dyn Modifier>)
    });
    registry.register("uppercase", |args| {
        Ok(Box::new(CaseModifier {
            column: one_column("uppercase", args)?,
            upper: true,
        }) as Box<dyn Modifier>)
    });
}

/// Sets `target` to an address derived from the (already obfuscated) `source`
/// column, so that e.g. `email` stays consistent with `name`.
#[derive(Debug, Clone)]
pub struct EmailFromNameModifier {
    pub source: String,
    pub target: String,
    pub domain: String,
}

impl Modifier for EmailFromNameModifier {
    fn targets(&self) -> Vec<String> {
        vec![self.target.clone()]
    }

    fn modify(&self, mut update: RowUpdate) -> Result<RowUpdate, ModifierError> {
        let value = column(&update, &self.source)?;
        let local = sanitize_identifier(&value_to_string(value));
        let local = if local.is_empty() {
            "user".to_string()
        } else {
            local
        };
        update.insert(
            self.target.clone(),
            Value::String(format!("{local}@{}", self.domain)),
        );
        Ok(update)
    }
}

#[derive(Debug, Clone)]
pub struct CopyModifier {
    pub source: String,
    pub target: String,
}

impl Modifier for CopyModifier {
    fn targets(&self) -> Vec<String> {
        vec![self.target.clone()]
    }

    fn modify(&self, mut update: RowUpdate) -> Result<RowUpdate, ModifierError> {
        let value = column(&update, &self.source)?.clone();
        update.insert(self.target.clone(), value);
        Ok(update)
    }
}

#[derive(Debug, Clone)]
pub struct CaseModifier {
    pub column: String,
    pub upper: bool,
}

impl Modifier for CaseModifier {
    fn targets(&self) -> Vec<String> {
        vec![self.column.clone()]
    }

    fn modify(&self, mut update: RowUpdate) -> Result<RowUpdate, ModifierError> {
        let converted = match column(&update, &self.column)? {
            Value::String(text) if self.upper => Value::String(text.to_uppercase()),
            Value::String(text) => Value::String(text.to_lowercase()),
            Value::Null => Value::Null,
            other => {
                return Err(ModifierError(format!(
                    "column '{}' is not a string ({other})",
                    self.column
                )));
            }
        };
        update.insert(self.column.clone(), converted);
        Ok(update)
    }
}

fn column<'a>(update: &'a RowUpdate, name: &str) -> Result<&'a Value, ModifierError> {
    update.get(name).ok_or_else(|| {
        ModifierError(format!(
            "column '{name}' is not part of the update (only key and configured columns are)"
        ))
    })
}

fn one_column(modifier: &str, args: &[String]) -> Result<String, GenerationError> {
    match args {
        [column] if !column.is_empty() => Ok(column.clone()),
        _ => Err(GenerationError::InvalidModifier {
            modifier: modifier.to_string(),
            message: "expected exactly one column argument".to_string(),
        }),
    }
}

fn two_columns(modifier: &str, args: &[String]) -> Result<(String, String), GenerationError> {
    match args {
        [source, target, ..] if !source.is_empty() && !target.is_empty() => {
            Ok((source.clone(), target.clone()))
        }
        _ => Err(GenerationError::InvalidModifier {
            modifier: modifier.to_string(),
            message: "expected <source>,<target> column arguments".to_string(),
        }),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn sanitize_identifier(value: &str) -> String {
    let mut out = String::new();
    let mut last_dot = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dot = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '_' | '.')) && !last_dot {
            out.push('.');
            last_dot = true;
        }
    }
    out.trim_matches('.').to_string()
}
