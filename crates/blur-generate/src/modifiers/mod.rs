use std::collections::BTreeMap;

use blur_core::{RowUpdate, TransformSpec};
use thiserror::Error;

use crate::errors::GenerationError;

mod builtin;

pub use builtin::{CaseModifier, CopyModifier, EmailFromNameModifier};

/// Failure reported by a single modifier.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ModifierError(pub String);

/// Post-processes a complete row update before it is written.
pub trait Modifier: Send + Sync {
    fn modify(&self, update: RowUpdate) -> Result<RowUpdate, ModifierError>;

    /// Columns this modifier writes, checked against the live table before
    /// any row is read.
    fn targets(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Builds a modifier from the arguments of its id (`"copy:name,display_name"`).
pub type ModifierFactory =
    Box<dyn Fn(&[String]) -> Result<Box<dyn Modifier>, GenerationError> + Send + Sync>;

/// Maps modifier names to factories.
pub struct ModifierRegistry {
    factories: BTreeMap<String, ModifierFactory>,
}

impl ModifierRegistry {
    /// Registry with the built-in modifiers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        builtin::register(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&[String]) -> Result<Box<dyn Modifier>, GenerationError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    fn build(&self, id: &str) -> Result<Box<dyn Modifier>, GenerationError> {
        let spec = TransformSpec::parse(id);
        let factory = self
            .factories
            .get(&spec.generator)
            .ok_or_else(|| GenerationError::UnknownModifier(spec.generator.clone()))?;
        factory(&spec.arguments)
    }
}

impl Default for ModifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifierRegistry")
            .field("modifiers", &self.names())
            .finish()
    }
}

/// Ordered modifiers configured for one table.
pub struct ModifierChain {
    modifiers: Vec<(String, Box<dyn Modifier>)>,
}

impl ModifierChain {
    /// Build the chain for `ids`, failing on the first unknown or malformed id.
    pub fn resolve(registry: &ModifierRegistry, ids: &[String]) -> Result<Self, GenerationError> {
        let modifiers = ids
            .iter()
            .map(|id| Ok((id.clone(), registry.build(id)?)))
            .collect::<Result<Vec<_>, GenerationError>>()?;
        Ok(Self { modifiers })
    }

    pub fn empty() -> Self {
        Self {
            modifiers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Every column written by the chain, sorted and deduplicated.
    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self
            .modifiers
            .iter()
            .flat_map(|(_, modifier)| modifier.targets())
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    /// Run every modifier in order. `keys` names the key columns, used to
    /// identify the row in error messages. Key values must come out of every
    /// modifier unchanged, otherwise the write would address another row.
    pub fn apply(&self, update: RowUpdate, keys: &[String]) -> Result<RowUpdate, GenerationError> {
        let original: Vec<Option<serde_json::Value>> =
            keys.iter().map(|key| update.get(key).cloned()).collect();
        let snapshot = describe_keys(&update, keys);

        let mut update = update;
        for (id, modifier) in &self.modifiers {
            update = modifier
                .modify(update)
                .map_err(|err| GenerationError::Modifier {
                    modifier: id.clone(),
                    keys: snapshot.clone(),
                    message: err.0,
                })?;

            let changed = keys
                .iter()
                .zip(&original)
                .find(|(key, before)| update.get(*key) != before.as_ref());
            if let Some((key, _)) = changed {
                return Err(GenerationError::Modifier {
                    modifier: id.clone(),
                    keys: snapshot,
                    message: format!("changed key column '{key}'"),
                });
            }
        }
        Ok(update)
    }
}

/// Render the key columns of a row as `{"id":5}` for diagnostics.
pub fn describe_keys(row: &RowUpdate, keys: &[String]) -> String {
    let subset: serde_json::Map<String, serde_json::Value> = keys
        .iter()
        .map(|key| {
            (
                key.clone(),
                row.get(key).cloned().unwrap_or(serde_json::Value::Null),
            )
        })
        .collect();
    serde_json::Value::Object(subset).to_string()
}
