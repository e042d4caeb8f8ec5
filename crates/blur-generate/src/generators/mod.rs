use std::collections::{BTreeMap, HashMap};

use blur_core::TransformSpec;
use serde_json::Value;
use tracing::debug;

use crate::errors::GenerationError;

mod faker;
mod fixed;

pub use faker::{FakerCategory, FakerGenerator};
pub use fixed::FixedGenerator;

/// Produces a replacement value from the arguments of a transform spec.
///
/// Instances may keep state between calls (e.g. a random source); the cache
/// hands out one instance per generator name for the duration of a table run.
pub trait Generator: Send {
    fn generate(&mut self, parameters: &[String]) -> Result<Value, GenerationError>;
}

/// Builds a generator instance. The argument is a seed derived from the run
/// seed, or `None` for an unseeded instance.
pub type GeneratorFactory = Box<dyn Fn(Option<u64>) -> Box<dyn Generator> + Send + Sync>;

/// Maps generator names to factories.
pub struct GeneratorRegistry {
    factories: BTreeMap<String, GeneratorFactory>,
}

impl GeneratorRegistry {
    /// Registry with the built-in `fixed` and `faker` generators.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("fixed", |_seed| Box::new(FixedGenerator));
        registry.register("faker", |seed| match seed {
            Some(seed) => Box::new(FakerGenerator::seeded(seed)),
            None => Box::new(FakerGenerator::new()),
        });
        registry
    }

    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) the generator resolved by `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Option<u64>) -> Box<dyn Generator> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    fn build(&self, name: &str, seed: Option<u64>) -> Result<Box<dyn Generator>, GenerationError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| GenerationError::UnknownGenerator(name.to_string()))?;
        Ok(factory(seed))
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.names())
            .finish()
    }
}

/// Live generator instances for one table run.
///
/// Holds at most one instance per generator name. Call [`clear`](Self::clear)
/// when the table run ends.
pub struct GeneratorCache<'a> {
    registry: &'a GeneratorRegistry,
    seed: Option<u64>,
    instances: HashMap<String, Box<dyn Generator>>,
}

impl<'a> GeneratorCache<'a> {
    pub fn new(registry: &'a GeneratorRegistry) -> Self {
        Self {
            registry,
            seed: None,
            instances: HashMap::new(),
        }
    }

    /// Cache whose instances are seeded from `(seed, scope, generator name)`.
    pub fn seeded(registry: &'a GeneratorRegistry, seed: u64, scope: &str) -> Self {
        Self {
            registry,
            seed: Some(hash_seed(seed, scope)),
            instances: HashMap::new(),
        }
    }

    /// Return the instance for `name`, creating it on first use.
    pub fn resolve(&mut self, name: &str) -> Result<&mut dyn Generator, GenerationError> {
        if !self.instances.contains_key(name) {
            let seed = self.seed.map(|seed| hash_seed(seed, name));
            let instance = self.registry.build(name, seed)?;
            debug!(generator = name, seeded = seed.is_some(), "generator created");
            self.instances.insert(name.to_string(), instance);
        }
        match self.instances.get_mut(name) {
            Some(instance) => Ok(instance.as_mut()),
            None => Err(GenerationError::UnknownGenerator(name.to_string())),
        }
    }

    pub fn generate(&mut self, spec: &TransformSpec) -> Result<Value, GenerationError> {
        self.resolve(&spec.generator)?.generate(&spec.arguments)
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
