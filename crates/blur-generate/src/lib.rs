//! Value generators and row modifiers for Blur.
//!
//! Generators turn a transform spec (`"faker:name"`) into a replacement
//! value. Modifiers post-process a complete row update for cross-column
//! consistency. Both are resolved by name through a registry.

pub mod errors;
pub mod generators;
pub mod modifiers;

pub use errors::GenerationError;
pub use generators::{
    FakerCategory, Generator, GeneratorCache, GeneratorFactory, GeneratorRegistry,
};
pub use modifiers::{Modifier, ModifierChain, ModifierError, ModifierFactory, ModifierRegistry};
