//! Obfuscation engine for Blur.
//!
//! Streams the rows of each configured table in key order, replaces the
//! configured columns through the generator registry and modifier chain, and
//! writes the result back in bounded upsert batches. The database is reached
//! only through the [`Database`] capability trait.

pub mod coordinator;
pub mod database;
pub mod driver;
pub mod errors;
pub mod model;
pub mod progress;
pub mod transformer;
pub mod writer;

pub use coordinator::{Coordinator, RunOptions};
pub use database::{Database, IndexDef};
pub use driver::{TableDriver, TableState, resolve_keys};
pub use errors::EngineError;
pub use model::{Environment, RunResult, TableOutcome, TableSpec, TableStatus};
pub use progress::{NoopProgress, ProgressSink, TracingProgress};
pub use transformer::RowTransformer;
pub use writer::{BatchWriter, MAX_BATCH_SIZE};
