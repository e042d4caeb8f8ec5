//! PostgreSQL implementation of the Blur database capability.

mod database;
mod queries;
pub mod sql;

pub use database::{DEFAULT_SCHEMA, PostgresDatabase};
