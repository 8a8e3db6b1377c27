//! metro-storage - durable per-user attribute persistence.
//!
//! Provides a WAL-mode SQLite database with migrations and the
//! `PersistenceAdapter` implementations the skill hydrates from and
//! flushes to.

pub mod attributes;
pub mod db;
pub mod migrations;

pub use attributes::{InMemoryAttributeStore, PersistenceAdapter, SqliteAttributeStore};
pub use db::Database;
