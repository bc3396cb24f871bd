//! braindb-stores - Persistent idea store implementations for braindb.
//!
//! # Supported Backends
//!
//! - **SQLite** (feature: `sqlite`, default) - single-file embedded database

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
