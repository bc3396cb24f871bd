//! Built-in store implementations.
//!
//! Persistent backends live in the `braindb-stores` crate.

mod memory;

pub use memory::InMemoryStore;
