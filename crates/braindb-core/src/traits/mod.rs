//! Core traits for braindb collaborators.

mod store;

pub use store::*;
