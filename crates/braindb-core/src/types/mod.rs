//! Core types for braindb.

mod chunk;
mod edge;
mod idea;
mod raw_input;
mod snapshot;

pub use chunk::*;
pub use edge::*;
pub use idea::*;
pub use raw_input::*;
pub use snapshot::*;
