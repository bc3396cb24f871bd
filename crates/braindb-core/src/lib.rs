//! braindb-core - Core library for braindb.
//!
//! This crate turns free-form text into a small knowledge graph of atomic
//! ideas: a rule-based chunker proposes ideas, a review session lets the
//! user correct them, and the graph linker, relevance scorer and recall
//! tracker work over the committed ideas through an [`IdeaStore`].
//!
//! # Example
//!
//! ```
//! use braindb_core::{Brain, BrainConfig};
//!
//! let brain = Brain::in_memory(BrainConfig::default());
//!
//! let mut review = brain.submit("Photosynthesis converts light to energy.").unwrap();
//! let ideas = brain.commit(&mut review).unwrap();
//!
//! let found = brain.scorer().find_relevant("photosynthesis", None).unwrap();
//! assert_eq!(found[0].idea_id, ideas[0].idea_id);
//! ```

pub mod brain;
pub mod chunker;
pub mod config;
pub mod error;
pub mod graph;
pub mod recall;
pub mod retrieval;
pub mod review;
pub mod store;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use brain::Brain;
pub use chunker::{classify_type, count_words, Chunker, ChunkerConfig};
pub use config::{BrainConfig, BrainConfigBuilder};
pub use error::{BrainError, BrainResult, ErrorCode, LinkError, ReviewError};
pub use graph::{GraphConfig, GraphLinker};
pub use recall::{RecallConfig, RecallTracker};
pub use retrieval::{RelevanceScorer, RetrievalConfig};
pub use review::{ReviewSession, WorkingChunk};
pub use store::InMemoryStore;
pub use traits::{generate_id, IdeaStore};
pub use types::{
    ChunkIssue, ChunkResult, ContextSet, Edge, EdgeDraft, ExportSnapshot, Idea, IdeaDraft,
    IdeaLink, IdeaType, IssueKind, LinkDirection, LinkType, RawInput, StrengthStage,
    EXPORT_FORMAT_VERSION, MAX_CONFIDENCE, MAX_STRENGTH,
};
pub use validation::{CharCountLevel, CharCountStatus, InputValidator, ValidationConfig};
