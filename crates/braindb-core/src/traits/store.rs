//! Idea store trait.
//!
//! The store is the persistence collaborator for every engine component. It
//! owns raw inputs, ideas, edges and the retrieval context set. Backends keep
//! insertion order when listing records; retrieval tie-breaking relies on it.

use uuid::Uuid;

use crate::error::BrainResult;
use crate::types::{ContextSet, Edge, EdgeDraft, ExportSnapshot, Idea, IdeaDraft, RawInput};

/// Id prefix for raw inputs.
pub const RAW_INPUT_PREFIX: &str = "raw";
/// Id prefix for ideas.
pub const IDEA_PREFIX: &str = "idea";
/// Id prefix for edges.
pub const EDGE_PREFIX: &str = "edge";

/// Generate a unique id with the given prefix.
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Core IdeaStore trait - all store backends implement this.
///
/// Every method may fail with a store/database error; callers treat such a
/// failure as aborting the operation in flight. Multi-record writes are not
/// transactional across calls.
pub trait IdeaStore: Send + Sync {
    // ---- raw inputs ----

    /// Persist submitted text as a new unprocessed raw input.
    fn save_raw_input(&self, text: &str) -> BrainResult<RawInput>;

    /// All raw inputs in submission order.
    fn get_raw_inputs(&self) -> BrainResult<Vec<RawInput>>;

    /// Raw inputs not yet committed through a review.
    fn get_unprocessed_inputs(&self) -> BrainResult<Vec<RawInput>> {
        Ok(self
            .get_raw_inputs()?
            .into_iter()
            .filter(|r| !r.processed)
            .collect())
    }

    /// Flag a raw input as processed. Returns false if it does not exist.
    fn mark_processed(&self, id: &str) -> BrainResult<bool>;

    /// Delete a raw input. Returns false if it does not exist.
    fn delete_raw_input(&self, id: &str) -> BrainResult<bool>;

    // ---- ideas ----

    /// All ideas in insertion order.
    fn get_ideas(&self) -> BrainResult<Vec<Idea>>;

    /// A single idea by id.
    fn get_idea(&self, id: &str) -> BrainResult<Option<Idea>>;

    /// Upsert by `idea_id`. Updates stamp `updated_at`.
    fn save_idea(&self, idea: Idea) -> BrainResult<Idea>;

    /// Bulk insert drafts, generating ids where absent or already taken.
    fn save_ideas(&self, drafts: Vec<IdeaDraft>) -> BrainResult<Vec<Idea>>;

    /// Delete an idea and every edge referencing it. Returns false if the
    /// idea does not exist.
    fn delete_idea(&self, id: &str) -> BrainResult<bool>;

    /// Delete all ideas and edges.
    fn clear_all_ideas(&self) -> BrainResult<()>;

    // ---- edges ----

    /// All edges in insertion order.
    fn get_edges(&self) -> BrainResult<Vec<Edge>>;

    /// Insert an edge. Returns `None` when an edge with the same
    /// (from, to, type) triple already exists.
    fn save_edge(&self, draft: EdgeDraft) -> BrainResult<Option<Edge>>;

    /// Delete an edge. Returns false if it does not exist.
    fn delete_edge(&self, id: &str) -> BrainResult<bool>;

    // ---- context ----

    /// Current pins and exclusions.
    fn get_context(&self) -> BrainResult<ContextSet>;

    /// Replace pins and exclusions.
    fn save_context(&self, context: &ContextSet) -> BrainResult<()>;

    // ---- bulk ----

    /// Versioned snapshot of everything in the store.
    fn export_data(&self) -> BrainResult<ExportSnapshot> {
        Ok(ExportSnapshot::new(
            self.get_raw_inputs()?,
            self.get_ideas()?,
            self.get_edges()?,
            self.get_context()?,
        ))
    }

    /// Remove every record.
    fn clear_all_data(&self) -> BrainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_has_prefix_and_is_unique() {
        let a = generate_id(IDEA_PREFIX);
        let b = generate_id(IDEA_PREFIX);
        assert!(a.starts_with("idea_"));
        assert_ne!(a, b);
    }
}
