//! The `Brain` facade wiring every component around one store.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::chunker::Chunker;
use crate::config::BrainConfig;
use crate::error::{BrainError, BrainResult};
use crate::graph::GraphLinker;
use crate::recall::RecallTracker;
use crate::retrieval::RelevanceScorer;
use crate::review::ReviewSession;
use crate::store::InMemoryStore;
use crate::traits::IdeaStore;
use crate::types::{Idea, MAX_CONFIDENCE};
use crate::validation::InputValidator;

/// Entry point for submitting text, reviewing chunks and working with the
/// resulting ideas.
///
/// ```
/// use braindb_core::{Brain, BrainConfig};
///
/// let brain = Brain::in_memory(BrainConfig::default());
/// let mut review = brain.submit("Water boils at 100C. Ice melts at 0C.").unwrap();
/// assert_eq!(review.chunks().len(), 2);
///
/// let ideas = brain.commit(&mut review).unwrap();
/// assert_eq!(ideas.len(), 2);
/// assert!(!review.is_active());
/// ```
pub struct Brain {
    config: BrainConfig,
    store: Arc<dyn IdeaStore>,
    chunker: Arc<Chunker>,
    validator: InputValidator,
    graph: GraphLinker,
    scorer: RelevanceScorer,
    recall: RecallTracker,
}

impl Brain {
    /// Build every component from `config` over `store`.
    pub fn new(config: BrainConfig, store: Arc<dyn IdeaStore>) -> Self {
        let chunker = Arc::new(Chunker::new(config.chunker.clone()));
        let validator = InputValidator::new(config.validation.clone());
        let graph = GraphLinker::new(store.clone(), config.graph.clone());
        let scorer = RelevanceScorer::new(store.clone(), graph.clone(), config.retrieval.clone());
        let recall = RecallTracker::new(store.clone(), graph.clone(), config.recall.clone());

        Self {
            config,
            store,
            chunker,
            validator,
            graph,
            scorer,
            recall,
        }
    }

    /// A brain backed by a fresh [`InMemoryStore`].
    pub fn in_memory(config: BrainConfig) -> Self {
        Self::new(config, Arc::new(InMemoryStore::new()))
    }

    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn IdeaStore> {
        &self.store
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    pub fn validator(&self) -> &InputValidator {
        &self.validator
    }

    pub fn graph(&self) -> &GraphLinker {
        &self.graph
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    pub fn recall(&self) -> &RecallTracker {
        &self.recall
    }

    /// An empty review session sharing this brain's chunker.
    pub fn new_session(&self) -> ReviewSession {
        ReviewSession::new(self.chunker.clone())
    }

    /// Validate and store `text`, chunk it, and open a review over the
    /// chunks.
    pub fn submit(&self, text: &str) -> BrainResult<ReviewSession> {
        let sanitized = self.validator.validate(text)?;
        let raw = self.store.save_raw_input(&sanitized)?;
        let result = self.chunker.chunk(&raw.text, &raw.id);
        info!(
            raw_input_id = %raw.id,
            chunks = result.len(),
            issues = result.issues.len(),
            "Input submitted"
        );

        let mut session = self.new_session();
        session.init(raw, result);
        Ok(session)
    }

    /// Commit a review session into this brain's store.
    pub fn commit(&self, session: &mut ReviewSession) -> BrainResult<Vec<Idea>> {
        session.commit(self.store.as_ref())
    }

    /// Delete an idea, its edges and any pin or exclusion on it, then
    /// recompute `linked` for its former neighbours.
    pub fn delete_idea(&self, idea_id: &str) -> BrainResult<bool> {
        let neighbours: BTreeSet<String> = self
            .store
            .get_edges()?
            .into_iter()
            .filter(|e| e.touches(idea_id))
            .map(|e| if e.from == idea_id { e.to } else { e.from })
            .filter(|id| id != idea_id)
            .collect();

        if !self.store.delete_idea(idea_id)? {
            return Ok(false);
        }

        let mut context = self.store.get_context()?;
        if context.forget(idea_id) {
            self.store.save_context(&context)?;
        }

        for neighbour in &neighbours {
            self.graph.refresh_link_status(neighbour)?;
        }

        info!(idea_id, neighbours = neighbours.len(), "Idea deleted");
        Ok(true)
    }

    /// Set an idea's confidence, clamped to 0..=3.
    pub fn set_confidence(&self, idea_id: &str, level: u8) -> BrainResult<Idea> {
        let mut idea = self
            .store
            .get_idea(idea_id)?
            .ok_or_else(|| BrainError::idea_not_found(idea_id))?;
        idea.confidence = level.min(MAX_CONFIDENCE);
        let saved = self.store.save_idea(idea)?;
        debug!(idea_id, confidence = saved.confidence, "Confidence set");
        Ok(saved)
    }

    /// Up to the configured number of recall prompts.
    pub fn prompts(&self, context_id: Option<&str>) -> BrainResult<Vec<Idea>> {
        self.recall
            .get_prompts(self.config.recall.default_prompt_count, context_id)
    }

    /// Pretty JSON export of the whole store.
    pub fn export_json(&self) -> BrainResult<String> {
        Ok(self.store.export_data()?.to_json_pretty()?)
    }

    /// Remove every record from the store.
    pub fn clear_all_data(&self) -> BrainResult<()> {
        self.store.clear_all_data()?;
        info!("Brain cleared");
        Ok(())
    }
}

impl std::fmt::Debug for Brain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Brain")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, ReviewError};

    fn brain() -> Brain {
        Brain::in_memory(BrainConfig::default())
    }

    #[test]
    fn test_submit_opens_review() {
        let brain = brain();
        let session = brain.submit("  Heat rises.\x07 Cold sinks.  ").unwrap();
        assert!(session.is_active());
        assert_eq!(session.chunks().len(), 2);

        let raw = session.raw_input().unwrap();
        assert_eq!(raw.text, "Heat rises. Cold sinks.");
        assert_eq!(brain.store().get_unprocessed_inputs().unwrap().len(), 1);
    }

    #[test]
    fn test_submit_rejects_invalid_input() {
        let brain = brain();
        let err = brain.submit("   ").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValEmptyInput);
        assert!(brain.store().get_raw_inputs().unwrap().is_empty());
    }

    #[test]
    fn test_commit_through_facade() {
        let brain = brain();
        let mut session = brain.submit("Heat rises. Cold sinks.").unwrap();
        let ideas = brain.commit(&mut session).unwrap();
        assert_eq!(ideas.len(), 2);
        assert!(brain.store().get_unprocessed_inputs().unwrap().is_empty());

        let err = brain.commit(&mut session).unwrap_err();
        assert!(matches!(err, BrainError::Review(ReviewError::Inactive)));
    }

    #[test]
    fn test_delete_idea_refreshes_neighbours() {
        let brain = brain();
        for id in ["a", "b", "c"] {
            brain.store().save_idea(Idea::new(id, "Idea.")).unwrap();
        }
        brain.graph().add_link("a", "b", "supports").unwrap();
        brain.graph().add_link("c", "b", "refines").unwrap();
        brain.scorer().toggle_pin("a").unwrap();

        assert!(brain.delete_idea("a").unwrap());
        assert!(brain.store().get_idea("a").unwrap().is_none());
        assert_eq!(brain.store().get_edges().unwrap().len(), 1);
        assert!(brain.store().get_idea("b").unwrap().unwrap().linked);
        assert!(!brain.store().get_context().unwrap().is_pinned("a"));

        assert!(brain.delete_idea("c").unwrap());
        assert!(!brain.store().get_idea("b").unwrap().unwrap().linked);
        assert!(!brain.delete_idea("c").unwrap());
    }

    #[test]
    fn test_set_confidence_clamps() {
        let brain = brain();
        brain.store().save_idea(Idea::new("a", "Idea.")).unwrap();
        assert_eq!(brain.set_confidence("a", 9).unwrap().confidence, 3);
        assert_eq!(brain.set_confidence("a", 2).unwrap().confidence, 2);

        let err = brain.set_confidence("ghost", 1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::IdeaNotFound);
    }

    #[test]
    fn test_export_and_clear() {
        let brain = brain();
        let mut session = brain.submit("Heat rises.").unwrap();
        brain.commit(&mut session).unwrap();

        let json = brain.export_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.4");
        assert_eq!(value["ideas"].as_array().unwrap().len(), 1);
        assert_eq!(value["raw_inputs"][0]["processed"], true);

        brain.clear_all_data().unwrap();
        assert!(brain.store().get_ideas().unwrap().is_empty());
    }

    #[test]
    fn test_prompts_use_configured_count() {
        let brain = brain();
        for i in 0..5 {
            brain
                .store()
                .save_idea(Idea::new(format!("i{}", i), "Idea."))
                .unwrap();
        }
        assert_eq!(brain.prompts(None).unwrap().len(), 3);
    }
}
