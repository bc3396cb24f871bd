//! Recall strength tracking and review prompts.
//!
//! Strength is a four-step ladder (see [`StrengthStage`]). A successful
//! recall moves an idea one step up, a failed one moves it one step down.
//! Prompts are a random sample of ideas that have not reached the top step.

use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BrainResult;
use crate::graph::GraphLinker;
use crate::traits::IdeaStore;
use crate::types::{Idea, StrengthStage, MAX_STRENGTH};

/// Recall prompt settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    /// Prompts drawn when the caller does not ask for a count. Default: 3
    pub default_prompt_count: usize,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            default_prompt_count: 3,
        }
    }
}

/// Updates recall strength and picks ideas to review.
#[derive(Clone)]
pub struct RecallTracker {
    store: Arc<dyn IdeaStore>,
    graph: GraphLinker,
    config: RecallConfig,
}

impl RecallTracker {
    pub fn new(store: Arc<dyn IdeaStore>, graph: GraphLinker, config: RecallConfig) -> Self {
        Self {
            store,
            graph,
            config,
        }
    }

    pub fn config(&self) -> &RecallConfig {
        &self.config
    }

    /// Record a recall attempt. Returns the updated idea, or `None` if the
    /// idea does not exist.
    pub fn update_strength(&self, idea_id: &str, success: bool) -> BrainResult<Option<Idea>> {
        let Some(mut idea) = self.store.get_idea(idea_id)? else {
            return Ok(None);
        };

        idea.strength = if success {
            idea.strength.saturating_add(1).min(MAX_STRENGTH)
        } else {
            idea.strength.saturating_sub(1)
        };
        idea.last_recalled = Some(Utc::now());

        let saved = self.store.save_idea(idea)?;
        debug!(idea_id, success, strength = saved.strength, "Strength updated");
        Ok(Some(saved))
    }

    /// Up to `count` random ideas below full strength, preferring ideas
    /// linked to `context_id` when it has any.
    pub fn get_prompts(&self, count: usize, context_id: Option<&str>) -> BrainResult<Vec<Idea>> {
        let mut rng = rand::thread_rng();
        self.get_prompts_with_rng(&mut rng, count, context_id)
    }

    /// [`Self::get_prompts`] with a caller-supplied random source.
    pub fn get_prompts_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        context_id: Option<&str>,
    ) -> BrainResult<Vec<Idea>> {
        let mut candidates = self.store.get_ideas()?;

        if let Some(context_id) = context_id.filter(|id| !id.is_empty()) {
            let linked = self.graph.linked_idea_ids(context_id)?;
            let related: Vec<Idea> = candidates
                .iter()
                .filter(|i| linked.contains(&i.idea_id))
                .cloned()
                .collect();
            if !related.is_empty() {
                candidates = related;
            }
        }

        candidates.retain(|i| i.strength < MAX_STRENGTH);
        candidates.shuffle(rng);
        candidates.truncate(count);

        debug!(count = candidates.len(), "Recall prompts selected");
        Ok(candidates)
    }

    /// Stage label for an idea's current strength.
    pub fn check_health(&self, idea: &Idea) -> StrengthStage {
        idea.stage()
    }
}

impl std::fmt::Debug for RecallTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecallTracker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
