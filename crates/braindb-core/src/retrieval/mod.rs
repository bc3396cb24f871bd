//! Keyword and graph-connectivity relevance ranking.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BrainResult;
use crate::graph::GraphLinker;
use crate::traits::IdeaStore;
use crate::types::{normalize_text, Idea};

/// Score weights used by [`RelevanceScorer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Awarded when the idea text contains the query. Default: 10
    pub substring_score: u32,
    /// Added on top when the idea text equals the query. Default: 5
    pub exact_match_bonus: u32,
    /// Awarded when the idea is linked to the active context. Default: 5
    pub context_bonus: u32,
    /// Awarded to already-matching ideas above the confidence threshold.
    /// Default: 1
    pub confidence_bonus: u32,
    /// Confidence must exceed this to earn the bonus. Default: 1
    pub confidence_threshold: u8,
    /// Fixed score for pinned ideas. Default: 999
    pub pin_score: u32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            substring_score: 10,
            exact_match_bonus: 5,
            context_bonus: 5,
            confidence_bonus: 1,
            confidence_threshold: 1,
            pin_score: 999,
        }
    }
}

/// Ranks ideas against a query and an optional active context idea.
#[derive(Clone)]
pub struct RelevanceScorer {
    store: Arc<dyn IdeaStore>,
    graph: GraphLinker,
    config: RetrievalConfig,
}

impl RelevanceScorer {
    pub fn new(store: Arc<dyn IdeaStore>, graph: GraphLinker, config: RetrievalConfig) -> Self {
        Self {
            store,
            graph,
            config,
        }
    }

    /// Score one idea. `normalized_query` must already be lowercased and
    /// trimmed.
    pub fn score_idea(
        &self,
        idea: &Idea,
        normalized_query: &str,
        active_context_id: Option<&str>,
    ) -> BrainResult<u32> {
        let linked = match active_context_id {
            Some(id) if !id.is_empty() => Some(self.graph.linked_idea_ids(id)?),
            _ => None,
        };
        Ok(self.score_with(idea, normalized_query, linked.as_ref()))
    }

    fn score_with(
        &self,
        idea: &Idea,
        normalized_query: &str,
        context_links: Option<&HashSet<String>>,
    ) -> u32 {
        let mut score = 0;
        let text = idea.normalized_text();

        // An empty query is a substring of every text.
        if text.contains(normalized_query) {
            score += self.config.substring_score;
            if text == normalized_query {
                score += self.config.exact_match_bonus;
            }
        }

        if context_links.is_some_and(|ids| ids.contains(&idea.idea_id)) {
            score += self.config.context_bonus;
        }

        if score > 0 && idea.confidence > self.config.confidence_threshold {
            score += self.config.confidence_bonus;
        }

        score
    }

    /// Ideas relevant to `query`, best first.
    ///
    /// Excluded ideas never appear; pinned ideas always do, at the top.
    /// Equal scores keep store order.
    pub fn find_relevant(
        &self,
        query: &str,
        active_context_id: Option<&str>,
    ) -> BrainResult<Vec<Idea>> {
        let normalized_query = normalize_text(query);
        let active_context_id = active_context_id.filter(|id| !id.is_empty());
        if normalized_query.is_empty() && active_context_id.is_none() {
            return Ok(Vec::new());
        }

        let context = self.store.get_context()?;
        let context_links = match active_context_id {
            Some(id) => Some(self.graph.linked_idea_ids(id)?),
            None => None,
        };

        let mut scored: Vec<(Idea, u32)> = self
            .store
            .get_ideas()?
            .into_iter()
            .filter(|idea| !context.is_excluded(&idea.idea_id))
            .map(|idea| {
                let score = if context.is_pinned(&idea.idea_id) {
                    self.config.pin_score
                } else {
                    self.score_with(&idea, &normalized_query, context_links.as_ref())
                };
                (idea, score)
            })
            .filter(|(_, score)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        debug!(query = %normalized_query, results = scored.len(), "Relevance search");

        Ok(scored.into_iter().map(|(idea, _)| idea).collect())
    }

    /// Flip whether an idea is pinned. Returns the new membership.
    pub fn toggle_pin(&self, idea_id: &str) -> BrainResult<bool> {
        let mut context = self.store.get_context()?;
        let pinned = context.toggle_pin(idea_id);
        self.store.save_context(&context)?;
        debug!(idea_id, pinned, "Pin toggled");
        Ok(pinned)
    }

    /// Flip whether an idea is excluded. Returns the new membership.
    pub fn toggle_exclusion(&self, idea_id: &str) -> BrainResult<bool> {
        let mut context = self.store.get_context()?;
        let excluded = context.toggle_exclusion(idea_id);
        self.store.save_context(&context)?;
        debug!(idea_id, excluded, "Exclusion toggled");
        Ok(excluded)
    }
}

impl std::fmt::Debug for RelevanceScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelevanceScorer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
