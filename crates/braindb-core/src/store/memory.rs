//! In-process idea store.
//!
//! Keeps every collection in insertion-ordered vectors behind a single mutex.
//! Suitable for tests and for embedding applications that handle persistence
//! themselves via [`IdeaStore::export_data`].

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{BrainError, BrainResult};
use crate::traits::{generate_id, IdeaStore, EDGE_PREFIX, IDEA_PREFIX, RAW_INPUT_PREFIX};
use crate::types::{ContextSet, Edge, EdgeDraft, ExportSnapshot, Idea, IdeaDraft, RawInput};

#[derive(Debug, Default)]
struct MemoryState {
    raw_inputs: Vec<RawInput>,
    ideas: Vec<Idea>,
    edges: Vec<Edge>,
    context: ContextSet,
}

/// Mutex-guarded in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from an export snapshot.
    pub fn from_snapshot(snapshot: ExportSnapshot) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                raw_inputs: snapshot.raw_inputs,
                ideas: snapshot.ideas,
                edges: snapshot.edges,
                context: snapshot.context,
            }),
        }
    }

    fn lock(&self) -> BrainResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| BrainError::internal(e.to_string()))
    }
}

impl IdeaStore for InMemoryStore {
    fn save_raw_input(&self, text: &str) -> BrainResult<RawInput> {
        let raw = RawInput::new(generate_id(RAW_INPUT_PREFIX), text);
        self.lock()?.raw_inputs.push(raw.clone());
        debug!(id = %raw.id, "Raw input saved");
        Ok(raw)
    }

    fn get_raw_inputs(&self) -> BrainResult<Vec<RawInput>> {
        Ok(self.lock()?.raw_inputs.clone())
    }

    fn mark_processed(&self, id: &str) -> BrainResult<bool> {
        let mut state = self.lock()?;
        match state.raw_inputs.iter_mut().find(|r| r.id == id) {
            Some(raw) => {
                raw.mark_processed(Utc::now());
                debug!(id, "Marked processed");
                Ok(true)
            }
            None => {
                warn!(id, "Raw input not found");
                Ok(false)
            }
        }
    }

    fn delete_raw_input(&self, id: &str) -> BrainResult<bool> {
        let mut state = self.lock()?;
        let before = state.raw_inputs.len();
        state.raw_inputs.retain(|r| r.id != id);
        Ok(state.raw_inputs.len() != before)
    }

    fn get_ideas(&self) -> BrainResult<Vec<Idea>> {
        Ok(self.lock()?.ideas.clone())
    }

    fn get_idea(&self, id: &str) -> BrainResult<Option<Idea>> {
        Ok(self.lock()?.ideas.iter().find(|i| i.idea_id == id).cloned())
    }

    fn save_idea(&self, mut idea: Idea) -> BrainResult<Idea> {
        let mut state = self.lock()?;
        if let Some(existing) = state.ideas.iter_mut().find(|i| i.idea_id == idea.idea_id) {
            idea.created_at = existing.created_at;
            idea.updated_at = Some(Utc::now());
            *existing = idea.clone();
            debug!(idea_id = %idea.idea_id, "Idea updated");
        } else {
            state.ideas.push(idea.clone());
            debug!(idea_id = %idea.idea_id, "Idea saved");
        }
        Ok(idea)
    }

    fn save_ideas(&self, drafts: Vec<IdeaDraft>) -> BrainResult<Vec<Idea>> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let mut taken: HashSet<String> = state.ideas.iter().map(|i| i.idea_id.clone()).collect();

        let saved: Vec<Idea> = drafts
            .into_iter()
            .map(|draft| {
                let id = match &draft.idea_id {
                    Some(id) if !taken.contains(id) => id.clone(),
                    _ => generate_id(IDEA_PREFIX),
                };
                taken.insert(id.clone());
                draft.into_idea(id, now)
            })
            .collect();

        state.ideas.extend(saved.iter().cloned());
        debug!(count = saved.len(), "Saved ideas");
        Ok(saved)
    }

    fn delete_idea(&self, id: &str) -> BrainResult<bool> {
        let mut state = self.lock()?;
        let before = state.ideas.len();
        state.ideas.retain(|i| i.idea_id != id);
        if state.ideas.len() == before {
            warn!(id, "Idea not found");
            return Ok(false);
        }
        state.edges.retain(|e| !e.touches(id));
        Ok(true)
    }

    fn clear_all_ideas(&self) -> BrainResult<()> {
        let mut state = self.lock()?;
        state.ideas.clear();
        state.edges.clear();
        Ok(())
    }

    fn get_edges(&self) -> BrainResult<Vec<Edge>> {
        Ok(self.lock()?.edges.clone())
    }

    fn save_edge(&self, draft: EdgeDraft) -> BrainResult<Option<Edge>> {
        let mut state = self.lock()?;
        if state
            .edges
            .iter()
            .any(|e| e.matches(&draft.from, &draft.to, draft.link_type))
        {
            debug!("Edge already exists, skipping");
            return Ok(None);
        }

        let edge = draft.into_edge(generate_id(EDGE_PREFIX), Utc::now());
        state.edges.push(edge.clone());
        debug!(from = %edge.from, to = %edge.to, "Edge saved");
        Ok(Some(edge))
    }

    fn delete_edge(&self, id: &str) -> BrainResult<bool> {
        let mut state = self.lock()?;
        let before = state.edges.len();
        state.edges.retain(|e| e.id != id);
        Ok(state.edges.len() != before)
    }

    fn get_context(&self) -> BrainResult<ContextSet> {
        Ok(self.lock()?.context.clone())
    }

    fn save_context(&self, context: &ContextSet) -> BrainResult<()> {
        self.lock()?.context = context.clone();
        Ok(())
    }

    fn clear_all_data(&self) -> BrainResult<()> {
        *self.lock()? = MemoryState::default();
        info!("All data cleared");
        Ok(())
    }
}
