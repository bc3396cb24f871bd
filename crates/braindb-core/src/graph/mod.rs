//! Typed links between ideas.
//!
//! The linker is the only writer of edges and keeps each idea's `linked`
//! flag in step with the edge set: after any insert or delete touching an
//! idea, the flag is recomputed from the store.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BrainError, BrainResult, LinkError};
use crate::traits::IdeaStore;
use crate::types::{normalize_text, Edge, EdgeDraft, Idea, IdeaLink, LinkDirection, LinkType};

/// Graph linker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Removing one edge of a symmetric pair also removes its mirror.
    /// Default: true
    pub cascade_symmetric_removal: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            cascade_symmetric_removal: true,
        }
    }
}

/// Creates, removes and resolves links over a shared store.
#[derive(Clone)]
pub struct GraphLinker {
    store: Arc<dyn IdeaStore>,
    config: GraphConfig,
}

impl GraphLinker {
    pub fn new(store: Arc<dyn IdeaStore>, config: GraphConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Link two ideas by type name.
    ///
    /// Re-adding an existing (from, to, type) triple returns the existing
    /// edge. Symmetric types also get a mirrored edge.
    pub fn add_link(&self, from_id: &str, to_id: &str, link_type: &str) -> BrainResult<Edge> {
        let link_type = LinkType::from_str(link_type).map_err(|_| {
            warn!(link_type, expected = ?LinkType::all_names(), "Invalid link type");
            LinkError::InvalidType(link_type.to_string())
        })?;
        self.link(from_id, to_id, link_type)
    }

    /// Link two ideas with an already-parsed type.
    pub fn link(&self, from_id: &str, to_id: &str, link_type: LinkType) -> BrainResult<Edge> {
        if from_id == to_id {
            warn!(idea_id = from_id, "Cannot link idea to itself");
            return Err(LinkError::SelfLink(from_id.to_string()).into());
        }

        let edge = match self.store.save_edge(EdgeDraft::new(from_id, to_id, link_type))? {
            Some(edge) => edge,
            None => {
                debug!(from = from_id, to = to_id, %link_type, "Link already exists");
                return self
                    .find_edge(from_id, to_id, link_type)?
                    .ok_or_else(|| BrainError::internal("duplicate edge vanished during lookup"));
            }
        };

        if link_type.is_symmetric() {
            self.store.save_edge(edge.mirror_draft())?;
        }

        self.refresh_link_status(from_id)?;
        self.refresh_link_status(to_id)?;

        info!(from = from_id, to = to_id, %link_type, edge_id = %edge.id, "Link created");
        Ok(edge)
    }

    /// Delete an edge by id. Returns false if it does not exist.
    pub fn remove_link(&self, edge_id: &str) -> BrainResult<bool> {
        let edges = self.store.get_edges()?;
        let Some(edge) = edges.iter().find(|e| e.id == edge_id).cloned() else {
            return Ok(false);
        };

        if !self.store.delete_edge(edge_id)? {
            return Ok(false);
        }

        if self.config.cascade_symmetric_removal && edge.link_type.is_symmetric() {
            for mirror in edges
                .iter()
                .filter(|e| e.matches(&edge.to, &edge.from, edge.link_type))
            {
                self.store.delete_edge(&mirror.id)?;
                debug!(edge_id = %mirror.id, "Removed mirror edge");
            }
        }

        self.refresh_link_status(&edge.from)?;
        self.refresh_link_status(&edge.to)?;

        debug!(edge_id, "Link removed");
        Ok(true)
    }

    /// Every edge touching an idea, outgoing first, with the idea at the
    /// other end resolved. Edges whose other end is missing are skipped.
    pub fn get_links_for(&self, idea_id: &str) -> BrainResult<Vec<IdeaLink>> {
        let edges = self.store.get_edges()?;
        let ideas: HashMap<String, Idea> = self
            .store
            .get_ideas()?
            .into_iter()
            .map(|i| (i.idea_id.clone(), i))
            .collect();

        let outgoing = edges
            .iter()
            .filter(|e| e.from == idea_id)
            .filter_map(|e| {
                ideas.get(&e.to).map(|target| IdeaLink {
                    edge: e.clone(),
                    direction: LinkDirection::Outgoing,
                    target: target.clone(),
                })
            });
        let incoming = edges
            .iter()
            .filter(|e| e.to == idea_id)
            .filter_map(|e| {
                ideas.get(&e.from).map(|target| IdeaLink {
                    edge: e.clone(),
                    direction: LinkDirection::Incoming,
                    target: target.clone(),
                })
            });

        Ok(outgoing.chain(incoming).collect())
    }

    /// Ids of every idea linked to `idea_id` in either direction.
    pub fn linked_idea_ids(&self, idea_id: &str) -> BrainResult<HashSet<String>> {
        Ok(self
            .get_links_for(idea_id)?
            .into_iter()
            .map(|l| l.target.idea_id)
            .collect())
    }

    /// Ideas whose normalized text equals the normalized `text`.
    pub fn find_duplicate_candidates(&self, text: &str) -> BrainResult<Vec<Idea>> {
        let normalized = normalize_text(text);
        Ok(self
            .store
            .get_ideas()?
            .into_iter()
            .filter(|i| i.normalized_text() == normalized)
            .collect())
    }

    /// Ideas with no links.
    pub fn get_orphans(&self) -> BrainResult<Vec<Idea>> {
        Ok(self
            .store
            .get_ideas()?
            .into_iter()
            .filter(|i| !i.linked)
            .collect())
    }

    /// Recompute an idea's `linked` flag from the edge set and persist it if
    /// it changed. Returns the current flag value.
    pub fn refresh_link_status(&self, idea_id: &str) -> BrainResult<bool> {
        let has_links = self.store.get_edges()?.iter().any(|e| e.touches(idea_id));

        if let Some(mut idea) = self.store.get_idea(idea_id)? {
            if idea.linked != has_links {
                idea.linked = has_links;
                self.store.save_idea(idea)?;
                debug!(idea_id, linked = has_links, "Link status updated");
            }
        }
        Ok(has_links)
    }

    fn find_edge(&self, from: &str, to: &str, link_type: LinkType) -> BrainResult<Option<Edge>> {
        Ok(self
            .store
            .get_edges()?
            .into_iter()
            .find(|e| e.matches(from, to, link_type)))
    }
}

impl std::fmt::Debug for GraphLinker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphLinker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
