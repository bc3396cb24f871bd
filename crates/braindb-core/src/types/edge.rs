//! Edge (link) types for the idea graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use super::idea::Idea;

/// Default weight for new edges.
pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Typed relation between two ideas.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Supports,
    Depends,
    Example,
    Contradicts,
    Refines,
    Duplicates,
}

impl LinkType {
    /// Whether the relation holds in both directions and gets a mirrored edge.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Self::Contradicts | Self::Duplicates)
    }

    /// All link type names as static strings.
    pub fn all_names() -> Vec<&'static str> {
        Self::iter().map(|t| t.into()).collect()
    }
}

/// A persisted directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier.
    pub id: String,
    /// Source idea id.
    pub from: String,
    /// Target idea id.
    pub to: String,
    /// Relation type.
    #[serde(rename = "type")]
    pub link_type: LinkType,
    /// Edge weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

fn default_weight() -> f64 {
    DEFAULT_EDGE_WEIGHT
}

impl Edge {
    /// Whether this edge has the given (from, to, type) triple.
    pub fn matches(&self, from: &str, to: &str, link_type: LinkType) -> bool {
        self.from == from && self.to == to && self.link_type == link_type
    }

    /// Whether either endpoint is the given idea.
    pub fn touches(&self, idea_id: &str) -> bool {
        self.from == idea_id || self.to == idea_id
    }

    /// The draft that would recreate the reverse of this edge.
    pub fn mirror_draft(&self) -> EdgeDraft {
        EdgeDraft::new(self.to.clone(), self.from.clone(), self.link_type).with_weight(self.weight)
    }
}

/// An edge that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDraft {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl EdgeDraft {
    /// Create a draft edge.
    pub fn new(from: impl Into<String>, to: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            link_type,
            weight: None,
        }
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Materialize into an edge with the given id and creation time.
    pub fn into_edge(self, id: String, created_at: DateTime<Utc>) -> Edge {
        Edge {
            id,
            from: self.from,
            to: self.to,
            link_type: self.link_type,
            weight: self.weight.unwrap_or(DEFAULT_EDGE_WEIGHT),
            created_at,
        }
    }
}

/// Direction of an edge relative to the idea it was looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Outgoing,
    Incoming,
}

/// An edge annotated with its direction and the resolved idea at the other end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaLink {
    #[serde(flatten)]
    pub edge: Edge,
    pub direction: LinkDirection,
    pub target: Idea,
}
