//! Versioned export snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::edge::Edge;
use super::idea::Idea;
use super::raw_input::{ContextSet, RawInput};

/// Export format version. Bump on any change to the serialized records.
pub const EXPORT_FORMAT_VERSION: &str = "1.4";

/// Complete JSON-serializable dump of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub exported_at: DateTime<Utc>,
    pub version: String,
    pub raw_inputs: Vec<RawInput>,
    pub ideas: Vec<Idea>,
    pub edges: Vec<Edge>,
    pub context: ContextSet,
}

impl ExportSnapshot {
    /// Build a snapshot stamped now with the current format version.
    pub fn new(
        raw_inputs: Vec<RawInput>,
        ideas: Vec<Idea>,
        edges: Vec<Edge>,
        context: ContextSet,
    ) -> Self {
        Self {
            exported_at: Utc::now(),
            version: EXPORT_FORMAT_VERSION.to_string(),
            raw_inputs,
            ideas,
            edges,
            context,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
