//! Raw input records and the retrieval context set.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form text as submitted, before chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl RawInput {
    /// Create an unprocessed raw input.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            timestamp: Utc::now(),
            processed: false,
            processed_at: None,
        }
    }

    /// Flag as processed at the given time.
    pub fn mark_processed(&mut self, at: DateTime<Utc>) {
        self.processed = true;
        self.processed_at = Some(at);
    }
}

/// Process-wide retrieval preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSet {
    /// Ideas always returned by retrieval.
    pub pins: BTreeSet<String>,
    /// Ideas never returned by retrieval.
    pub exclusions: BTreeSet<String>,
}

impl ContextSet {
    pub fn is_pinned(&self, idea_id: &str) -> bool {
        self.pins.contains(idea_id)
    }

    pub fn is_excluded(&self, idea_id: &str) -> bool {
        self.exclusions.contains(idea_id)
    }

    /// Flip pin membership, returning the new membership.
    pub fn toggle_pin(&mut self, idea_id: &str) -> bool {
        toggle(&mut self.pins, idea_id)
    }

    /// Flip exclusion membership, returning the new membership.
    pub fn toggle_exclusion(&mut self, idea_id: &str) -> bool {
        toggle(&mut self.exclusions, idea_id)
    }

    /// Drop any preference for an idea (used when it is deleted).
    pub fn forget(&mut self, idea_id: &str) -> bool {
        let pinned = self.pins.remove(idea_id);
        let excluded = self.exclusions.remove(idea_id);
        pinned || excluded
    }
}

fn toggle(set: &mut BTreeSet<String>, idea_id: &str) -> bool {
    if set.remove(idea_id) {
        false
    } else {
        set.insert(idea_id.to_string());
        true
    }
}
