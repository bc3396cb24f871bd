//! Idea types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Highest confidence level (0=unknown, 1=low, 2=medium, 3=high).
pub const MAX_CONFIDENCE: u8 = 3;

/// Highest recall strength (Deep Rooted).
pub const MAX_STRENGTH: u8 = 3;

/// Semantic type of an idea.
///
/// Serializes to lowercase names, which are also the only accepted spellings
/// when parsing from user input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IdeaType {
    /// Plain statement; the fallback when nothing else matches.
    #[default]
    Fact,
    Definition,
    Cause,
    Example,
    Procedure,
    Question,
}

impl IdeaType {
    /// All idea type names as static strings.
    pub fn all_names() -> Vec<&'static str> {
        Self::iter().map(|t| t.into()).collect()
    }
}

/// Stage label for a recall strength level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
pub enum StrengthStage {
    #[strum(serialize = "New")]
    New,
    #[strum(serialize = "Sprouting")]
    Sprouting,
    #[strum(serialize = "Established")]
    Established,
    #[strum(serialize = "Deep Rooted")]
    DeepRooted,
}

impl StrengthStage {
    /// Map a strength level to its stage. Unknown levels read as `New`.
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => Self::Sprouting,
            2 => Self::Established,
            3 => Self::DeepRooted,
            _ => Self::New,
        }
    }

    /// Numeric level of this stage.
    pub fn level(&self) -> u8 {
        match self {
            Self::New => 0,
            Self::Sprouting => 1,
            Self::Established => 2,
            Self::DeepRooted => 3,
        }
    }

    /// Human-readable stage label.
    pub fn label(&self) -> &'static str {
        self.into()
    }
}

/// A persisted idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    /// Unique identifier.
    pub idea_id: String,
    /// The idea statement.
    pub idea_text: String,
    /// Semantic type.
    #[serde(default)]
    pub idea_type: IdeaType,
    /// Raw input this idea was extracted from.
    #[serde(default)]
    pub source_raw_input_id: Option<String>,
    /// Confidence level, 0..=3.
    #[serde(default)]
    pub confidence: u8,
    /// Recall strength, 0..=3.
    #[serde(default)]
    pub strength: u8,
    /// When the idea was last recalled.
    #[serde(default)]
    pub last_recalled: Option<DateTime<Utc>>,
    /// True iff at least one edge references this idea. Maintained by the
    /// graph linker.
    #[serde(default)]
    pub linked: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Idea {
    /// Create a new idea with default metadata.
    pub fn new(idea_id: impl Into<String>, idea_text: impl Into<String>) -> Self {
        Self {
            idea_id: idea_id.into(),
            idea_text: idea_text.into(),
            idea_type: IdeaType::Fact,
            source_raw_input_id: None,
            confidence: 0,
            strength: 0,
            last_recalled: None,
            linked: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Set the idea type.
    pub fn with_type(mut self, idea_type: IdeaType) -> Self {
        self.idea_type = idea_type;
        self
    }

    /// Set the source raw input.
    pub fn with_source(mut self, source_raw_input_id: impl Into<String>) -> Self {
        self.source_raw_input_id = Some(source_raw_input_id.into());
        self
    }

    /// Set the confidence level (clamped to 0..=3).
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.min(MAX_CONFIDENCE);
        self
    }

    /// Set the recall strength (clamped to 0..=3).
    pub fn with_strength(mut self, strength: u8) -> Self {
        self.strength = strength.min(MAX_STRENGTH);
        self
    }

    /// Current recall stage.
    pub fn stage(&self) -> StrengthStage {
        StrengthStage::from_level(self.strength)
    }

    /// Text folded for exact-duplicate comparison.
    pub fn normalized_text(&self) -> String {
        normalize_text(&self.idea_text)
    }
}

/// Lowercase and trim, the normalization used for duplicate detection and
/// query matching.
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// An idea that has not been persisted yet.
///
/// Chunks produced by the chunker and edited during review are drafts; the
/// store turns them into [`Idea`]s, generating ids where absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaDraft {
    /// Identifier, generated by the store if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_id: Option<String>,
    /// The idea statement.
    pub idea_text: String,
    /// Semantic type.
    #[serde(default)]
    pub idea_type: IdeaType,
    /// Raw input this draft was extracted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_raw_input_id: Option<String>,
    /// Confidence level, 0..=3.
    #[serde(default)]
    pub confidence: u8,
    /// Linked flag carried through to the saved idea.
    #[serde(default)]
    pub linked: bool,
}

impl IdeaDraft {
    /// Create a draft with the given text.
    pub fn new(idea_text: impl Into<String>) -> Self {
        Self {
            idea_id: None,
            idea_text: idea_text.into(),
            idea_type: IdeaType::Fact,
            source_raw_input_id: None,
            confidence: 0,
            linked: false,
        }
    }

    /// Set the id.
    pub fn with_id(mut self, idea_id: impl Into<String>) -> Self {
        self.idea_id = Some(idea_id.into());
        self
    }

    /// Set the idea type.
    pub fn with_type(mut self, idea_type: IdeaType) -> Self {
        self.idea_type = idea_type;
        self
    }

    /// Set the source raw input.
    pub fn with_source(mut self, source_raw_input_id: impl Into<String>) -> Self {
        self.source_raw_input_id = Some(source_raw_input_id.into());
        self
    }

    /// Set the confidence level (clamped to 0..=3).
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.min(MAX_CONFIDENCE);
        self
    }

    /// Materialize into a fresh idea with the given id and creation time.
    pub fn into_idea(self, idea_id: String, created_at: DateTime<Utc>) -> Idea {
        Idea {
            idea_id,
            idea_text: self.idea_text,
            idea_type: self.idea_type,
            source_raw_input_id: self.source_raw_input_id,
            confidence: self.confidence.min(MAX_CONFIDENCE),
            strength: 0,
            last_recalled: None,
            linked: self.linked,
            created_at,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_idea_type_display_and_parse() {
        assert_eq!(IdeaType::Definition.to_string(), "definition");
        assert_eq!(IdeaType::from_str("procedure").unwrap(), IdeaType::Procedure);
        assert!(IdeaType::from_str("opinion").is_err());
        assert!(IdeaType::from_str("Fact").is_err());
    }

    #[test]
    fn test_idea_type_all_names_in_order() {
        assert_eq!(
            IdeaType::all_names(),
            vec!["fact", "definition", "cause", "example", "procedure", "question"]
        );
    }

    #[test]
    fn test_strength_stage_labels() {
        assert_eq!(StrengthStage::from_level(0).label(), "New");
        assert_eq!(StrengthStage::from_level(1).label(), "Sprouting");
        assert_eq!(StrengthStage::from_level(2).label(), "Established");
        assert_eq!(StrengthStage::from_level(3).to_string(), "Deep Rooted");
        assert_eq!(StrengthStage::from_level(9), StrengthStage::New);
    }

    #[test]
    fn test_idea_builder_clamps() {
        let idea = Idea::new("idea_1", "Water boils at 100C.")
            .with_confidence(7)
            .with_strength(5);
        assert_eq!(idea.confidence, 3);
        assert_eq!(idea.strength, 3);
        assert_eq!(idea.stage(), StrengthStage::DeepRooted);
    }

    #[test]
    fn test_idea_serialization_uses_lowercase_type() {
        let idea = Idea::new("idea_1", "Why is the sky blue?").with_type(IdeaType::Question);
        let json = serde_json::to_string(&idea).unwrap();
        assert!(json.contains("\"idea_type\":\"question\""));
        assert!(!json.contains("updated_at"));

        let back: Idea = serde_json::from_str(&json).unwrap();
        assert_eq!(back, idea);
    }

    #[test]
    fn test_draft_into_idea_resets_recall_state() {
        let now = Utc::now();
        let idea = IdeaDraft::new("Heat rises.")
            .with_source("raw_1")
            .with_confidence(2)
            .into_idea("idea_9".to_string(), now);
        assert_eq!(idea.idea_id, "idea_9");
        assert_eq!(idea.strength, 0);
        assert_eq!(idea.confidence, 2);
        assert!(idea.last_recalled.is_none());
        assert_eq!(idea.created_at, now);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Hello World \n"), "hello world");
    }
}
