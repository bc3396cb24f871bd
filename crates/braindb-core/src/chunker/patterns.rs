//! Ordered classification and splitting rules.
//!
//! Classification walks [`TYPE_RULES`] top to bottom and the first category
//! with any matching pattern wins. The order of the table decides ties, so
//! entries must not be reordered.
//!
//! `\b` is Unicode-aware: accented letters such as `é` are word characters,
//! so a keyword glued to one (`touchésince`) does not match.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::IdeaType;

/// Ordered (category, patterns) rule table.
pub static TYPE_RULES: Lazy<Vec<(IdeaType, Vec<Regex>)>> = Lazy::new(|| {
    vec![
        (
            IdeaType::Definition,
            vec![
                Regex::new(r"(?i)\bis\s+defined\s+as\b").unwrap(),
                Regex::new(r"(?i)\bmeans\s+that\b").unwrap(),
                Regex::new(r"(?i)\brefers\s+to\b").unwrap(),
                Regex::new(r"(?i)\bis\s+a\s+type\s+of\b").unwrap(),
                Regex::new(r"(?i)\bis\s+the\s+(?:process|act|state)\s+of\b").unwrap(),
                // "X is a ..."
                Regex::new(r"(?i)^[A-Z][a-z]+\s+is\s+a\b").unwrap(),
                // "X are ..."
                Regex::new(r"(?i)^[A-Z][a-z]+\s+are\s+").unwrap(),
            ],
        ),
        (
            IdeaType::Cause,
            vec![
                Regex::new(r"(?i)\bbecause\b").unwrap(),
                Regex::new(r"(?i)\bcauses?\b").unwrap(),
                Regex::new(r"(?i)\bleads?\s+to\b").unwrap(),
                Regex::new(r"(?i)\bresults?\s+in\b").unwrap(),
                Regex::new(r"(?i)\bdue\s+to\b").unwrap(),
                Regex::new(r"(?i)\bas\s+a\s+result\b").unwrap(),
                Regex::new(r"(?i)\btherefore\b").unwrap(),
                Regex::new(r"(?i)\bconsequently\b").unwrap(),
                Regex::new(r"(?i)\bsince\b").unwrap(),
            ],
        ),
        (
            IdeaType::Example,
            vec![
                Regex::new(r"(?i)\bfor\s+example\b").unwrap(),
                Regex::new(r"(?i)\bsuch\s+as\b").unwrap(),
                Regex::new(r"(?i)\be\.g\.\b").unwrap(),
                Regex::new(r"(?i)\bfor\s+instance\b").unwrap(),
                Regex::new(r"(?i)\blike\s+when\b").unwrap(),
                Regex::new(r"(?i)\bis\s+an\s+example\s+of\b").unwrap(),
            ],
        ),
        (
            IdeaType::Procedure,
            vec![
                Regex::new(r"(?i)\bto\s+do\s+this\b").unwrap(),
                Regex::new(r"(?i)\bsteps?\s*:").unwrap(),
                Regex::new(r"(?i)\bfirst\s*,?\s*(?:you|we)?\s*(?:need|should|must|have)\b").unwrap(),
                Regex::new(r"(?i)\bhow\s+to\b").unwrap(),
                Regex::new(r"(?i)\bin\s+order\s+to\b").unwrap(),
                // Numbered steps
                Regex::new(r"^\d+\.\s+").unwrap(),
                Regex::new(r"(?i)^step\s+\d+").unwrap(),
            ],
        ),
        (
            IdeaType::Question,
            vec![
                Regex::new(r"\?$").unwrap(),
                Regex::new(
                    r"(?i)^(?:what|why|how|when|where|who|which|can|could|would|should|is|are|do|does)\s+",
                )
                .unwrap(),
            ],
        ),
    ]
});

/// Sentence terminator followed by whitespace.
pub static SENTENCE_ENDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Conjunctions a long sentence may be split on. The conjunction itself is
/// dropped.
pub static COMPOUND_CONJUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:and|but|however|although|whereas|while)\s+").unwrap()
});

/// Openers that mark a short chunk as a fragment of its neighbour.
pub const FRAGMENT_OPENERS: &[&str] = &["because", "for example", "such as", "however", "therefore"];
