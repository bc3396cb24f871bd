//! Submission input validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::error::{BrainError, BrainResult, ErrorCode};

/// Control characters stripped from input. Tab, newline and carriage return
/// are kept.
static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").unwrap());

const EMPTY_INPUT_MESSAGE: &str = "Please enter some text before submitting.";

/// Input limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum accepted input length in characters. Default: 10000
    pub max_length: usize,
    /// Fraction of `max_length` above which the counter warns. Default: 0.9
    pub warning_ratio: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_length: 10_000,
            warning_ratio: 0.9,
        }
    }
}

/// Severity of a character count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CharCountLevel {
    Normal,
    Warning,
    Error,
}

/// Character counter state for a given input length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharCountStatus {
    pub level: CharCountLevel,
    pub message: String,
}

/// Sanitizes and checks submitted text.
#[derive(Debug, Clone, Default)]
pub struct InputValidator {
    config: ValidationConfig,
}

impl InputValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Strip control characters and check emptiness and length. Returns the
    /// trimmed, sanitized text.
    pub fn validate(&self, text: &str) -> BrainResult<String> {
        let sanitized = CONTROL_CHARS.replace_all(text, "");
        let removed = text.chars().count() - sanitized.chars().count();
        if removed > 0 {
            debug!(removed, "Sanitized control characters");
        }

        if sanitized.trim().is_empty() {
            return Err(BrainError::validation_with_suggestion(
                EMPTY_INPUT_MESSAGE,
                ErrorCode::ValEmptyInput,
                "Type or paste the text you want to break into ideas",
            ));
        }

        let length = sanitized.chars().count();
        if length > self.config.max_length {
            return Err(BrainError::validation_with_suggestion(
                format!(
                    "Input exceeds maximum length of {} characters. Please submit smaller portions.",
                    group_thousands(self.config.max_length)
                ),
                ErrorCode::ValTooLong,
                "Split the text and submit each part separately",
            ));
        }

        debug!(length, "Input valid");
        Ok(sanitized.trim().to_string())
    }

    /// Counter state for an input of `count` characters.
    pub fn char_count_status(&self, count: usize) -> CharCountStatus {
        let max = self.config.max_length;
        let base = format!("{} / {}", group_thousands(count), group_thousands(max));

        if count > max {
            CharCountStatus {
                level: CharCountLevel::Error,
                message: format!("{} (exceeded)", base),
            }
        } else if count as f64 > max as f64 * self.config.warning_ratio {
            CharCountStatus {
                level: CharCountLevel::Warning,
                message: base,
            }
        } else {
            CharCountStatus {
                level: CharCountLevel::Normal,
                message: base,
            }
        }
    }

    pub fn is_valid(&self, text: &str) -> bool {
        self.validate(text).is_ok()
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
