//! Rule-based chunking engine.
//!
//! Splits free-form text into atomic idea drafts:
//! 1. Sentence split on `.`, `!` or `?` followed by whitespace
//! 2. Long sentences are split again on conjunctions
//! 3. Each chunk is classified against the ordered rule table
//! 4. Chunks that look too long or too fragmentary are flagged
//!
//! The chunker is a pure function of its input and configuration and never
//! fails; degenerate input simply produces fewer chunks.

mod patterns;

pub use patterns::FRAGMENT_OPENERS;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{ChunkIssue, ChunkResult, IdeaDraft, IdeaType, IssueKind};
use patterns::{COMPOUND_CONJUNCTION, SENTENCE_ENDING, TYPE_RULES};

/// Word-count thresholds for splitting and issue detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Sentences above this many words are split on conjunctions and flagged
    /// as under-chunked. Default: 30
    pub under_chunk_word_limit: usize,
    /// Chunks below this many words may be flagged as over-chunked.
    /// Default: 5
    pub over_chunk_word_limit: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            under_chunk_word_limit: 30,
            over_chunk_word_limit: 5,
        }
    }
}

/// Splits text into classified idea drafts.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a chunker with the given thresholds.
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// The active thresholds.
    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk `text` into drafts attributed to `source_id`.
    ///
    /// Draft ids are `{source_id}_chunk_{index}`, so the same input always
    /// produces the same output.
    pub fn chunk(&self, text: &str, source_id: &str) -> ChunkResult {
        let sentences = split_sentences(text);
        debug!(count = sentences.len(), "Found sentences");

        let pieces: Vec<&str> = sentences
            .into_iter()
            .flat_map(|sentence| self.split_compound(sentence))
            .collect();
        debug!(count = pieces.len(), "After compound splitting");

        let chunks: Vec<IdeaDraft> = pieces
            .into_iter()
            .enumerate()
            .map(|(index, piece)| {
                IdeaDraft::new(piece)
                    .with_id(format!("{}_chunk_{}", source_id, index))
                    .with_type(classify_type(piece))
                    .with_source(source_id)
            })
            .collect();

        let issues = self.detect_issues(&chunks);
        if !issues.is_empty() {
            debug!(count = issues.len(), "Detected potential issues");
        }

        ChunkResult { chunks, issues }
    }

    /// Classify a single piece of text.
    pub fn classify_type(&self, text: &str) -> IdeaType {
        classify_type(text)
    }

    /// Split a long sentence on conjunctions. Sentences at or below the
    /// under-chunk limit, or that do not yield at least two non-empty parts,
    /// come back whole.
    fn split_compound<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
        if count_words(sentence) <= self.config.under_chunk_word_limit {
            return vec![sentence];
        }

        let parts: Vec<&str> = COMPOUND_CONJUNCTION
            .split(sentence)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() >= 2 {
            parts
        } else {
            vec![sentence]
        }
    }

    /// Flag chunks that are probably several ideas, or a fragment of one.
    pub fn detect_issues(&self, chunks: &[IdeaDraft]) -> Vec<ChunkIssue> {
        chunks
            .iter()
            .enumerate()
            .filter_map(|(index, chunk)| self.issue_for(index, &chunk.idea_text))
            .collect()
    }

    /// The issue a chunk with this text would carry at this position.
    pub fn issue_for(&self, index: usize, text: &str) -> Option<ChunkIssue> {
        let word_count = count_words(text);

        if word_count > self.config.under_chunk_word_limit {
            return Some(ChunkIssue {
                kind: IssueKind::UnderChunk,
                chunk_index: index,
                message: format!(
                    "Idea {} may contain multiple concepts ({} words). Consider splitting it.",
                    index + 1,
                    word_count
                ),
                word_count,
            });
        }

        if word_count < self.config.over_chunk_word_limit && looks_like_fragment(text, word_count) {
            return Some(ChunkIssue {
                kind: IssueKind::OverChunk,
                chunk_index: index,
                message: format!(
                    "Idea {} may be incomplete ({} words). Consider merging with another idea.",
                    index + 1,
                    word_count
                ),
                word_count,
            });
        }

        None
    }
}

/// Classify text against the ordered rule table, defaulting to `Fact`.
pub fn classify_type(text: &str) -> IdeaType {
    TYPE_RULES
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(text)))
        .map(|(idea_type, _)| *idea_type)
        .unwrap_or(IdeaType::Fact)
}

/// Number of whitespace-separated tokens.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split on sentence terminators followed by whitespace, keeping the
/// terminator with its sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_ENDING.find_iter(text) {
        // Terminators are single-byte ASCII.
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn looks_like_fragment(text: &str, word_count: usize) -> bool {
    let lower = text.to_lowercase();
    let opens_with_fragment = FRAGMENT_OPENERS.iter().any(|f| lower.starts_with(f));
    let unterminated = !lower.ends_with(&['.', '!', '?'][..]);
    opens_with_fragment || (unterminated && word_count < 3)
}
