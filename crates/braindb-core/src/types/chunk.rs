//! Chunker output types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use super::idea::IdeaDraft;

/// Kind of segmentation problem flagged on a chunk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// Chunk is long enough that it probably holds several ideas.
    UnderChunk,
    /// Chunk looks like a fragment of a neighbouring idea.
    OverChunk,
}

/// A quality issue attached to one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// 0-based position of the chunk in the chunker output.
    pub chunk_index: usize,
    pub message: String,
    pub word_count: usize,
}

/// Chunker output: ordered drafts plus detected issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub chunks: Vec<IdeaDraft>,
    pub issues: Vec<ChunkIssue>,
}

impl ChunkResult {
    /// The first issue recorded for a chunk position, if any.
    pub fn issue_for(&self, index: usize) -> Option<&ChunkIssue> {
        self.issues.iter().find(|i| i.chunk_index == index)
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}
