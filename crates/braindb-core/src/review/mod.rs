//! Review session over the chunks of one raw input.
//!
//! A session is either empty or active. [`ReviewSession::init`] makes it
//! active; [`ReviewSession::reset`], [`ReviewSession::cancel`] and a
//! successful [`ReviewSession::commit`] make it empty again. Every editing
//! operation requires an active session and leaves the session untouched
//! when it returns an error.
//!
//! Positions are kept contiguous (`0..n`) after every mutation, and issue
//! annotations are re-derived from the chunker so they always describe the
//! chunk text at its current position.
//!
//! Committing writes the ideas and then marks the raw input processed. If
//! the second write fails the saved ideas are held by the session, which
//! stays active and refuses edits; calling `commit` again only retries the
//! processed mark.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chunker::Chunker;
use crate::error::{BrainResult, ReviewError};
use crate::traits::IdeaStore;
use crate::types::{ChunkIssue, ChunkResult, Idea, IdeaDraft, IdeaType, RawInput};

/// A draft under review plus its transient review state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingChunk {
    pub draft: IdeaDraft,
    /// Current 0-based position in the session.
    pub position: usize,
    /// Segmentation issue attached to this chunk, if any.
    pub issue: Option<ChunkIssue>,
}

impl WorkingChunk {
    pub fn text(&self) -> &str {
        &self.draft.idea_text
    }

    pub fn idea_type(&self) -> IdeaType {
        self.draft.idea_type
    }
}

/// Single-writer editing session for one raw input's chunks.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    chunker: Arc<Chunker>,
    raw_input: Option<RawInput>,
    chunks: Vec<WorkingChunk>,
    selected: BTreeSet<usize>,
    saved: Option<Vec<Idea>>,
}

impl ReviewSession {
    /// Create an empty session that classifies edits with `chunker`.
    pub fn new(chunker: Arc<Chunker>) -> Self {
        Self {
            chunker,
            raw_input: None,
            chunks: Vec::new(),
            selected: BTreeSet::new(),
            saved: None,
        }
    }

    /// Start reviewing the chunker output for `raw_input`, attaching each
    /// chunk's pre-computed issue. Replaces any previous session state.
    pub fn init(&mut self, raw_input: RawInput, result: ChunkResult) -> &[WorkingChunk] {
        let issues: Vec<Option<ChunkIssue>> = (0..result.len())
            .map(|position| result.issue_for(position).cloned())
            .collect();
        self.chunks = result
            .chunks
            .into_iter()
            .zip(issues)
            .enumerate()
            .map(|(position, (draft, issue))| WorkingChunk {
                draft,
                position,
                issue,
            })
            .collect();
        self.raw_input = Some(raw_input);
        self.selected.clear();
        self.saved = None;

        debug!(count = self.chunks.len(), "Review initialized");
        &self.chunks
    }

    /// Whether a review is in progress.
    pub fn is_active(&self) -> bool {
        self.raw_input.is_some()
    }

    pub fn raw_input(&self) -> Option<&RawInput> {
        self.raw_input.as_ref()
    }

    pub fn chunks(&self) -> &[WorkingChunk] {
        &self.chunks
    }

    pub fn has_chunks(&self) -> bool {
        !self.chunks.is_empty()
    }

    /// Whether the ideas are already saved and only the processed mark is
    /// outstanding.
    pub fn is_commit_pending(&self) -> bool {
        self.saved.is_some()
    }

    /// Flip selection of a position. Returns the selection afterwards.
    pub fn toggle_selection(&mut self, position: usize) -> Result<Vec<usize>, ReviewError> {
        self.check_position(position)?;
        if !self.selected.remove(&position) {
            self.selected.insert(position);
        }
        Ok(self.selected_indices())
    }

    /// Selected positions in ascending order.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Replace a chunk's text with the trimmed `new_text` and reclassify it.
    pub fn edit_chunk(&mut self, position: usize, new_text: &str) -> Result<(), ReviewError> {
        self.check_position(position)?;
        let text = new_text.trim();
        if text.is_empty() {
            return reject(ReviewError::EmptyText);
        }

        let idea_type = self.chunker.classify_type(text);
        let chunk = &mut self.chunks[position];
        chunk.draft.idea_text = text.to_string();
        chunk.draft.idea_type = idea_type;
        self.renumber();

        debug!(position, "Edited chunk");
        Ok(())
    }

    /// Override a chunk's type. `new_type` must be one of the idea type names.
    pub fn change_type(&mut self, position: usize, new_type: &str) -> Result<(), ReviewError> {
        self.check_position(position)?;
        let idea_type = match IdeaType::from_str(new_type) {
            Ok(t) => t,
            Err(_) => {
                warn!(new_type, expected = ?IdeaType::all_names(), "Unknown idea type");
                return Err(ReviewError::UnknownType(new_type.to_string()));
            }
        };

        self.chunks[position].draft.idea_type = idea_type;
        debug!(position, %idea_type, "Changed chunk type");
        Ok(())
    }

    /// Remove a chunk. Clears the selection.
    pub fn delete_chunk(&mut self, position: usize) -> Result<(), ReviewError> {
        self.check_position(position)?;
        self.chunks.remove(position);
        self.renumber();
        self.selected.clear();

        debug!(position, "Deleted chunk");
        Ok(())
    }

    /// Split a chunk at a character offset into two trimmed halves. The
    /// second half is inserted right after the first with a fresh id.
    pub fn split_chunk(&mut self, position: usize, offset: usize) -> Result<(), ReviewError> {
        self.check_position(position)?;
        let text = &self.chunks[position].draft.idea_text;
        let len = text.chars().count();
        if offset == 0 || offset >= len {
            return reject(ReviewError::InvalidSplitPoint { offset, len });
        }

        let byte_offset = text
            .char_indices()
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let first = text[..byte_offset].trim().to_string();
        let second = text[byte_offset..].trim().to_string();
        if first.is_empty() || second.is_empty() {
            return reject(ReviewError::EmptySplit);
        }

        let source = self.chunks[position]
            .draft
            .source_raw_input_id
            .clone()
            .or_else(|| self.raw_input.as_ref().map(|r| r.id.clone()));
        let mut new_draft = IdeaDraft::new(second.clone())
            .with_type(self.chunker.classify_type(&second))
            .with_id(format!(
                "{}_chunk_{}",
                source.as_deref().unwrap_or_default(),
                Uuid::new_v4().simple()
            ));
        new_draft.source_raw_input_id = source;

        let chunk = &mut self.chunks[position];
        chunk.draft.idea_type = self.chunker.classify_type(&first);
        chunk.draft.idea_text = first;

        self.chunks.insert(
            position + 1,
            WorkingChunk {
                draft: new_draft,
                position: position + 1,
                issue: None,
            },
        );
        self.renumber();

        debug!(position, offset, "Split chunk");
        Ok(())
    }

    /// Merge every selected chunk into the lowest selected position, joining
    /// texts with a single space in position order. Clears the selection.
    pub fn merge_selected(&mut self) -> Result<(), ReviewError> {
        self.check_editable()?;
        let indices = self.selected_indices();
        if indices.len() < 2 {
            return reject(ReviewError::InsufficientSelection {
                selected: indices.len(),
            });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.chunks.len()) {
            return reject(ReviewError::InvalidPosition {
                position: bad,
                len: self.chunks.len(),
            });
        }

        let merged = indices
            .iter()
            .map(|&i| self.chunks[i].draft.idea_text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let first = indices[0];
        let chunk = &mut self.chunks[first];
        chunk.draft.idea_type = self.chunker.classify_type(&merged);
        chunk.draft.idea_text = merged;

        for &i in indices[1..].iter().rev() {
            self.chunks.remove(i);
        }
        self.renumber();
        self.selected.clear();

        debug!(count = indices.len(), "Merged chunks");
        Ok(())
    }

    /// Drafts ready for persistence, in position order.
    pub fn chunks_for_saving(&self) -> Vec<IdeaDraft> {
        self.chunks.iter().map(|c| c.draft.clone()).collect()
    }

    /// Persist the reviewed drafts, mark the raw input processed and end the
    /// session.
    ///
    /// If saving the drafts fails the session is unchanged. If marking the
    /// raw input fails the saved ideas are kept and the next call retries
    /// only the mark, so ideas are never written twice.
    pub fn commit(&mut self, store: &dyn IdeaStore) -> BrainResult<Vec<Idea>> {
        let raw_id = match &self.raw_input {
            Some(raw) => raw.id.clone(),
            None => return Err(rejected(ReviewError::Inactive).into()),
        };

        if self.saved.is_none() {
            if self.chunks.is_empty() {
                return Err(rejected(ReviewError::NothingToSave).into());
            }
            let saved = store.save_ideas(self.chunks_for_saving())?;
            debug!(count = saved.len(), "Review ideas saved");
            self.saved = Some(saved);
        }

        if !store.mark_processed(&raw_id)? {
            warn!(raw_input_id = %raw_id, "Raw input missing, ideas kept without a processed source");
        }

        let saved = self.saved.take().unwrap_or_default();
        info!(count = saved.len(), raw_input_id = %raw_id, "Review committed");

        self.reset();
        Ok(saved)
    }

    /// Discard the session without saving.
    pub fn cancel(&mut self) {
        if self.is_active() {
            debug!("Review cancelled");
        }
        self.reset();
    }

    /// Return to the empty state.
    pub fn reset(&mut self) {
        self.raw_input = None;
        self.chunks.clear();
        self.selected.clear();
        self.saved = None;
    }

    fn check_editable(&self) -> Result<(), ReviewError> {
        if !self.is_active() {
            return reject(ReviewError::Inactive);
        }
        if self.saved.is_some() {
            return reject(ReviewError::CommitPending);
        }
        Ok(())
    }

    fn check_position(&self, position: usize) -> Result<(), ReviewError> {
        self.check_editable()?;
        if position >= self.chunks.len() {
            return reject(ReviewError::InvalidPosition {
                position,
                len: self.chunks.len(),
            });
        }
        Ok(())
    }

    fn renumber(&mut self) {
        for (position, chunk) in self.chunks.iter_mut().enumerate() {
            chunk.position = position;
            chunk.issue = self.chunker.issue_for(position, &chunk.draft.idea_text);
        }
    }
}

fn rejected(err: ReviewError) -> ReviewError {
    warn!(%err, "Review edit rejected");
    err
}

fn reject<T>(err: ReviewError) -> Result<T, ReviewError> {
    Err(rejected(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::error::{BrainError, BrainResult};
    use crate::store::InMemoryStore;
    use crate::types::{ContextSet, Edge, EdgeDraft, IssueKind};

    /// In-memory store whose next `mark_processed` fails once.
    #[derive(Default)]
    struct FailingMarkStore {
        inner: InMemoryStore,
        fail_next_mark: AtomicBool,
    }

    impl IdeaStore for FailingMarkStore {
        fn save_raw_input(&self, text: &str) -> BrainResult<RawInput> {
            self.inner.save_raw_input(text)
        }
        fn get_raw_inputs(&self) -> BrainResult<Vec<RawInput>> {
            self.inner.get_raw_inputs()
        }
        fn mark_processed(&self, id: &str) -> BrainResult<bool> {
            if self.fail_next_mark.swap(false, Ordering::SeqCst) {
                return Err(BrainError::database("disk I/O error"));
            }
            self.inner.mark_processed(id)
        }
        fn delete_raw_input(&self, id: &str) -> BrainResult<bool> {
            self.inner.delete_raw_input(id)
        }
        fn get_ideas(&self) -> BrainResult<Vec<Idea>> {
            self.inner.get_ideas()
        }
        fn get_idea(&self, id: &str) -> BrainResult<Option<Idea>> {
            self.inner.get_idea(id)
        }
        fn save_idea(&self, idea: Idea) -> BrainResult<Idea> {
            self.inner.save_idea(idea)
        }
        fn save_ideas(&self, drafts: Vec<IdeaDraft>) -> BrainResult<Vec<Idea>> {
            self.inner.save_ideas(drafts)
        }
        fn delete_idea(&self, id: &str) -> BrainResult<bool> {
            self.inner.delete_idea(id)
        }
        fn clear_all_ideas(&self) -> BrainResult<()> {
            self.inner.clear_all_ideas()
        }
        fn get_edges(&self) -> BrainResult<Vec<Edge>> {
            self.inner.get_edges()
        }
        fn save_edge(&self, draft: EdgeDraft) -> BrainResult<Option<Edge>> {
            self.inner.save_edge(draft)
        }
        fn delete_edge(&self, id: &str) -> BrainResult<bool> {
            self.inner.delete_edge(id)
        }
        fn get_context(&self) -> BrainResult<ContextSet> {
            self.inner.get_context()
        }
        fn save_context(&self, context: &ContextSet) -> BrainResult<()> {
            self.inner.save_context(context)
        }
        fn clear_all_data(&self) -> BrainResult<()> {
            self.inner.clear_all_data()
        }
    }

    fn session_over(store: &dyn IdeaStore, text: &str) -> ReviewSession {
        let raw = store.save_raw_input(text).unwrap();
        let chunker = Arc::new(Chunker::default());
        let result = chunker.chunk(&raw.text, &raw.id);
        let mut session = ReviewSession::new(chunker);
        session.init(raw, result);
        session
    }

    fn session_for(text: &str) -> ReviewSession {
        let chunker = Arc::new(Chunker::default());
        let raw = RawInput::new("raw_1", text);
        let result = chunker.chunk(text, &raw.id);
        let mut session = ReviewSession::new(chunker);
        session.init(raw, result);
        session
    }

    fn texts(session: &ReviewSession) -> Vec<&str> {
        session.chunks().iter().map(|c| c.text()).collect()
    }

    fn positions(session: &ReviewSession) -> Vec<usize> {
        session.chunks().iter().map(|c| c.position).collect()
    }

    #[test]
    fn test_init_attaches_issues() {
        let session = session_for("Plants need light to grow well. Because of photosynthesis.");
        assert!(session.is_active());
        assert_eq!(session.chunks().len(), 2);
        assert!(session.chunks()[0].issue.is_none());
        assert_eq!(
            session.chunks()[1].issue.as_ref().map(|i| i.kind),
            Some(IssueKind::OverChunk)
        );
    }

    #[test]
    fn test_empty_session_rejects_edits() {
        let mut session = ReviewSession::new(Arc::new(Chunker::default()));
        assert!(!session.is_active());
        assert_eq!(session.edit_chunk(0, "x"), Err(ReviewError::Inactive));
        assert_eq!(session.merge_selected(), Err(ReviewError::Inactive));
        assert_eq!(session.toggle_selection(0), Err(ReviewError::Inactive));
    }

    #[test]
    fn test_toggle_selection_is_a_set() {
        let mut session = session_for("One idea here. Two ideas here. Three ideas here.");
        session.toggle_selection(2).unwrap();
        session.toggle_selection(0).unwrap();
        assert_eq!(session.selected_indices(), vec![0, 2]);
        assert_eq!(session.toggle_selection(2).unwrap(), vec![0]);
        assert_eq!(
            session.toggle_selection(7),
            Err(ReviewError::InvalidPosition { position: 7, len: 3 })
        );
        session.clear_selection();
        assert!(session.selected_indices().is_empty());
    }

    #[test]
    fn test_edit_chunk_trims_and_reclassifies() {
        let mut session = session_for("Water is wet.");
        session.edit_chunk(0, "  Why is water wet?  ").unwrap();
        assert_eq!(session.chunks()[0].text(), "Why is water wet?");
        assert_eq!(session.chunks()[0].idea_type(), IdeaType::Question);
    }

    #[test]
    fn test_edit_chunk_rejects_empty_and_out_of_range() {
        let mut session = session_for("Water is wet.");
        assert_eq!(session.edit_chunk(0, "   "), Err(ReviewError::EmptyText));
        assert_eq!(
            session.edit_chunk(3, "text"),
            Err(ReviewError::InvalidPosition { position: 3, len: 1 })
        );
        assert_eq!(session.chunks()[0].text(), "Water is wet.");
    }

    #[test]
    fn test_change_type() {
        let mut session = session_for("Water is wet.");
        session.change_type(0, "procedure").unwrap();
        assert_eq!(session.chunks()[0].idea_type(), IdeaType::Procedure);
        assert_eq!(
            session.change_type(0, "opinion"),
            Err(ReviewError::UnknownType("opinion".into()))
        );
        assert_eq!(session.chunks()[0].idea_type(), IdeaType::Procedure);
    }

    #[test]
    fn test_delete_chunk_renumbers_and_clears_selection() {
        let mut session = session_for("One idea here. Two ideas here. Three ideas here.");
        session.toggle_selection(0).unwrap();
        session.delete_chunk(1).unwrap();
        assert_eq!(texts(&session), vec!["One idea here.", "Three ideas here."]);
        assert_eq!(positions(&session), vec![0, 1]);
        assert!(session.selected_indices().is_empty());
    }

    #[test]
    fn test_split_chunk() {
        let mut session = session_for("Cats purr loudly when happy.");
        session.split_chunk(0, 9).unwrap();
        assert_eq!(texts(&session), vec!["Cats purr", "loudly when happy."]);
        assert_eq!(positions(&session), vec![0, 1]);

        let second = &session.chunks()[1].draft;
        assert_eq!(second.source_raw_input_id.as_deref(), Some("raw_1"));
        let id = second.idea_id.as_deref().unwrap();
        assert!(id.starts_with("raw_1_chunk_"));
        assert_ne!(id, "raw_1_chunk_1");
    }

    #[test]
    fn test_split_chunk_uses_character_offsets() {
        let mut session = session_for("Café au lait. Is nice.");
        session.split_chunk(0, 4).unwrap();
        assert_eq!(session.chunks()[0].text(), "Café");
        assert_eq!(session.chunks()[1].text(), "au lait.");
    }

    #[test]
    fn test_split_chunk_rejects_bad_offsets() {
        let mut session = session_for("Hi there.");
        assert_eq!(
            session.split_chunk(0, 0),
            Err(ReviewError::InvalidSplitPoint { offset: 0, len: 9 })
        );
        assert_eq!(
            session.split_chunk(0, 9),
            Err(ReviewError::InvalidSplitPoint { offset: 9, len: 9 })
        );
        assert_eq!(session.chunks().len(), 1);
    }

    #[test]
    fn test_split_rejects_whitespace_half() {
        let mut session = ReviewSession::new(Arc::new(Chunker::default()));
        session.init(
            RawInput::new("raw_1", "  A"),
            ChunkResult {
                chunks: vec![IdeaDraft::new("  A")],
                issues: Vec::new(),
            },
        );
        assert_eq!(session.split_chunk(0, 1), Err(ReviewError::EmptySplit));
        assert_eq!(session.chunks().len(), 1);
    }

    #[test]
    fn test_merge_selected() {
        let mut session = session_for("One idea here. Two ideas here. Three ideas here.");
        session.toggle_selection(2).unwrap();
        session.toggle_selection(0).unwrap();
        session.merge_selected().unwrap();
        assert_eq!(
            texts(&session),
            vec!["One idea here. Three ideas here.", "Two ideas here."]
        );
        assert_eq!(positions(&session), vec![0, 1]);
        assert!(session.selected_indices().is_empty());
    }

    #[test]
    fn test_merge_requires_two() {
        let mut session = session_for("One idea here. Two ideas here.");
        session.toggle_selection(0).unwrap();
        assert_eq!(
            session.merge_selected(),
            Err(ReviewError::InsufficientSelection { selected: 1 })
        );
        assert_eq!(session.chunks().len(), 2);
        assert_eq!(session.selected_indices(), vec![0]);
    }

    #[test]
    fn test_merge_recomputes_issue() {
        let mut session = session_for("Plants need light to grow well. Because of photosynthesis.");
        session.toggle_selection(0).unwrap();
        session.toggle_selection(1).unwrap();
        session.merge_selected().unwrap();
        assert_eq!(session.chunks().len(), 1);
        assert!(session.chunks()[0].issue.is_none());
    }

    #[test]
    fn test_chunks_for_saving() {
        let session = session_for("Heat rises. Cold sinks.");
        let drafts = session.chunks_for_saving();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].idea_id.as_deref(), Some("raw_1_chunk_0"));
        assert_eq!(drafts[1].idea_text, "Cold sinks.");
    }

    #[test]
    fn test_commit_saves_and_resets() {
        let store = InMemoryStore::new();
        let mut session = session_over(&store, "Heat rises. Cold sinks.");

        let saved = session.commit(&store).unwrap();
        assert_eq!(saved.len(), 2);
        assert!(!session.is_active());
        assert!(!session.has_chunks());
        assert!(store.get_unprocessed_inputs().unwrap().is_empty());
        assert_eq!(store.get_ideas().unwrap().len(), 2);
    }

    #[test]
    fn test_commit_refuses_empty_or_inactive() {
        let store = InMemoryStore::new();
        let mut session = session_for("Only one.");
        session.delete_chunk(0).unwrap();
        assert!(session.commit(&store).is_err());
        assert!(session.is_active());

        session.cancel();
        assert!(!session.is_active());
        assert!(session.commit(&store).is_err());
        assert!(store.get_ideas().unwrap().is_empty());
    }

    #[test]
    fn test_failed_mark_keeps_saved_ideas_for_retry() {
        let store = FailingMarkStore::default();
        let mut session = session_over(&store, "Heat rises. Cold sinks.");
        store.fail_next_mark.store(true, Ordering::SeqCst);

        let err = session.commit(&store).unwrap_err();
        assert!(err.is_store_failure());
        assert!(session.is_active());
        assert!(session.is_commit_pending());
        assert_eq!(session.chunks().len(), 2);
        assert_eq!(store.get_ideas().unwrap().len(), 2);
        assert_eq!(session.edit_chunk(0, "Heat falls."), Err(ReviewError::CommitPending));

        let saved = session.commit(&store).unwrap();
        assert_eq!(saved.len(), 2);
        assert!(!session.is_active());
        assert!(!session.is_commit_pending());
        assert_eq!(store.get_ideas().unwrap().len(), 2);
        assert!(store.get_unprocessed_inputs().unwrap().is_empty());
    }

    #[test]
    fn test_commit_with_missing_raw_input_still_saves() {
        let store = InMemoryStore::new();
        let mut session = session_over(&store, "Heat rises. Cold sinks.");
        let raw_id = session.raw_input().unwrap().id.clone();
        store.clear_all_data().unwrap();

        let saved = session.commit(&store).unwrap();
        assert_eq!(saved.len(), 2);
        assert!(!session.is_active());
        assert!(store.get_raw_inputs().unwrap().iter().all(|r| r.id != raw_id));
    }
}
