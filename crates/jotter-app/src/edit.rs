//! In-progress note edit
//!
//! Scratch state for editing one note: which position, and the draft title
//! and content. There is at most one per client; opening a new one discards
//! the old one.
//!
//! Because notes are addressed by position, the target index goes stale when
//! an earlier note is deleted. Callers cancel the session through
//! [`EditSession::invalidate_after_delete`] once a delete completes.

use crate::sync::NoteListSynchronizer;
use jotter_core::{JotterError, Result};
use tracing::debug;

/// Which draft field to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    /// Note title
    Title,
    /// Note body
    Content,
}

/// Edit in progress for a single note
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSession {
    target: Option<usize>,
    draft_title: String,
    draft_content: String,
}

impl EditSession {
    /// Create a closed session
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an edit of the note at `index`, snapshotting its current title and
    /// content. Replaces any session already open.
    pub fn begin(&mut self, notes: &NoteListSynchronizer, index: usize) -> Result<()> {
        let view = notes.view();
        let note = view.get(index).ok_or_else(|| {
            JotterError::precondition(format!(
                "cannot edit index {index}: view has {} notes",
                view.len()
            ))
        })?;

        if let Some(previous) = self.target {
            debug!(previous, index, "replacing open edit session");
        }
        self.target = Some(index);
        self.draft_title = note.title.clone();
        self.draft_content = note.content.clone();
        Ok(())
    }

    /// Change one draft field. Local only.
    pub fn update_draft(&mut self, field: DraftField, value: impl Into<String>) -> Result<()> {
        if self.target.is_none() {
            return Err(JotterError::precondition("no edit in progress"));
        }
        match field {
            DraftField::Title => self.draft_title = value.into(),
            DraftField::Content => self.draft_content = value.into(),
        }
        Ok(())
    }

    /// Commit the drafts through `notes`.
    ///
    /// Clears the session on success. On failure the session stays open so
    /// the edit can be retried or cancelled.
    pub async fn commit(&mut self, notes: &NoteListSynchronizer) -> Result<()> {
        let index = self
            .target
            .ok_or_else(|| JotterError::precondition("no edit in progress"))?;
        notes
            .edit(index, &self.draft_title, &self.draft_content)
            .await?;
        self.cancel();
        Ok(())
    }

    /// Discard the drafts
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Cancel the session if a delete at `deleted` shifted its target.
    ///
    /// Returns whether the session was cancelled.
    pub fn invalidate_after_delete(&mut self, deleted: usize) -> bool {
        match self.target {
            Some(target) if target >= deleted => {
                debug!(target, deleted, "edit target shifted by delete; cancelling");
                self.cancel();
                true
            }
            _ => false,
        }
    }

    /// Cancel the session if its target no longer exists in a view of `len`
    /// notes. Returns whether the session was cancelled.
    pub fn invalidate_if_beyond(&mut self, len: usize) -> bool {
        match self.target {
            Some(target) if target >= len => {
                debug!(target, len, "edit target no longer in view; cancelling");
                self.cancel();
                true
            }
            _ => false,
        }
    }

    /// Whether an edit is open
    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    /// Position being edited
    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// Draft title
    pub fn draft_title(&self) -> &str {
        &self.draft_title
    }

    /// Draft content
    pub fn draft_content(&self) -> &str {
        &self.draft_content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_on_empty_view_fails() {
        let notes = NoteListSynchronizer::new();
        let mut edit = EditSession::new();
        assert!(matches!(
            edit.begin(&notes, 0),
            Err(JotterError::Precondition { .. })
        ));
        assert!(!edit.is_open());
    }

    #[test]
    fn test_update_requires_open_session() {
        let mut edit = EditSession::new();
        assert!(edit.update_draft(DraftField::Title, "x").is_err());
    }

    #[test]
    fn test_invalidate_after_delete() {
        let mut edit = EditSession {
            target: Some(1),
            draft_title: "B".into(),
            draft_content: "b".into(),
        };
        assert!(!edit.invalidate_after_delete(2));
        assert!(edit.is_open());
        assert!(edit.invalidate_after_delete(1));
        assert_eq!(edit, EditSession::default());

        let mut earlier = EditSession {
            target: Some(1),
            ..EditSession::default()
        };
        assert!(earlier.invalidate_after_delete(0));
    }

    #[test]
    fn test_invalidate_if_beyond() {
        let mut edit = EditSession {
            target: Some(2),
            ..EditSession::default()
        };
        assert!(!edit.invalidate_if_beyond(3));
        assert!(edit.invalidate_if_beyond(2));
        assert!(!edit.is_open());
    }

    #[tokio::test]
    async fn test_commit_without_session_fails() {
        let notes = NoteListSynchronizer::new();
        let mut edit = EditSession::new();
        assert!(matches!(
            edit.commit(&notes).await,
            Err(JotterError::Precondition { .. })
        ));
    }
}
