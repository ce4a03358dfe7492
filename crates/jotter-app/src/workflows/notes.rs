//! Notes workflow
//!
//! Positions arrive from frontends as signed integers and are checked
//! against the current view before anything reaches the store.

use crate::compose::NoteDraft;
use crate::edit::{DraftField, EditSession};
use crate::sync::{resolve_index, NoteView};
use crate::AppCore;
use jotter_core::{Note, Result};
use std::sync::Arc;
use tracing::debug;

/// Re-fetch the note list
///
/// **What it does**: Replaces the local view with the remote sequence
/// **Returns**: The new view
///
/// An open edit whose target fell off the end of the list is cancelled.
pub async fn refresh(app: &AppCore) -> Result<Arc<NoteView>> {
    let view = app.notes().refresh().await?;
    app.edit().lock().await.invalidate_if_beyond(view.len());
    Ok(view)
}

/// Notes in the local view
pub fn notes(app: &AppCore) -> Vec<Note> {
    app.notes().notes()
}

/// Add a note
///
/// **What it does**: Validates, appends remotely, then refreshes
/// **Returns**: The refreshed view
pub async fn add_note(app: &AppCore, title: &str, content: &str) -> Result<Arc<NoteView>> {
    app.notes().add(title, content).await
}

/// Change a field of the add-form draft
pub async fn update_compose(app: &AppCore, field: DraftField, value: impl Into<String>) {
    app.compose().lock().await.set(field, value);
}

/// Current add-form draft
pub async fn compose_draft(app: &AppCore) -> NoteDraft {
    app.compose().lock().await.clone()
}

/// Add the add-form draft as a note, clearing the draft on success
pub async fn submit_compose(app: &AppCore) -> Result<Arc<NoteView>> {
    let draft = app.compose().lock().await.clone();
    let view = app.notes().add(&draft.title, &draft.content).await?;

    let mut compose = app.compose().lock().await;
    if *compose == draft {
        compose.clear();
    }
    Ok(view)
}

/// Delete the note at `index`
///
/// **What it does**: Removes remotely, refreshes, and cancels an open edit
/// whose target was at or after `index`
/// **Returns**: The refreshed view
///
/// The edit is cancelled whenever the store was called, including when the
/// remove or the refresh after it failed: the store may already have
/// shifted the notes after `index`.
pub async fn delete_note(app: &AppCore, index: i64) -> Result<Arc<NoteView>> {
    let index = resolve_index(index, app.notes().len())?;
    let result = app.notes().delete(index).await;

    let reached_store = match &result {
        Ok(_) => true,
        Err(err) => err.is_remote(),
    };
    if reached_store {
        let mut edit = app.edit().lock().await;
        if edit.invalidate_after_delete(index) {
            debug!(index, "edit session cancelled by delete");
        }
        if let Ok(view) = &result {
            edit.invalidate_if_beyond(view.len());
        }
    }
    result
}

/// Open an edit of the note at `index`, replacing any open edit
pub async fn begin_edit(app: &AppCore, index: i64) -> Result<EditSession> {
    let index = resolve_index(index, app.notes().len())?;
    let mut edit = app.edit().lock().await;
    edit.begin(app.notes(), index)?;
    Ok(edit.clone())
}

/// Change a field of the open edit
pub async fn update_draft(
    app: &AppCore,
    field: DraftField,
    value: impl Into<String>,
) -> Result<()> {
    app.edit().lock().await.update_draft(field, value)
}

/// Commit the open edit
///
/// **What it does**: Replaces the note remotely, then refreshes
/// **Returns**: Ok once committed; on failure the edit stays open
pub async fn save_edit(app: &AppCore) -> Result<()> {
    let mut edit = app.edit().lock().await;
    edit.commit(app.notes()).await
}

/// Discard the open edit
pub async fn cancel_edit(app: &AppCore) {
    app.edit().lock().await.cancel();
}

/// Snapshot of the edit session
pub async fn edit_session(app: &AppCore) -> EditSession {
    app.edit().lock().await.clone()
}

/// Read one note straight from the store, bypassing the local view
pub async fn fetch_note(app: &AppCore, index: i64) -> Result<Option<Note>> {
    match usize::try_from(index) {
        Ok(index) => app.notes().fetch_remote(index).await,
        Err(_) => Ok(None),
    }
}
