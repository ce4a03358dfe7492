//! Authentication workflow

use crate::session::SessionState;
use crate::AppCore;
use jotter_core::{JotterError, Principal};
use tracing::debug;

/// Summary of the session for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// Current state
    pub state: SessionState,
    /// Authenticated principal
    pub principal: Option<Principal>,
    /// Notes in the local view
    pub note_count: usize,
    /// Whether a mutating note call is in flight
    pub pending: bool,
    /// Most recent login, restore or initial-refresh failure
    pub last_error: Option<JotterError>,
}

/// Restore an earlier login, if the identity provider still holds one
///
/// **What it does**: Re-reads the provider's identity and binds a store handle
/// **Returns**: The settled session state
///
/// Drafts made under a different principal are discarded.
pub async fn initialize(app: &AppCore) -> SessionState {
    let before = app.session().principal();
    let state = app.session().initialize().await;
    discard_stale_drafts(app, before).await;
    state
}

/// Run an interactive login
///
/// **What it does**: Suspends until the identity provider answers
/// **Returns**: `Authenticated` on success; `Unauthenticated` on cancel or
/// failure, with the reason available from [`status`]
pub async fn login(app: &AppCore) -> SessionState {
    let before = app.session().principal();
    let state = app.session().login().await;
    discard_stale_drafts(app, before).await;
    state
}

/// Log out and discard any open edit. Safe to call repeatedly.
pub async fn logout(app: &AppCore) -> SessionState {
    let state = app.session().logout().await;
    if state == SessionState::Unauthenticated {
        app.edit().lock().await.cancel();
        app.compose().lock().await.clear();
    }
    state
}

/// Drop the edit session and add-form draft if the principal they were made
/// under is gone. Otherwise only cancel an edit the view no longer covers.
async fn discard_stale_drafts(app: &AppCore, before: Option<Principal>) {
    let after = app.session().principal();
    let mut edit = app.edit().lock().await;
    if before.is_some() && before != after {
        debug!(
            from = ?before.as_ref().map(Principal::short),
            to = ?after.as_ref().map(Principal::short),
            "principal changed; discarding drafts"
        );
        edit.cancel();
        drop(edit);
        app.compose().lock().await.clear();
    } else {
        edit.invalidate_if_beyond(app.notes().len());
    }
}

/// Current session summary
pub fn status(app: &AppCore) -> SessionStatus {
    SessionStatus {
        state: app.session().state(),
        principal: app.session().principal(),
        note_count: app.notes().len(),
        pending: app.notes().is_pending(),
        last_error: app.session().last_error(),
    }
}
