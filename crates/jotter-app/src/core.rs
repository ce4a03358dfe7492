//! # AppCore
//!
//! Owns one client's session, note view and edit session. Frontends hold an
//! `AppCore` and drive it through [`crate::workflows`]; there is no global
//! session.
//!
//! ```rust,ignore
//! let app = AppCore::new(config, effects)?;
//! workflows::auth::initialize(&app).await;
//! workflows::notes::add_note(&app, "Groceries", "Milk, eggs").await?;
//! ```

use crate::compose::NoteDraft;
use crate::connector::RemoteStoreConnector;
use crate::edit::EditSession;
use crate::identity_broker::IdentityBroker;
use crate::session::SessionController;
use crate::sync::NoteListSynchronizer;
use async_lock::Mutex;
use jotter_core::effects::{IdentityProviderEffects, PhysicalTimeEffects, StoreConnectEffects};
use jotter_core::{NetworkConfig, Result};
use std::fmt;
use std::sync::Arc;

/// Handlers for the client's external collaborators
#[derive(Clone)]
pub struct AppEffects {
    /// Interactive login and identity restore
    pub identity_provider: Arc<dyn IdentityProviderEffects>,
    /// Creates identity-bound store handles
    pub store_connector: Arc<dyn StoreConnectEffects>,
    /// Wall clock for identity expiry
    pub clock: Arc<dyn PhysicalTimeEffects>,
}

/// One client's state
pub struct AppCore {
    session: SessionController,
    notes: Arc<NoteListSynchronizer>,
    edit: Mutex<EditSession>,
    compose: Mutex<NoteDraft>,
}

impl AppCore {
    /// Wire up a client. Starts unauthenticated; call
    /// [`workflows::auth::initialize`](crate::workflows::auth::initialize)
    /// to restore an earlier login.
    pub fn new(config: NetworkConfig, effects: AppEffects) -> Result<Self> {
        config.validate()?;

        let broker = IdentityBroker::new(
            effects.identity_provider,
            effects.clock,
            config.authorize_url(),
        );
        let connector = RemoteStoreConnector::new(effects.store_connector);
        let notes = Arc::new(NoteListSynchronizer::new());
        let session = SessionController::new(config, broker, connector, Arc::clone(&notes));

        Ok(Self {
            session,
            notes,
            edit: Mutex::new(EditSession::new()),
            compose: Mutex::new(NoteDraft::new()),
        })
    }

    /// Session state machine
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Note list synchronizer
    pub fn notes(&self) -> &NoteListSynchronizer {
        &self.notes
    }

    pub(crate) fn edit(&self) -> &Mutex<EditSession> {
        &self.edit
    }

    pub(crate) fn compose(&self) -> &Mutex<NoteDraft> {
        &self.compose
    }
}

impl fmt::Debug for AppCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCore")
            .field("session", &self.session)
            .field("notes", &self.notes.len())
            .finish_non_exhaustive()
    }
}
