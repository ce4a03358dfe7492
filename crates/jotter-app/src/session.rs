//! # Session controller
//!
//! Owns the authentication state machine:
//!
//! ```text
//! Unauthenticated ──login()──► Authenticating ──success──► Authenticated
//!        ▲                          │                           │
//!        └────────failure/cancel────┘                           │
//!        └──────────────────────────logout()────────────────────┘
//! ```
//!
//! Entering `Authenticated` binds a fresh store handle and refreshes the
//! note list. Entering `Unauthenticated` drops the handle and clears the
//! view. A login while one is already running is ignored, not queued.
//!
//! The controller is the only writer of the identity and the store handle.

use crate::connector::{RemoteStoreConnector, StoreHandle};
use crate::identity_broker::{AuthStatus, IdentityBroker, LoginOutcome};
use crate::sync::NoteListSynchronizer;
use jotter_core::{AuthFailure, Identity, JotterError, NetworkConfig, Principal};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authentication state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No identity
    Unauthenticated,
    /// Interactive login in progress
    Authenticating,
    /// Identity established and store handle bound
    Authenticated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Explicitly owned session value.
///
/// The store handle exists exactly when authenticated; an identity exists
/// whenever the state is not `Unauthenticated`. While authenticating, the
/// identity is the provisional anonymous one.
#[derive(Debug, Clone, Default)]
pub enum Session {
    /// No identity, no handle
    #[default]
    Unauthenticated,
    /// Waiting on the identity provider
    Authenticating {
        /// Provisional identity held until the provider answers
        identity: Identity,
    },
    /// Logged in
    Authenticated {
        /// Signed identity issued by the provider
        identity: Identity,
        /// Handle bound to `identity`
        handle: StoreHandle,
    },
}

impl Session {
    /// State of this session
    pub fn state(&self) -> SessionState {
        match self {
            Self::Unauthenticated => SessionState::Unauthenticated,
            Self::Authenticating { .. } => SessionState::Authenticating,
            Self::Authenticated { .. } => SessionState::Authenticated,
        }
    }

    /// Identity, unless unauthenticated
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Unauthenticated => None,
            Self::Authenticating { identity } | Self::Authenticated { identity, .. } => {
                Some(identity)
            }
        }
    }

    /// Store handle, only when authenticated
    pub fn handle(&self) -> Option<&StoreHandle> {
        match self {
            Self::Authenticated { handle, .. } => Some(handle),
            _ => None,
        }
    }
}

/// Drives the session through its states
pub struct SessionController {
    config: NetworkConfig,
    broker: IdentityBroker,
    connector: RemoteStoreConnector,
    notes: Arc<NoteListSynchronizer>,
    session: RwLock<Session>,
    last_error: RwLock<Option<JotterError>>,
}

impl SessionController {
    /// Create a controller in the unauthenticated state
    pub fn new(
        config: NetworkConfig,
        broker: IdentityBroker,
        connector: RemoteStoreConnector,
        notes: Arc<NoteListSynchronizer>,
    ) -> Self {
        Self {
            config,
            broker,
            connector,
            notes,
            session: RwLock::new(Session::Unauthenticated),
            last_error: RwLock::new(None),
        }
    }

    /// Restore any identity the provider still holds and settle into the
    /// matching state.
    pub async fn initialize(&self) -> SessionState {
        if self.state() == SessionState::Authenticating {
            debug!("initialize ignored while a login is in progress");
            return SessionState::Authenticating;
        }
        let status = self.broker.initialize().await;
        self.settle(status).await
    }

    /// Run an interactive login.
    ///
    /// Ignored while another login is running, and when already
    /// authenticated. Failures and cancellation are logged, recorded in
    /// [`last_error`](Self::last_error), and leave the session
    /// unauthenticated.
    pub async fn login(&self) -> SessionState {
        {
            let mut session = self.session.write();
            match session.state() {
                SessionState::Authenticating => {
                    debug!("login already in progress; ignoring");
                    return SessionState::Authenticating;
                }
                SessionState::Authenticated => {
                    debug!("already authenticated; ignoring login");
                    return SessionState::Authenticated;
                }
                SessionState::Unauthenticated => {
                    *session = Session::Authenticating {
                        identity: Identity::anonymous(),
                    };
                }
            }
        }
        info!("session authenticating");

        match self.broker.login().await {
            LoginOutcome::Authorized(_) => {
                *self.last_error.write() = None;
                let status = self.broker.initialize().await;
                if !status.is_authenticated {
                    warn!("provider did not retain the identity it just issued");
                    self.record(JotterError::auth(
                        AuthFailure::Rejected,
                        "identity not available after login",
                    ));
                }
                self.settle(status).await
            }
            outcome => {
                if let Some(err) = outcome.error() {
                    self.record(err);
                }
                self.enter_unauthenticated();
                SessionState::Unauthenticated
            }
        }
    }

    /// Log out. Always ends unauthenticated; calling it again is a no-op.
    ///
    /// Ignored while a login is running.
    pub async fn logout(&self) -> SessionState {
        if self.state() == SessionState::Authenticating {
            debug!("logout ignored while a login is in progress");
            return SessionState::Authenticating;
        }
        self.broker.logout().await;
        self.enter_unauthenticated();
        SessionState::Unauthenticated
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.session.read().state()
    }

    /// Snapshot of the session value
    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    /// Identity of the session, unless unauthenticated
    pub fn identity(&self) -> Option<Identity> {
        self.session.read().identity().cloned()
    }

    /// Principal of the authenticated identity
    pub fn principal(&self) -> Option<Principal> {
        match &*self.session.read() {
            Session::Authenticated { identity, .. } => Some(identity.principal().clone()),
            _ => None,
        }
    }

    /// Most recent login, restore or initial-refresh failure
    pub fn last_error(&self) -> Option<JotterError> {
        self.last_error.read().clone()
    }

    /// Synchronizer fed by this session
    pub fn notes(&self) -> &Arc<NoteListSynchronizer> {
        &self.notes
    }

    /// Network configuration handles are bound with
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    async fn settle(&self, status: AuthStatus) -> SessionState {
        if let Some(err) = status.failure {
            self.record(err);
        }
        match status.identity {
            Some(identity) if status.is_authenticated => {
                self.enter_authenticated(identity).await
            }
            _ => {
                self.enter_unauthenticated();
                SessionState::Unauthenticated
            }
        }
    }

    async fn enter_authenticated(&self, identity: Identity) -> SessionState {
        let already_bound = self
            .session
            .read()
            .handle()
            .is_some_and(|handle| handle.is_bound_to(&identity));
        if already_bound {
            debug!("session already bound to this identity");
            return SessionState::Authenticated;
        }

        let handle = match self.connector.bind(&identity, &self.config).await {
            Ok(handle) => handle,
            Err(err) => {
                warn!(error = %err, "failed to bind store handle");
                self.record(err);
                self.enter_unauthenticated();
                return SessionState::Unauthenticated;
            }
        };

        info!(
            principal = %identity.principal().short(),
            handle = %handle.id(),
            "session authenticated"
        );
        self.notes.attach(handle.clone());
        *self.session.write() = Session::Authenticated { identity, handle };

        if let Err(err) = self.notes.refresh().await {
            warn!(error = %err, "initial note refresh failed");
            self.record(err);
        }
        SessionState::Authenticated
    }

    fn enter_unauthenticated(&self) {
        let previous = std::mem::take(&mut *self.session.write());
        if previous.state() != SessionState::Unauthenticated {
            info!(from = %previous.state(), "session unauthenticated");
        }
        self.notes.detach();
    }

    fn record(&self, err: JotterError) {
        *self.last_error.write() = Some(err);
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("network_mode", &self.config.network_mode)
            .finish_non_exhaustive()
    }
}
