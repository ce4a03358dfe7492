//! Identity broker
//!
//! Wraps the external identity provider. Produces and caches the signed
//! identity and answers "who is logged in" without interaction. None of its
//! operations fail the caller: provider problems are logged and reported as
//! an unauthenticated status or a [`LoginOutcome`].

use jotter_core::effects::{IdentityProviderEffects, IdentityProviderError, PhysicalTimeEffects};
use jotter_core::{AuthFailure, Identity, JotterError};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of restoring or re-reading the provider's identity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthStatus {
    /// Whether a usable identity exists
    pub is_authenticated: bool,
    /// The usable identity, when authenticated
    pub identity: Option<Identity>,
    /// Why a restored identity was not usable
    pub failure: Option<JotterError>,
}

impl AuthStatus {
    fn authenticated(identity: Identity) -> Self {
        Self {
            is_authenticated: true,
            identity: Some(identity),
            failure: None,
        }
    }

    fn unauthenticated() -> Self {
        Self::default()
    }
}

/// How an interactive login ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The provider issued a new identity
    Authorized(Identity),
    /// The user abandoned the exchange
    Cancelled,
    /// The provider failed or refused
    Failed(JotterError),
}

impl LoginOutcome {
    /// The error to report for a login that did not authorize, if any
    pub fn error(&self) -> Option<JotterError> {
        match self {
            Self::Authorized(_) => None,
            Self::Cancelled => Some(JotterError::auth(
                AuthFailure::Cancelled,
                "login cancelled by user",
            )),
            Self::Failed(err) => Some(err.clone()),
        }
    }
}

/// Produces and caches the caller's signed identity
pub struct IdentityBroker {
    provider: Arc<dyn IdentityProviderEffects>,
    clock: Arc<dyn PhysicalTimeEffects>,
    authorize_url: String,
    cached: Mutex<Option<Identity>>,
}

impl IdentityBroker {
    /// Create a broker that authorizes against `authorize_url`
    pub fn new(
        provider: Arc<dyn IdentityProviderEffects>,
        clock: Arc<dyn PhysicalTimeEffects>,
        authorize_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            clock,
            authorize_url: authorize_url.into(),
            cached: Mutex::new(None),
        }
    }

    /// Restore whatever identity the provider still holds.
    ///
    /// Anonymous and expired identities count as unauthenticated; an expired
    /// one is reported in [`AuthStatus::failure`]. Provider failures are
    /// logged and also yield an unauthenticated status.
    pub async fn initialize(&self) -> AuthStatus {
        let restored = match self.provider.current_identity().await {
            Ok(restored) => restored,
            Err(err) => {
                warn!(error = %err, "identity restore failed; continuing unauthenticated");
                None
            }
        };

        let mut failure = None;
        let usable = match restored {
            Some(identity) if identity.is_anonymous() => None,
            Some(identity) => {
                let now_ms = self.clock.now_ms().await;
                if identity.is_expired(now_ms) {
                    info!(
                        principal = %identity.principal().short(),
                        "cached identity expired"
                    );
                    failure = Some(JotterError::auth(
                        AuthFailure::Expired,
                        format!("identity for {} has expired", identity.principal().short()),
                    ));
                    None
                } else {
                    Some(identity)
                }
            }
            None => None,
        };

        *self.cached.lock() = usable.clone();
        match usable {
            Some(identity) => {
                debug!(principal = %identity.principal().short(), "identity restored");
                AuthStatus::authenticated(identity)
            }
            None => AuthStatus {
                failure,
                ..AuthStatus::unauthenticated()
            },
        }
    }

    /// Run the interactive exchange with the identity provider.
    ///
    /// Suspends until the user completes or abandons it. Failures are logged
    /// and returned as an outcome, never as an error.
    pub async fn login(&self) -> LoginOutcome {
        info!(provider = %self.authorize_url, "starting interactive login");
        match self.provider.authorize(&self.authorize_url).await {
            Ok(identity) if identity.is_anonymous() => {
                warn!("identity provider returned an anonymous identity");
                LoginOutcome::Failed(JotterError::auth(
                    AuthFailure::Rejected,
                    "provider returned an anonymous identity",
                ))
            }
            Ok(identity) => {
                info!(principal = %identity.principal().short(), "login authorized");
                *self.cached.lock() = Some(identity.clone());
                LoginOutcome::Authorized(identity)
            }
            Err(IdentityProviderError::Cancelled) => {
                info!("login cancelled by user");
                LoginOutcome::Cancelled
            }
            Err(IdentityProviderError::Rejected { reason }) => {
                warn!(%reason, "login rejected by provider");
                LoginOutcome::Failed(JotterError::auth(AuthFailure::Rejected, reason))
            }
            Err(IdentityProviderError::Unavailable { reason }) => {
                warn!(%reason, "identity provider unavailable");
                LoginOutcome::Failed(JotterError::auth(
                    AuthFailure::ProviderUnavailable,
                    reason,
                ))
            }
        }
    }

    /// Forget the cached identity and settle into the unauthenticated state.
    ///
    /// A second call with nothing cached does nothing.
    pub async fn logout(&self) -> AuthStatus {
        let previous = self.cached.lock().take();
        let Some(previous) = previous else {
            debug!("logout with no cached identity; nothing to do");
            return AuthStatus::unauthenticated();
        };

        info!(principal = %previous.principal().short(), "logging out");
        if let Err(err) = self.provider.logout().await {
            // The provider may still hold the identity; do not re-read it.
            warn!(error = %err, "provider logout failed; discarding identity locally");
            return AuthStatus::unauthenticated();
        }
        self.initialize().await
    }

    /// Cached identity, if authenticated
    pub fn current_identity(&self) -> Option<Identity> {
        self.cached.lock().clone()
    }

    /// Whether an identity is cached
    pub fn is_authenticated(&self) -> bool {
        self.cached.lock().is_some()
    }

    /// Where interactive logins are sent
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }
}

impl std::fmt::Debug for IdentityBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityBroker")
            .field("authorize_url", &self.authorize_url)
            .field("cached", &self.cached.lock().as_ref().map(Identity::principal))
            .finish()
    }
}
