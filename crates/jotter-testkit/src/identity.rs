//! Scripted identity provider
//!
//! Answers `authorize` from a queue of scripted responses so tests decide
//! exactly how each login ends. Principals are derived from a name with
//! blake3, so `identity_for("alice")` is the same identity everywhere.

use async_trait::async_trait;
use jotter_core::effects::{IdentityProviderEffects, IdentityProviderError};
use jotter_core::{Identity, Principal, SignedCredential};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
enum Response {
    Approve(Identity),
    Cancel,
    Reject(String),
    Unavailable(String),
}

#[derive(Debug, Default)]
struct ProviderState {
    script: VecDeque<Response>,
    fallback: Option<Identity>,
    current: Option<Identity>,
    restore_failure: Option<String>,
    authorize_urls: Vec<String>,
    logouts: usize,
}

/// Identity provider driven by a script of responses
#[derive(Debug, Clone)]
pub struct ScriptedIdentityProvider {
    state: Arc<Mutex<ProviderState>>,
    hold: Arc<watch::Sender<bool>>,
}

impl Default for ScriptedIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedIdentityProvider {
    /// Provider holding no identity, with an empty script
    pub fn new() -> Self {
        let (hold, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(ProviderState::default())),
            hold: Arc::new(hold),
        }
    }

    /// Deterministic identity for `name`
    pub fn identity_for(name: &str) -> Identity {
        let digest = blake3::hash(name.as_bytes());
        let text = hex::encode(&digest.as_bytes()[..13]);
        let groups: Vec<&str> = (0..5).map(|i| &text[i * 5..i * 5 + 5]).collect();
        let principal = Principal::new(groups.join("-"));

        let credential = blake3::keyed_hash(digest.as_bytes(), b"jotter-credential");
        Identity::new(principal, SignedCredential::new(credential.as_bytes().to_vec()))
    }

    /// Hold the identity for `name` as if from an earlier login
    pub fn restore_as(&self, name: &str) -> Identity {
        let identity = Self::identity_for(name);
        self.restore(identity.clone());
        identity
    }

    /// Hold `identity` as if from an earlier login
    pub fn restore(&self, identity: Identity) {
        let mut state = self.state.lock();
        state.current = Some(identity);
        state.restore_failure = None;
    }

    /// Make `current_identity` fail
    pub fn fail_restore(&self, reason: impl Into<String>) {
        self.state.lock().restore_failure = Some(reason.into());
    }

    /// Next authorize succeeds as `name`
    pub fn approve_next(&self, name: &str) -> Identity {
        let identity = Self::identity_for(name);
        self.push(Response::Approve(identity.clone()));
        identity
    }

    /// Next authorize is abandoned by the user
    pub fn cancel_next(&self) {
        self.push(Response::Cancel);
    }

    /// Next authorize is refused by the provider
    pub fn reject_next(&self, reason: impl Into<String>) {
        self.push(Response::Reject(reason.into()));
    }

    /// Next authorize cannot reach the provider
    pub fn unavailable_next(&self, reason: impl Into<String>) {
        self.push(Response::Unavailable(reason.into()));
    }

    /// Approve as `name` whenever the script is empty
    pub fn auto_approving(self, name: &str) -> Self {
        self.state.lock().fallback = Some(Self::identity_for(name));
        self
    }

    /// Park authorize calls until [`release_authorize`](Self::release_authorize)
    pub fn hold_authorize(&self) {
        self.hold.send_replace(true);
    }

    /// Let parked and future authorize calls proceed
    pub fn release_authorize(&self) {
        self.hold.send_replace(false);
    }

    /// Provider URLs passed to `authorize`, in call order
    pub fn authorize_urls(&self) -> Vec<String> {
        self.state.lock().authorize_urls.clone()
    }

    /// Number of `authorize` calls
    pub fn authorize_count(&self) -> usize {
        self.state.lock().authorize_urls.len()
    }

    /// Number of `logout` calls
    pub fn logout_count(&self) -> usize {
        self.state.lock().logouts
    }

    fn push(&self, response: Response) {
        self.state.lock().script.push_back(response);
    }
}

#[async_trait]
impl IdentityProviderEffects for ScriptedIdentityProvider {
    async fn authorize(&self, provider_url: &str) -> Result<Identity, IdentityProviderError> {
        self.state.lock().authorize_urls.push(provider_url.to_string());

        let mut held = self.hold.subscribe();
        let _ = held.wait_for(|held| !*held).await;

        let mut state = self.state.lock();
        let response = match state.script.pop_front() {
            Some(response) => response,
            None => match &state.fallback {
                Some(identity) => Response::Approve(identity.clone()),
                None => Response::Unavailable("no scripted response".to_string()),
            },
        };
        tracing::debug!(?response, "scripted authorize");

        match response {
            Response::Approve(identity) => {
                state.current = Some(identity.clone());
                Ok(identity)
            }
            Response::Cancel => Err(IdentityProviderError::Cancelled),
            Response::Reject(reason) => Err(IdentityProviderError::Rejected { reason }),
            Response::Unavailable(reason) => Err(IdentityProviderError::Unavailable { reason }),
        }
    }

    async fn current_identity(&self) -> Result<Option<Identity>, IdentityProviderError> {
        let state = self.state.lock();
        match &state.restore_failure {
            Some(reason) => Err(IdentityProviderError::Unavailable {
                reason: reason.clone(),
            }),
            None => Ok(state.current.clone()),
        }
    }

    async fn logout(&self) -> Result<(), IdentityProviderError> {
        let mut state = self.state.lock();
        state.logouts += 1;
        state.current = None;
        Ok(())
    }
}
