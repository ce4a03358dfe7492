//! Client fixtures
//!
//! [`TestClient`] wires an [`AppCore`] to the in-memory doubles and keeps
//! handles on them so tests can script the provider and inspect the store.

use crate::{InMemoryStoreService, ManualClock, ScriptedIdentityProvider};
use jotter_app::workflows::auth;
use jotter_app::{AppCore, AppEffects, SessionState};
use jotter_core::{NetworkConfig, Principal};
use std::sync::Arc;

/// An [`AppCore`] over in-memory collaborators
#[derive(Debug)]
pub struct TestClient {
    /// Client under test
    pub app: AppCore,
    /// Identity provider the client logs in through
    pub provider: ScriptedIdentityProvider,
    /// Store the client's handles point at
    pub service: InMemoryStoreService,
    /// Clock used for identity expiry
    pub clock: ManualClock,
}

impl TestClient {
    /// Unauthenticated client with a fresh store
    pub fn new() -> Self {
        Self::with_service(InMemoryStoreService::new())
    }

    /// Unauthenticated client sharing `service` with other clients
    pub fn with_service(service: InMemoryStoreService) -> Self {
        let provider = ScriptedIdentityProvider::new();
        let clock = ManualClock::default();
        let effects = AppEffects {
            identity_provider: Arc::new(provider.clone()),
            store_connector: Arc::new(service.clone()),
            clock: Arc::new(clock.clone()),
        };
        let app = AppCore::new(NetworkConfig::default(), effects)
            .expect("default network config is valid");

        Self {
            app,
            provider,
            service,
            clock,
        }
    }

    /// Client logged in as `name`
    pub async fn authenticated(name: &str) -> Self {
        let client = Self::new();
        client.login_as(name).await;
        client
    }

    /// Run a login that the provider approves as `name`
    pub async fn login_as(&self, name: &str) {
        self.provider.approve_next(name);
        let state = auth::login(&self.app).await;
        assert_eq!(state, SessionState::Authenticated, "login as {name} failed");
    }

    /// Principal of the authenticated session
    pub fn principal(&self) -> Principal {
        self.app
            .session()
            .principal()
            .expect("client is not authenticated")
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
