//! Remote store connector
//!
//! Binds a signed identity to a handle on the remote note store. The store
//! authorizes every call by caller identity, so a handle is only ever valid
//! for the identity it was bound to; a new identity always gets a new handle.

use jotter_core::effects::{NoteStoreEffects, StoreConnectEffects};
use jotter_core::{Identity, JotterError, NetworkConfig, Note, Principal, Result, StoreEndpoint};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Unique id of one bind; never shared between two handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(Uuid);

impl HandleId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle-{}", self.0)
    }
}

/// Connection to the remote note store, scoped to one identity
#[derive(Clone)]
pub struct StoreHandle {
    id: HandleId,
    identity: Identity,
    endpoint: StoreEndpoint,
    store: Arc<dyn NoteStoreEffects>,
}

impl StoreHandle {
    /// Unique id of this bind
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Principal the handle calls on behalf of
    pub fn principal(&self) -> &Principal {
        self.identity.principal()
    }

    /// Endpoint the handle is connected to
    pub fn endpoint(&self) -> &StoreEndpoint {
        &self.endpoint
    }

    /// Whether this handle was bound for `identity`
    pub fn is_bound_to(&self, identity: &Identity) -> bool {
        &self.identity == identity
    }

    pub(crate) async fn list(&self) -> Result<Vec<Note>> {
        Ok(self.store.list().await?)
    }

    pub(crate) async fn append(&self, title: &str, content: &str) -> Result<()> {
        Ok(self
            .store
            .append(title.to_string(), content.to_string())
            .await?)
    }

    pub(crate) async fn remove_at(&self, index: usize) -> Result<()> {
        Ok(self.store.remove_at(index).await?)
    }

    pub(crate) async fn replace_at(&self, index: usize, title: &str, content: &str) -> Result<()> {
        Ok(self
            .store
            .replace_at(index, title.to_string(), content.to_string())
            .await?)
    }

    pub(crate) async fn get_at(&self, index: usize) -> Result<Option<Note>> {
        Ok(self.store.get_at(index).await?)
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("id", &self.id)
            .field("principal", self.identity.principal())
            .field("endpoint", &self.endpoint.endpoint)
            .finish_non_exhaustive()
    }
}

/// Creates identity-scoped store handles
pub struct RemoteStoreConnector {
    connect: Arc<dyn StoreConnectEffects>,
}

impl RemoteStoreConnector {
    /// Create a connector over the given transport
    pub fn new(connect: Arc<dyn StoreConnectEffects>) -> Self {
        Self { connect }
    }

    /// Bind a fresh handle for `identity` at the endpoint `config` selects.
    ///
    /// The anonymous identity cannot be bound.
    pub async fn bind(&self, identity: &Identity, config: &NetworkConfig) -> Result<StoreHandle> {
        if identity.is_anonymous() {
            return Err(JotterError::not_authenticated(
                "cannot bind a store handle for the anonymous identity",
            ));
        }

        let endpoint = config.store_endpoint();
        let store = self.connect.connect(identity, &endpoint).await?;
        let handle = StoreHandle {
            id: HandleId::fresh(),
            identity: identity.clone(),
            endpoint,
            store,
        };
        debug!(
            handle = %handle.id,
            principal = %identity.principal().short(),
            endpoint = %handle.endpoint.endpoint,
            "bound store handle"
        );
        Ok(handle)
    }
}
