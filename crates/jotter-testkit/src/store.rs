//! In-memory note store
//!
//! Keeps one ordered note sequence per principal, addressed by position,
//! the same way the real store does. Adds what tests need on top: call
//! counters, one-shot failure injection (for any call, or for the next
//! `list` only), refusal of new connections, and a hold switch that parks
//! mutating calls until released.
//!
//! # Blocking Lock Usage
//!
//! State sits behind a `parking_lot::Mutex` that is never held across an
//! await point.

use async_trait::async_trait;
use jotter_core::effects::{NoteStoreEffects, StoreConnectEffects, StoreError};
use jotter_core::{Identity, Note, Principal, StoreEndpoint};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Number of calls received, per store operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounters {
    /// `list` calls
    pub list: usize,
    /// `append` calls
    pub append: usize,
    /// `remove_at` calls
    pub remove_at: usize,
    /// `replace_at` calls
    pub replace_at: usize,
    /// `get_at` calls
    pub get_at: usize,
}

impl StoreCounters {
    /// Calls that change the store
    pub fn mutations(&self) -> usize {
        self.append + self.remove_at + self.replace_at
    }
}

#[derive(Debug, Default)]
struct ServiceState {
    notes: HashMap<Principal, Vec<Note>>,
    counters: StoreCounters,
    connects: usize,
    fail_next: Option<StoreError>,
    fail_next_list: Option<StoreError>,
    refuse_connections: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Op {
    List,
    Append,
    RemoveAt,
    ReplaceAt,
    GetAt,
}

impl Op {
    fn is_mutation(self) -> bool {
        matches!(self, Self::Append | Self::RemoveAt | Self::ReplaceAt)
    }
}

/// Shared in-memory store; hands out per-principal handles
#[derive(Debug, Clone)]
pub struct InMemoryStoreService {
    state: Arc<Mutex<ServiceState>>,
    hold: Arc<watch::Sender<bool>>,
}

impl Default for InMemoryStoreService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStoreService {
    /// Empty store accepting connections
    pub fn new() -> Self {
        let (hold, _) = watch::channel(false);
        Self {
            state: Arc::new(Mutex::new(ServiceState::default())),
            hold: Arc::new(hold),
        }
    }

    /// Replace `principal`'s notes
    pub fn seed(&self, principal: &Principal, notes: impl IntoIterator<Item = Note>) {
        self.state
            .lock()
            .notes
            .insert(principal.clone(), notes.into_iter().collect());
    }

    /// What `list()` would return for `principal`
    pub fn notes_of(&self, principal: &Principal) -> Vec<Note> {
        self.state
            .lock()
            .notes
            .get(principal)
            .cloned()
            .unwrap_or_default()
    }

    /// Calls received so far
    pub fn counters(&self) -> StoreCounters {
        self.state.lock().counters
    }

    /// Handles created so far
    pub fn connect_count(&self) -> usize {
        self.state.lock().connects
    }

    /// Fail the next store call, whatever it is
    pub fn fail_next(&self, err: StoreError) {
        self.state.lock().fail_next = Some(err);
    }

    /// Fail the next `list` call only; mutations still go through
    pub fn fail_next_list(&self, err: StoreError) {
        self.state.lock().fail_next_list = Some(err);
    }

    /// Refuse new connections until [`accept_connections`](Self::accept_connections)
    pub fn refuse_connections(&self, reason: impl Into<String>) {
        self.state.lock().refuse_connections = Some(reason.into());
    }

    /// Accept new connections again
    pub fn accept_connections(&self) {
        self.state.lock().refuse_connections = None;
    }

    /// Park mutating calls after they are counted, until released
    pub fn hold_mutations(&self) {
        self.hold.send_replace(true);
    }

    /// Let parked and future mutating calls proceed
    pub fn release_mutations(&self) {
        self.hold.send_replace(false);
    }

    async fn enter(&self, op: Op) -> Result<(), StoreError> {
        {
            let mut state = self.state.lock();
            let counters = &mut state.counters;
            match op {
                Op::List => counters.list += 1,
                Op::Append => counters.append += 1,
                Op::RemoveAt => counters.remove_at += 1,
                Op::ReplaceAt => counters.replace_at += 1,
                Op::GetAt => counters.get_at += 1,
            }
        }

        if op.is_mutation() {
            let mut held = self.hold.subscribe();
            // The sender lives as long as `self`, so this cannot fail.
            let _ = held.wait_for(|held| !*held).await;
        }

        let failure = {
            let mut state = self.state.lock();
            match op {
                Op::List => state.fail_next_list.take().or_else(|| state.fail_next.take()),
                _ => state.fail_next.take(),
            }
        };
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StoreConnectEffects for InMemoryStoreService {
    async fn connect(
        &self,
        identity: &Identity,
        endpoint: &StoreEndpoint,
    ) -> Result<Arc<dyn NoteStoreEffects>, StoreError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.refuse_connections {
            return Err(StoreError::unreachable(reason.clone()));
        }
        if identity.is_anonymous() {
            return Err(StoreError::Unauthorized {
                principal: identity.principal().clone(),
            });
        }
        state.connects += 1;
        tracing::debug!(
            principal = %identity.principal().short(),
            endpoint = %endpoint.endpoint,
            "in-memory store connection"
        );

        Ok(Arc::new(InMemoryNoteStore {
            principal: identity.principal().clone(),
            service: self.clone(),
        }))
    }
}

/// Handle on one principal's note sequence
#[derive(Debug, Clone)]
pub struct InMemoryNoteStore {
    principal: Principal,
    service: InMemoryStoreService,
}

impl InMemoryNoteStore {
    fn with_notes<T>(&self, f: impl FnOnce(&mut Vec<Note>) -> T) -> T {
        let mut state = self.service.state.lock();
        f(state.notes.entry(self.principal.clone()).or_default())
    }
}

#[async_trait]
impl NoteStoreEffects for InMemoryNoteStore {
    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        self.service.enter(Op::List).await?;
        Ok(self.with_notes(|notes| notes.clone()))
    }

    async fn append(&self, title: String, content: String) -> Result<(), StoreError> {
        self.service.enter(Op::Append).await?;
        self.with_notes(|notes| notes.push(Note { title, content }));
        Ok(())
    }

    async fn remove_at(&self, index: usize) -> Result<(), StoreError> {
        self.service.enter(Op::RemoveAt).await?;
        self.with_notes(|notes| {
            if index < notes.len() {
                notes.remove(index);
                Ok(())
            } else {
                Err(StoreError::IndexOutOfRange {
                    index,
                    len: notes.len(),
                })
            }
        })
    }

    async fn replace_at(
        &self,
        index: usize,
        title: String,
        content: String,
    ) -> Result<(), StoreError> {
        self.service.enter(Op::ReplaceAt).await?;
        self.with_notes(|notes| {
            let len = notes.len();
            match notes.get_mut(index) {
                Some(note) => {
                    note.title = title;
                    note.content = content;
                    Ok(())
                }
                None => Err(StoreError::IndexOutOfRange { index, len }),
            }
        })
    }

    async fn get_at(&self, index: usize) -> Result<Option<Note>, StoreError> {
        self.service.enter(Op::GetAt).await?;
        Ok(self.with_notes(|notes| notes.get(index).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedIdentityProvider;

    async fn handle(service: &InMemoryStoreService, name: &str) -> Arc<dyn NoteStoreEffects> {
        let endpoint = jotter_core::NetworkConfig::default().store_endpoint();
        service
            .connect(&ScriptedIdentityProvider::identity_for(name), &endpoint)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_remove_shifts_later_notes() {
        let service = InMemoryStoreService::new();
        let store = handle(&service, "alice").await;
        for title in ["A", "B", "C"] {
            store.append(title.into(), "x".into()).await.unwrap();
        }

        store.remove_at(0).await.unwrap();
        let titles: Vec<_> = store.list().await.unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_out_of_range_reported() {
        let service = InMemoryStoreService::new();
        let store = handle(&service, "alice").await;

        assert_eq!(
            store.remove_at(0).await,
            Err(StoreError::IndexOutOfRange { index: 0, len: 0 })
        );
        assert_eq!(
            store.replace_at(3, "t".into(), "c".into()).await,
            Err(StoreError::IndexOutOfRange { index: 3, len: 0 })
        );
    }

    #[tokio::test]
    async fn test_principals_are_isolated() {
        let service = InMemoryStoreService::new();
        let alice = handle(&service, "alice").await;
        let bob = handle(&service, "bob").await;

        alice.append("A".into(), "a".into()).await.unwrap();
        assert!(bob.list().await.unwrap().is_empty());
        assert_eq!(service.connect_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let service = InMemoryStoreService::new();
        let store = handle(&service, "alice").await;

        service.fail_next(StoreError::rejected("quota"));
        assert!(store.list().await.is_err());
        assert!(store.list().await.is_ok());
        assert_eq!(service.counters().list, 2);
    }

    #[tokio::test]
    async fn test_fail_next_list_spares_mutations() {
        let service = InMemoryStoreService::new();
        let store = handle(&service, "alice").await;
        store.append("A".into(), "a".into()).await.unwrap();

        service.fail_next_list(StoreError::unreachable("reset"));
        store.remove_at(0).await.unwrap();
        assert!(store.list().await.is_err());
        assert!(store.list().await.unwrap().is_empty());
    }
}
