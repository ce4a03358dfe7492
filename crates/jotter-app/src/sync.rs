//! # Note list synchronizer
//!
//! Owns the local, ordered mirror of the caller's remote note sequence and
//! serializes every mutating call against the store.
//!
//! ## Invariants
//!
//! - The local view is only ever replaced wholesale by the result of a
//!   remote `list()`. It is never patched after an add, edit or delete,
//!   because the store re-indexes notes on removal.
//! - At most one mutating call is in flight. A second call is rejected with
//!   [`JotterError::Busy`] before anything reaches the store.
//! - Validation and index checks run before any remote call. A remote
//!   failure leaves the view exactly as it was.

use crate::connector::{HandleId, StoreHandle};
use jotter_core::note::validate_fields;
use jotter_core::{JotterError, Note, Result};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable snapshot of the local note view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteView {
    notes: Vec<Note>,
    revision: u64,
}

impl NoteView {
    /// Notes in remote order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Number of notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the view holds no notes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Note at `index`, if in range
    pub fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    /// Bumped on every wholesale replacement
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Convert a caller-supplied position into an index into a view of `len` notes.
///
/// Negative and past-the-end positions are precondition failures.
pub fn resolve_index(index: i64, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|index| *index < len)
        .ok_or_else(|| {
            JotterError::precondition(format!("index {index} is out of range for {len} notes"))
        })
}

/// Hands the single mutation permit back when the call ends, however it ends.
struct PendingGuard<'a> {
    permit: &'a Mutex<bool>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        *self.permit.lock() = false;
    }
}

/// Keeps the local note view consistent with the remote store
#[derive(Debug, Default)]
pub struct NoteListSynchronizer {
    handle: RwLock<Option<StoreHandle>>,
    view: RwLock<Arc<NoteView>>,
    pending: Mutex<bool>,
    refreshes: AtomicU64,
}

impl NoteListSynchronizer {
    /// Create a synchronizer with no store handle and an empty view
    pub fn new() -> Self {
        Self::default()
    }

    /// Start issuing calls through `handle`.
    ///
    /// Notes fetched through a previous handle belong to another identity
    /// and are cleared; the view fills again on the next refresh.
    pub(crate) fn attach(&self, handle: StoreHandle) {
        debug!(handle = %handle.id(), "synchronizer attached");
        let previous = self.handle.write().replace(handle);
        if previous.is_some() && !self.view.read().is_empty() {
            self.replace_view(Vec::new());
        }
    }

    /// Drop the store handle and clear the view.
    pub(crate) fn detach(&self) {
        let previous = self.handle.write().take();
        if previous.is_none() && self.view.read().is_empty() {
            return;
        }
        if let Some(handle) = previous {
            debug!(handle = %handle.id(), "synchronizer detached");
        }
        self.replace_view(Vec::new());
    }

    /// Current snapshot of the local view
    pub fn view(&self) -> Arc<NoteView> {
        Arc::clone(&self.view.read())
    }

    /// Notes in the local view
    pub fn notes(&self) -> Vec<Note> {
        self.view.read().notes.clone()
    }

    /// Number of notes in the local view
    pub fn len(&self) -> usize {
        self.view.read().len()
    }

    /// Whether the local view is empty
    pub fn is_empty(&self) -> bool {
        self.view.read().is_empty()
    }

    /// Whether a mutating call is in flight
    pub fn is_pending(&self) -> bool {
        *self.pending.lock()
    }

    /// Whether a store handle is attached
    pub fn is_attached(&self) -> bool {
        self.handle.read().is_some()
    }

    /// Number of successful refreshes since creation
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Fetch the full remote sequence and replace the local view with it.
    ///
    /// Read-only with respect to the store and not gated by pending
    /// mutations. If the handle is replaced while the fetch is in flight, the
    /// result belongs to a stale identity and is discarded.
    pub async fn refresh(&self) -> Result<Arc<NoteView>> {
        let handle = self.current_handle("refresh")?;
        let notes = handle.list().await.map_err(|err| {
            warn!(error = %err, "note list refresh failed");
            err
        })?;

        if !self.still_attached(handle.id()) {
            debug!(handle = %handle.id(), "discarding refresh for a replaced handle");
            return Ok(self.view());
        }

        self.refreshes.fetch_add(1, Ordering::Relaxed);
        Ok(self.replace_view(notes))
    }

    /// Append a note, then refresh.
    pub async fn add(&self, title: &str, content: &str) -> Result<Arc<NoteView>> {
        validate_fields(title, content)?;
        let _pending = self.begin_mutation()?;
        let handle = self.current_handle("add")?;

        debug!(title_len = title.len(), "appending note");
        handle.append(title, content).await?;
        self.refresh().await
    }

    /// Remove the note at `index`, then refresh.
    ///
    /// Every note after `index` moves down one position. Callers holding an
    /// edit session at or after `index` must cancel it, also when this fails
    /// with a remote error: the remove may have been applied even if it or
    /// the refresh after it failed.
    pub async fn delete(&self, index: usize) -> Result<Arc<NoteView>> {
        let _pending = self.begin_mutation()?;
        self.check_index(index)?;
        let handle = self.current_handle("delete")?;

        debug!(index, "removing note");
        handle.remove_at(index).await?;
        self.refresh().await
    }

    /// Replace the note at `index`, then refresh.
    pub async fn edit(&self, index: usize, title: &str, content: &str) -> Result<Arc<NoteView>> {
        validate_fields(title, content)?;
        let _pending = self.begin_mutation()?;
        self.check_index(index)?;
        let handle = self.current_handle("edit")?;

        debug!(index, "replacing note");
        handle.replace_at(index, title, content).await?;
        self.refresh().await
    }

    /// Read one note straight from the store without touching the view
    pub async fn fetch_remote(&self, index: usize) -> Result<Option<Note>> {
        let handle = self.current_handle("fetch")?;
        handle.get_at(index).await
    }

    fn begin_mutation(&self) -> Result<PendingGuard<'_>> {
        let mut pending = self.pending.lock();
        if *pending {
            debug!("rejecting mutation while another is in flight");
            return Err(JotterError::Busy);
        }
        *pending = true;
        Ok(PendingGuard {
            permit: &self.pending,
        })
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.len();
        if index < len {
            Ok(())
        } else {
            Err(JotterError::precondition(format!(
                "index {index} is out of range for {len} notes"
            )))
        }
    }

    fn current_handle(&self, operation: &str) -> Result<StoreHandle> {
        self.handle.read().clone().ok_or_else(|| {
            JotterError::not_authenticated(format!("{operation} requires an authenticated session"))
        })
    }

    fn still_attached(&self, id: HandleId) -> bool {
        self.handle
            .read()
            .as_ref()
            .is_some_and(|handle| handle.id() == id)
    }

    fn replace_view(&self, notes: Vec<Note>) -> Arc<NoteView> {
        let mut view = self.view.write();
        let next = Arc::new(NoteView {
            notes,
            revision: view.revision + 1,
        });
        *view = Arc::clone(&next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::RemoteStoreConnector;
    use assert_matches::assert_matches;
    use jotter_core::effects::StoreError;
    use jotter_core::NetworkConfig;
    use jotter_testkit::{InMemoryStoreService, ScriptedIdentityProvider};

    async fn attached(service: &InMemoryStoreService) -> NoteListSynchronizer {
        let connector = RemoteStoreConnector::new(Arc::new(service.clone()));
        let identity = ScriptedIdentityProvider::identity_for("alice");
        let handle = connector
            .bind(&identity, &NetworkConfig::default())
            .await
            .unwrap();
        let sync = NoteListSynchronizer::new();
        sync.attach(handle);
        sync
    }

    fn titles(sync: &NoteListSynchronizer) -> Vec<String> {
        sync.notes().into_iter().map(|note| note.title).collect()
    }

    #[test]
    fn test_resolve_index_bounds() {
        assert_eq!(resolve_index(0, 3).unwrap(), 0);
        assert_eq!(resolve_index(2, 3).unwrap(), 2);
        assert_matches!(resolve_index(-1, 3), Err(JotterError::Precondition { .. }));
        assert_matches!(resolve_index(3, 3), Err(JotterError::Precondition { .. }));
        assert_matches!(resolve_index(0, 0), Err(JotterError::Precondition { .. }));
    }

    #[tokio::test]
    async fn test_refresh_requires_handle() {
        let sync = NoteListSynchronizer::new();
        assert_matches!(sync.refresh().await, Err(JotterError::Auth { .. }));
    }

    #[tokio::test]
    async fn test_add_refreshes_from_store() {
        let service = InMemoryStoreService::new();
        let sync = attached(&service).await;

        let view = sync.add("Groceries", "Milk, eggs").await.unwrap();
        assert_eq!(view.notes(), &[Note::new("Groceries", "Milk, eggs")]);
        assert_eq!(service.counters().list, 1);
        assert!(!sync.is_pending());
    }

    #[tokio::test]
    async fn test_blank_input_never_reaches_store() {
        let service = InMemoryStoreService::new();
        let sync = attached(&service).await;

        for (title, content) in [("", "x"), ("x", ""), ("  ", "  ")] {
            assert_matches!(
                sync.add(title, content).await,
                Err(JotterError::Validation { .. })
            );
        }
        assert_eq!(service.counters().append, 0);
        assert!(!sync.is_pending());
    }

    #[tokio::test]
    async fn test_delete_out_of_range_never_reaches_store() {
        let service = InMemoryStoreService::new();
        let sync = attached(&service).await;
        sync.add("A", "a").await.unwrap();

        assert_matches!(sync.delete(1).await, Err(JotterError::Precondition { .. }));
        assert_matches!(
            sync.edit(1, "B", "b").await,
            Err(JotterError::Precondition { .. })
        );
        assert_eq!(service.counters().remove_at, 0);
        assert_eq!(service.counters().replace_at, 0);
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_view_unchanged() {
        let service = InMemoryStoreService::new();
        let sync = attached(&service).await;
        sync.add("A", "a").await.unwrap();
        let before = sync.view();

        service.fail_next(StoreError::unreachable("connection reset"));
        let err = sync.add("B", "b").await.unwrap_err();

        assert_matches!(err, JotterError::Remote { cause: StoreError::Unreachable { .. } });
        assert_eq!(sync.view(), before);
        assert!(!sync.is_pending());
    }

    #[tokio::test]
    async fn test_delete_reindexes() {
        let service = InMemoryStoreService::new();
        let sync = attached(&service).await;
        for title in ["A", "B", "C"] {
            sync.add(title, "body").await.unwrap();
        }

        sync.delete(0).await.unwrap();
        assert_eq!(titles(&sync), vec!["B", "C"]);

        sync.edit(1, "C2", "body").await.unwrap();
        assert_eq!(titles(&sync), vec!["B", "C2"]);
    }

    #[tokio::test]
    async fn test_second_mutation_rejected_while_pending() {
        let service = InMemoryStoreService::new();
        let sync = attached(&service).await;
        service.hold_mutations();

        let first = sync.add("A", "a");
        futures::pin_mut!(first);
        assert!(futures::poll!(first.as_mut()).is_pending());
        assert!(sync.is_pending());

        assert_matches!(sync.add("B", "b").await, Err(JotterError::Busy));
        assert_matches!(sync.delete(0).await, Err(JotterError::Busy));
        assert_eq!(service.counters().append, 1);

        service.release_mutations();
        let view = first.await.unwrap();
        assert_eq!(view.len(), 1);
        assert!(!sync.is_pending());
    }

    #[tokio::test]
    async fn test_permit_returned_after_every_outcome() {
        let service = InMemoryStoreService::new();
        let sync = attached(&service).await;

        assert_matches!(sync.add("", "x").await, Err(JotterError::Validation { .. }));
        assert!(!sync.is_pending());
        assert_matches!(sync.delete(0).await, Err(JotterError::Precondition { .. }));
        assert!(!sync.is_pending());

        service.fail_next(StoreError::rejected("quota"));
        assert_matches!(sync.add("A", "a").await, Err(JotterError::Remote { .. }));
        assert!(!sync.is_pending());

        sync.add("A", "a").await.unwrap();
        sync.edit(0, "A2", "a").await.unwrap();
        sync.delete(0).await.unwrap();
        assert!(sync.is_empty());
        assert_eq!(service.counters().mutations(), 4);
    }

    #[tokio::test]
    async fn test_detach_clears_view() {
        let service = InMemoryStoreService::new();
        let sync = attached(&service).await;
        sync.add("A", "a").await.unwrap();

        sync.detach();
        assert!(sync.is_empty());
        assert!(!sync.is_attached());

        let revision = sync.view().revision();
        sync.detach();
        assert_eq!(sync.view().revision(), revision);
    }

    #[tokio::test]
    async fn test_fetch_remote_reads_without_refreshing() {
        let service = InMemoryStoreService::new();
        let sync = attached(&service).await;
        sync.add("A", "a").await.unwrap();
        let revision = sync.view().revision();

        assert_eq!(sync.fetch_remote(0).await.unwrap(), Some(Note::new("A", "a")));
        assert_eq!(sync.fetch_remote(5).await.unwrap(), None);
        assert_eq!(sync.view().revision(), revision);
    }
}
