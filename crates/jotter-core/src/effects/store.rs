//! Remote note store effects
//!
//! The store keeps one ordered sequence of notes per caller principal and
//! addresses notes by position only. Removing a note shifts every later note
//! down by one position.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: network transport in production, the in-memory
//!   service in `jotter-testkit`
//! - **Usage**: `RemoteStoreConnector` binds a handle, `NoteListSynchronizer`
//!   issues every call through it

use crate::config::StoreEndpoint;
use crate::identity::{Identity, Principal};
use crate::note::Note;
use async_trait::async_trait;
use std::sync::Arc;

/// Store operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Could not reach the store
    #[error("Store unreachable: {reason}")]
    Unreachable {
        /// Transport-level reason
        reason: String,
    },
    /// The call did not complete in time
    #[error("Store call timed out after {timeout_ms}ms")]
    Timeout {
        /// How long the transport waited
        timeout_ms: u64,
    },
    /// The store refused the caller's identity
    #[error("Caller {principal} is not authorized")]
    Unauthorized {
        /// Principal the handle was bound to
        principal: Principal,
    },
    /// No note exists at the addressed position
    #[error("No note at index {index} (length {len})")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Length of the remote sequence at the time of the call
        len: usize,
    },
    /// The store rejected the call for another reason
    #[error("Store rejected call: {reason}")]
    Rejected {
        /// Reason reported by the store
        reason: String,
    },
    /// The reply could not be decoded
    #[error("Failed to decode store reply: {reason}")]
    Decode {
        /// Decoder message
        reason: String,
    },
}

impl StoreError {
    /// Create an unreachable error
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable {
            reason: reason.into(),
        }
    }

    /// Create a rejected error
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Calls available on a store handle.
///
/// Every call is made on behalf of the principal the handle was bound to.
#[async_trait]
pub trait NoteStoreEffects: Send + Sync {
    /// Full ordered sequence of the caller's notes
    async fn list(&self) -> Result<Vec<Note>, StoreError>;

    /// Append a note at the end of the sequence
    async fn append(&self, title: String, content: String) -> Result<(), StoreError>;

    /// Remove the note at `index`, shifting later notes down by one
    async fn remove_at(&self, index: usize) -> Result<(), StoreError>;

    /// Replace title and content of the note at `index`
    async fn replace_at(
        &self,
        index: usize,
        title: String,
        content: String,
    ) -> Result<(), StoreError>;

    /// Read a single note by position
    async fn get_at(&self, index: usize) -> Result<Option<Note>, StoreError>;
}

/// Creates store handles bound to one identity.
#[async_trait]
pub trait StoreConnectEffects: Send + Sync {
    /// Connect to the store at `endpoint` on behalf of `identity`
    async fn connect(
        &self,
        identity: &Identity,
        endpoint: &StoreEndpoint,
    ) -> Result<Arc<dyn NoteStoreEffects>, StoreError>;
}
