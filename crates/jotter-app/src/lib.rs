//! # Jotter App
//!
//! Portable, headless client core. Frontends drive it through
//! [`workflows`] and read state back from [`AppCore`].
//!
//! ```text
//! IdentityBroker ──► SessionController ──► RemoteStoreConnector
//!                           │                     │ StoreHandle
//!                           ▼                     ▼
//!                    NoteListSynchronizer ◄── EditSession
//! ```
//!
//! The remote store addresses notes by position only, so the local view is
//! never patched in place: every mutation is followed by a full refresh.

pub mod compose;
pub mod connector;
pub mod core;
pub mod edit;
pub mod identity_broker;
pub mod session;
pub mod sync;
pub mod workflows;

pub use crate::core::{AppCore, AppEffects};
pub use compose::NoteDraft;
pub use connector::{HandleId, RemoteStoreConnector, StoreHandle};
pub use edit::{DraftField, EditSession};
pub use identity_broker::{AuthStatus, IdentityBroker, LoginOutcome};
pub use session::{Session, SessionController, SessionState};
pub use sync::{resolve_index, NoteListSynchronizer, NoteView};

pub use jotter_core::{JotterError, Note, Result};
