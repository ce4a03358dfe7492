//! Effect traits for the client's external collaborators
//!
//! The client never talks to the network directly. Everything it needs from
//! the outside world goes through one of these traits:
//!
//! - [`IdentityProviderEffects`]: interactive login and identity restore
//! - [`StoreConnectEffects`] / [`NoteStoreEffects`]: binding to and calling
//!   the remote note store
//! - [`PhysicalTimeEffects`]: wall-clock time for identity expiry

pub mod identity;
pub mod store;
pub mod time;

pub use identity::{IdentityProviderEffects, IdentityProviderError};
pub use store::{NoteStoreEffects, StoreConnectEffects, StoreError};
pub use time::{PhysicalTimeEffects, SystemClock};
