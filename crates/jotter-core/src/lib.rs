//! # Jotter Core
//!
//! Foundation types for the Jotter note client:
//!
//! - [`Principal`] and [`Identity`]: who the caller is, as vouched for by the
//!   identity provider
//! - [`Note`]: the record kept by the remote note store, addressed only by
//!   its position in the caller's ordered sequence
//! - [`JotterError`]: the unified error type shared by every layer
//! - [`NetworkConfig`]: selects the identity provider and store endpoint
//! - [`effects`]: trait interfaces for the opaque collaborators (identity
//!   provider, note store, wall clock)
//!
//! This crate has no async runtime dependency. Apart from
//! [`effects::SystemClock`], effect handlers live in `jotter-testkit` or in
//! the binary that wires a real backend.

pub mod config;
pub mod effects;
pub mod errors;
pub mod identity;
pub mod note;

pub use config::{NetworkConfig, NetworkMode, StoreEndpoint};
pub use errors::{AuthFailure, ErrorCategory, JotterError, Result};
pub use identity::{Identity, Principal, SignedCredential};
pub use note::Note;
