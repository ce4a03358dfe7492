//! Workflows - Portable Business Logic
//!
//! The operations a frontend invokes. Each takes the [`AppCore`](crate::AppCore)
//! it acts on and returns a typed result; nothing here panics or throws past
//! the caller.
//!
//! This layer owns the cross-component rules: a completed delete cancels an
//! edit session it made stale, and logging out discards any open edit.

pub mod auth;
pub mod notes;
