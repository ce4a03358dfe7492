//! Jotter Testing Infrastructure
//!
//! Deterministic stand-ins for the client's external collaborators, plus
//! fixtures that wire them into an [`AppCore`](jotter_app::AppCore).
//!
//! ```rust,ignore
//! use jotter_testkit::TestClient;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let client = TestClient::authenticated("alice").await;
//!     jotter_app::workflows::notes::add_note(&client.app, "a", "b").await.unwrap();
//!     assert_eq!(client.service.notes_of(&client.principal()).len(), 1);
//! }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod clock;
pub mod fixtures;
pub mod identity;
pub mod store;

pub use clock::ManualClock;
pub use fixtures::TestClient;
pub use identity::ScriptedIdentityProvider;
pub use store::{InMemoryNoteStore, InMemoryStoreService, StoreCounters};
