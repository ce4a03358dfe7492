//! Note workflows driven end to end through an in-memory store

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_matches::assert_matches;
use futures::{pin_mut, poll};
use jotter_app::workflows::{auth, notes};
use jotter_app::{DraftField, JotterError, Note};
use jotter_core::effects::StoreError;
use jotter_testkit::TestClient;

fn titles(client: &TestClient) -> Vec<String> {
    notes::notes(&client.app)
        .into_iter()
        .map(|note| note.title)
        .collect()
}

async fn seeded(names: &[&str]) -> TestClient {
    let client = TestClient::authenticated("alice").await;
    for name in names {
        notes::add_note(&client.app, name, &name.to_lowercase())
            .await
            .unwrap();
    }
    client
}

#[tokio::test]
async fn test_groceries_walkthrough() {
    let client = TestClient::authenticated("alice").await;
    assert!(notes::notes(&client.app).is_empty());

    notes::add_note(&client.app, "Groceries", "Milk, eggs")
        .await
        .unwrap();
    assert_eq!(
        notes::notes(&client.app),
        vec![Note::new("Groceries", "Milk, eggs")]
    );

    let edit = notes::begin_edit(&client.app, 0).await.unwrap();
    assert_eq!(edit.draft_title(), "Groceries");
    assert_eq!(edit.draft_content(), "Milk, eggs");

    notes::update_draft(&client.app, DraftField::Content, "Milk, eggs, bread")
        .await
        .unwrap();
    notes::save_edit(&client.app).await.unwrap();
    assert!(!notes::edit_session(&client.app).await.is_open());
    assert_eq!(
        client.service.notes_of(&client.principal()),
        vec![Note::new("Groceries", "Milk, eggs, bread")]
    );

    notes::delete_note(&client.app, 0).await.unwrap();
    assert!(notes::notes(&client.app).is_empty());
    assert!(client.service.notes_of(&client.principal()).is_empty());
}

#[tokio::test]
async fn test_every_write_is_followed_by_one_refresh() {
    let client = TestClient::authenticated("alice").await;
    let before = client.service.counters().list;

    notes::add_note(&client.app, "A", "a").await.unwrap();
    notes::add_note(&client.app, "B", "b").await.unwrap();
    notes::delete_note(&client.app, 0).await.unwrap();

    assert_eq!(client.service.counters().list, before + 3);
    assert_eq!(titles(&client), vec!["B"]);
}

#[tokio::test]
async fn test_blank_fields_rejected_before_remote_call() {
    let client = TestClient::authenticated("alice").await;

    for (title, content) in [("", "x"), ("x", ""), ("   ", "x"), ("x", "\t\n")] {
        let err = notes::add_note(&client.app, title, content)
            .await
            .unwrap_err();
        assert_matches!(err, JotterError::Validation { .. });
    }
    assert_eq!(client.service.counters().append, 0);
}

#[tokio::test]
async fn test_padded_values_are_sent_untrimmed() {
    let client = TestClient::authenticated("alice").await;
    notes::add_note(&client.app, "  Todo ", " call mom")
        .await
        .unwrap();

    assert_eq!(
        client.service.notes_of(&client.principal()),
        vec![Note::new("  Todo ", " call mom")]
    );
}

#[tokio::test]
async fn test_delete_out_of_bounds_is_precondition() {
    let client = seeded(&["A", "B"]).await;

    for index in [-1, 2, 40] {
        let err = notes::delete_note(&client.app, index).await.unwrap_err();
        assert_matches!(err, JotterError::Precondition { .. });
    }
    assert_eq!(client.service.counters().remove_at, 0);
    assert_eq!(titles(&client), vec!["A", "B"]);
}

#[tokio::test]
async fn test_delete_cancels_edit_at_or_after_position() {
    let client = seeded(&["A", "B", "C"]).await;

    notes::begin_edit(&client.app, 1).await.unwrap();
    notes::delete_note(&client.app, 0).await.unwrap();
    assert!(!notes::edit_session(&client.app).await.is_open());
    assert_eq!(titles(&client), vec!["B", "C"]);

    notes::begin_edit(&client.app, 0).await.unwrap();
    notes::delete_note(&client.app, 1).await.unwrap();
    let edit = notes::edit_session(&client.app).await;
    assert_eq!(edit.target(), Some(0));
    assert_eq!(edit.draft_title(), "B");
}

#[tokio::test]
async fn test_delete_with_failed_refresh_still_cancels_edit() {
    let client = seeded(&["A", "B", "C"]).await;
    notes::begin_edit(&client.app, 1).await.unwrap();

    client.service.fail_next_list(StoreError::unreachable("reset"));
    let err = notes::delete_note(&client.app, 0).await.unwrap_err();
    assert_matches!(
        err,
        JotterError::Remote {
            cause: StoreError::Unreachable { .. }
        }
    );
    assert_eq!(client.service.counters().remove_at, 1);
    assert!(!notes::edit_session(&client.app).await.is_open());

    assert_matches!(
        notes::save_edit(&client.app).await,
        Err(JotterError::Precondition { .. })
    );
    assert_eq!(client.service.counters().replace_at, 0);
    assert_eq!(
        client.service.notes_of(&client.principal()),
        vec![Note::new("B", "b"), Note::new("C", "c")]
    );
}

#[tokio::test]
async fn test_failed_remove_cancels_edit_but_not_earlier_targets() {
    let client = seeded(&["A", "B", "C"]).await;

    notes::begin_edit(&client.app, 2).await.unwrap();
    client.service.fail_next(StoreError::Timeout { timeout_ms: 5_000 });
    assert!(notes::delete_note(&client.app, 1).await.is_err());
    assert!(!notes::edit_session(&client.app).await.is_open());

    notes::begin_edit(&client.app, 0).await.unwrap();
    client.service.fail_next_list(StoreError::unreachable("reset"));
    assert!(notes::delete_note(&client.app, 1).await.is_err());
    assert_eq!(notes::edit_session(&client.app).await.target(), Some(0));
}

#[tokio::test]
async fn test_failed_commit_keeps_edit_open() {
    let client = seeded(&["A"]).await;
    notes::begin_edit(&client.app, 0).await.unwrap();
    notes::update_draft(&client.app, DraftField::Title, "A2")
        .await
        .unwrap();

    client.service.fail_next(StoreError::unreachable("connection reset"));
    let err = notes::save_edit(&client.app).await.unwrap_err();
    assert_matches!(
        err,
        JotterError::Remote {
            cause: StoreError::Unreachable { .. }
        }
    );

    let edit = notes::edit_session(&client.app).await;
    assert!(edit.is_open());
    assert_eq!(edit.draft_title(), "A2");
    assert_eq!(titles(&client), vec!["A"]);
    assert!(!client.app.notes().is_pending());

    notes::save_edit(&client.app).await.unwrap();
    assert_eq!(titles(&client), vec!["A2"]);
}

#[tokio::test]
async fn test_failed_append_leaves_view_untouched() {
    let client = seeded(&["A"]).await;
    let revision = client.app.notes().view().revision();

    client.service.fail_next(StoreError::rejected("quota exceeded"));
    let err = notes::add_note(&client.app, "B", "b").await.unwrap_err();
    assert_eq!(err.code(), "REMOTE_REJECTED");

    assert_eq!(client.app.notes().view().revision(), revision);
    assert_eq!(titles(&client), vec!["A"]);
}

#[tokio::test]
async fn test_second_mutation_rejected_while_pending() {
    let client = seeded(&["A"]).await;
    client.service.hold_mutations();

    let first = notes::add_note(&client.app, "B", "b");
    pin_mut!(first);
    assert!(poll!(first.as_mut()).is_pending());
    assert!(client.app.notes().is_pending());
    assert!(auth::status(&client.app).pending);

    assert_matches!(
        notes::add_note(&client.app, "C", "c").await,
        Err(JotterError::Busy)
    );
    assert_matches!(
        notes::delete_note(&client.app, 0).await,
        Err(JotterError::Busy)
    );
    notes::begin_edit(&client.app, 0).await.unwrap();
    assert_matches!(notes::save_edit(&client.app).await, Err(JotterError::Busy));

    client.service.release_mutations();
    first.await.unwrap();
    assert!(!client.app.notes().is_pending());
    assert_eq!(client.service.counters().mutations(), 2);
    assert_eq!(titles(&client), vec!["A", "B"]);
}

#[tokio::test]
async fn test_mutations_require_authenticated_session() {
    let client = TestClient::new();

    let err = notes::add_note(&client.app, "A", "a").await.unwrap_err();
    assert_eq!(err.code(), "AUTH_REQUIRED");
    assert_matches!(
        notes::delete_note(&client.app, 0).await,
        Err(JotterError::Precondition { .. })
    );
    assert_eq!(client.service.counters().mutations(), 0);
}

#[tokio::test]
async fn test_submit_compose_clears_draft() {
    let client = TestClient::authenticated("alice").await;
    notes::update_compose(&client.app, DraftField::Title, "Groceries").await;
    assert!(!notes::compose_draft(&client.app).await.is_submittable());

    assert_matches!(
        notes::submit_compose(&client.app).await,
        Err(JotterError::Validation { .. })
    );
    assert_eq!(notes::compose_draft(&client.app).await.title, "Groceries");

    notes::update_compose(&client.app, DraftField::Content, "Milk").await;
    notes::submit_compose(&client.app).await.unwrap();
    assert_eq!(notes::compose_draft(&client.app).await.title, "");
    assert_eq!(titles(&client), vec!["Groceries"]);
}

#[tokio::test]
async fn test_external_changes_appear_on_refresh() {
    let client = seeded(&["A", "B", "C"]).await;
    notes::begin_edit(&client.app, 2).await.unwrap();

    client
        .service
        .seed(&client.principal(), vec![Note::new("A", "a")]);
    assert_eq!(
        notes::fetch_note(&client.app, 0).await.unwrap(),
        Some(Note::new("A", "a"))
    );
    assert_eq!(notes::fetch_note(&client.app, -3).await.unwrap(), None);
    assert_eq!(titles(&client), vec!["A", "B", "C"]);

    notes::refresh(&client.app).await.unwrap();
    assert_eq!(titles(&client), vec!["A"]);
    assert!(!notes::edit_session(&client.app).await.is_open());
}
