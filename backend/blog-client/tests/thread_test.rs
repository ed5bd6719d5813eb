//! Comment thread flows against an in-process server double

mod common;

use blog_client::{ClientError, CommentMode, CommentThread, Session};
use common::FakeApi;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[tokio::test]
async fn test_load_sorts_oldest_first() {
    let api = Arc::new(FakeApi::new());
    let alice = api.sign_in("alice");
    let post = api.seed_post(&alice);
    api.seed_comment(post.id, &alice, "second", 5);
    api.seed_comment(post.id, &alice, "first", 10);

    let thread = CommentThread::new(api.clone(), Some(alice), post.id);
    thread.load().await.unwrap();

    let bodies: Vec<_> = thread
        .snapshot()
        .comments
        .iter()
        .map(|v| v.comment.body.clone())
        .collect();
    assert_eq!(bodies, vec!["first", "second"]);
    assert_eq!(thread.count(), 2);
}

#[tokio::test]
async fn test_add_comment_commits_server_copy() {
    let api = Arc::new(FakeApi::new());
    let alice = api.sign_in("alice");
    let post = api.seed_post(&alice);
    api.seed_comment(post.id, &alice, "older", 10);

    let thread = CommentThread::new(api.clone(), Some(alice), post.id);
    thread.load().await.unwrap();
    thread.set_draft("nice post");
    let created = thread.add_comment().await.unwrap();

    let state = thread.snapshot();
    assert_eq!(state.count(), 2);
    assert_eq!(state.comments[1].comment, created);
    assert!(state.draft.is_empty());
    assert!(!state.submitting);
}

#[tokio::test]
async fn test_add_comment_validation_makes_no_call() {
    let api = Arc::new(FakeApi::new());
    let alice = api.sign_in("alice");
    let post = api.seed_post(&alice);

    let thread = CommentThread::new(api.clone(), Some(alice), post.id);
    thread.set_draft("a".repeat(1001));
    let err = thread.add_comment().await.unwrap_err();

    assert_eq!(
        err,
        ClientError::Validation("Comment body cannot exceed 1000 characters".to_string())
    );
    let state = thread.snapshot();
    assert_eq!(
        state.form_error.as_deref(),
        Some("Comment body cannot exceed 1000 characters")
    );
    assert_eq!(state.draft.len(), 1001);
    assert_eq!(state.count(), 0);
    assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_add_comment_requires_session() {
    let api = Arc::new(FakeApi::new());
    let alice = api.sign_in("alice");
    let post = api.seed_post(&alice);

    let thread = CommentThread::new(api.clone(), None, post.id);
    thread.set_draft("hello");
    let err = thread.add_comment().await.unwrap_err();

    assert_eq!(err.user_message(), "You must be logged in to post a comment");
    assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_duplicate_submission_issues_one_call() {
    let api = Arc::new(FakeApi::new());
    let alice = api.sign_in("alice");
    let post = api.seed_post(&alice);
    api.hold_creates.store(true, Ordering::SeqCst);

    let thread = Arc::new(CommentThread::new(api.clone(), Some(alice), post.id));
    thread.set_draft("only once");

    let first = tokio::spawn({
        let thread = thread.clone();
        async move { thread.add_comment().await }
    });
    api.entered.notified().await;
    assert!(thread.snapshot().submitting);

    let second = thread.add_comment().await.unwrap_err();
    assert_eq!(
        second,
        ClientError::InFlight("Comment is already being submitted".to_string())
    );

    api.release.notify_one();
    first.await.unwrap().unwrap();

    assert_eq!(api.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(thread.count(), 1);
}

#[tokio::test]
async fn test_reload_during_add_shows_comment_once() {
    let api = Arc::new(FakeApi::new());
    let alice = api.sign_in("alice");
    let post = api.seed_post(&alice);
    api.hold_creates.store(true, Ordering::SeqCst);

    let thread = Arc::new(CommentThread::new(api.clone(), Some(alice), post.id));
    thread.set_draft("racing a reload");

    let add = tokio::spawn({
        let thread = thread.clone();
        async move { thread.add_comment().await }
    });
    api.entered.notified().await;

    // the server already has the comment; the reload picks it up first
    thread.load().await.unwrap();
    assert_eq!(thread.count(), 1);

    api.release.notify_one();
    let created = add.await.unwrap().unwrap();

    let state = thread.snapshot();
    let server = api.comments.lock().unwrap().len();
    assert_eq!(state.count(), server);
    assert_eq!(state.comments[0].comment, created);
}

#[tokio::test]
async fn test_reload_keeps_pending_delete_in_flight() {
    let api = Arc::new(FakeApi::new());
    let bob = api.sign_in("bob");
    let post = api.seed_post(&bob);
    let comment_id = api.seed_comment(post.id, &bob, "going away", 1).id;
    api.hold_deletes.store(true, Ordering::SeqCst);

    let thread = Arc::new(CommentThread::new(api.clone(), Some(bob), post.id));
    thread.load().await.unwrap();
    thread.request_delete(comment_id).unwrap();

    let delete = tokio::spawn({
        let thread = thread.clone();
        async move { thread.confirm_delete(comment_id).await }
    });
    api.entered.notified().await;

    thread.load().await.unwrap();
    assert!(thread.snapshot().comments[0].in_flight);
    let second = thread.confirm_delete(comment_id).await.unwrap_err();
    assert_eq!(
        second,
        ClientError::InFlight("Comment is already being deleted".to_string())
    );

    api.release.notify_one();
    delete.await.unwrap().unwrap();

    assert_eq!(thread.count(), 0);
    let deletes = api
        .calls()
        .into_iter()
        .filter(|c| *c == "delete_comment")
        .count();
    assert_eq!(deletes, 1);
}

#[tokio::test]
async fn test_add_comment_failure_keeps_draft() {
    let api = Arc::new(FakeApi::new());
    let alice = api.sign_in("alice");
    let post = api.seed_post(&alice);

    let thread = CommentThread::new(api.clone(), Some(alice), post.id);
    thread.set_draft("hello");
    api.offline.store(true, Ordering::SeqCst);
    thread.add_comment().await.unwrap_err();

    let state = thread.snapshot();
    assert_eq!(state.draft, "hello");
    assert_eq!(
        state.form_error.as_deref(),
        Some("Something went wrong. Please try again.")
    );
    assert_eq!(state.count(), 0);
}

#[tokio::test]
async fn test_edit_flow_replaces_entry() {
    let api = Arc::new(FakeApi::new());
    let bob = api.sign_in("bob");
    let post = api.seed_post(&bob);
    let comment = api.seed_comment(post.id, &bob, "nice post", 1);

    let thread = CommentThread::new(api.clone(), Some(bob), post.id);
    thread.load().await.unwrap();
    assert!(thread.can_edit(comment.id));

    thread.begin_edit(comment.id).unwrap();
    assert_eq!(
        thread.snapshot().comments[0].mode,
        CommentMode::Editing {
            draft: "nice post".to_string()
        }
    );

    thread.set_edit_draft(comment.id, "nice post, really").unwrap();
    let updated = thread.submit_edit(comment.id).await.unwrap();

    let view = thread.snapshot().comments[0].clone();
    assert_eq!(view.mode, CommentMode::Viewing);
    assert_eq!(view.comment, updated);
    assert_eq!(view.comment.body, "nice post, really");
    assert!(view.comment.last_edited.is_some());
}

#[tokio::test]
async fn test_unchanged_edit_stays_in_edit_mode() {
    let api = Arc::new(FakeApi::new());
    let bob = api.sign_in("bob");
    let post = api.seed_post(&bob);
    let comment = api.seed_comment(post.id, &bob, "nice post", 1);

    let thread = CommentThread::new(api.clone(), Some(bob), post.id);
    thread.load().await.unwrap();
    thread.begin_edit(comment.id).unwrap();
    thread.submit_edit(comment.id).await.unwrap_err();

    let view = thread.snapshot().comments[0].clone();
    assert_eq!(view.error.as_deref(), Some("No changes made to the comment."));
    assert!(matches!(view.mode, CommentMode::Editing { .. }));
    assert_eq!(view.comment, comment);
    assert!(!api.calls().contains(&"update_comment"));

    thread.cancel_edit(comment.id);
    let view = thread.snapshot().comments[0].clone();
    assert_eq!(view.mode, CommentMode::Viewing);
    assert_eq!(view.error, None);
}

#[tokio::test]
async fn test_failed_edit_stays_in_edit_mode() {
    let api = Arc::new(FakeApi::new());
    let bob = api.sign_in("bob");
    let post = api.seed_post(&bob);
    let comment = api.seed_comment(post.id, &bob, "nice post", 1);

    let thread = CommentThread::new(api.clone(), Some(bob), post.id);
    thread.load().await.unwrap();
    thread.begin_edit(comment.id).unwrap();
    thread.set_edit_draft(comment.id, "nice post, really").unwrap();

    api.offline.store(true, Ordering::SeqCst);
    let err = thread.submit_edit(comment.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));

    let view = thread.snapshot().comments[0].clone();
    assert_eq!(
        view.mode,
        CommentMode::Editing {
            draft: "nice post, really".to_string()
        }
    );
    assert_eq!(
        view.error.as_deref(),
        Some("Something went wrong. Please try again.")
    );
    assert_eq!(view.comment, comment);
    assert!(!view.in_flight);
    assert_eq!(api.comments.lock().unwrap()[0].body, "nice post");
}

#[tokio::test]
async fn test_edit_rejected_by_server_changes_nothing() {
    let api = Arc::new(FakeApi::new());
    let bob = api.sign_in("bob");
    let post = api.seed_post(&bob);
    let comment = api.seed_comment(post.id, &bob, "nice post", 1);

    // owner locally, but the server no longer accepts the token
    let stale = Session::new(bob.identity().clone(), "expired-token");
    let thread = CommentThread::new(api.clone(), Some(stale), post.id);
    thread.load().await.unwrap();
    thread.begin_edit(comment.id).unwrap();
    thread.set_edit_draft(comment.id, "nice post, really").unwrap();

    let err = thread.submit_edit(comment.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected { status: 401, .. }));

    let view = thread.snapshot().comments[0].clone();
    assert!(matches!(view.mode, CommentMode::Editing { .. }));
    assert_eq!(view.error.as_deref(), Some("Token is not valid"));
    assert_eq!(view.comment, comment);

    // once accepted, the same draft goes through
    let thread = CommentThread::new(api.clone(), Some(bob), post.id);
    thread.load().await.unwrap();
    thread.begin_edit(comment.id).unwrap();
    thread.set_edit_draft(comment.id, "nice post, really").unwrap();
    thread.submit_edit(comment.id).await.unwrap();
    assert_eq!(api.comments.lock().unwrap()[0].body, "nice post, really");
}

#[tokio::test]
async fn test_non_owner_cannot_submit_edit() {
    let api = Arc::new(FakeApi::new());
    let bob = api.sign_in("bob");
    let eve = api.sign_in("eve");
    let post = api.seed_post(&bob);
    let comment = api.seed_comment(post.id, &bob, "mine", 1);

    let thread = CommentThread::new(api.clone(), Some(eve), post.id);
    thread.load().await.unwrap();
    assert!(!thread.can_edit(comment.id));

    thread.begin_edit(comment.id).unwrap();
    thread.set_edit_draft(comment.id, "yours now").unwrap();
    let err = thread.submit_edit(comment.id).await.unwrap_err();

    assert_eq!(
        err.user_message(),
        "You do not have permission to edit this comment."
    );
    assert!(!api.calls().contains(&"update_comment"));
}

#[tokio::test]
async fn test_delete_network_failure_keeps_comment() {
    let api = Arc::new(FakeApi::new());
    let bob = api.sign_in("bob");
    let post = api.seed_post(&bob);
    let comment = api.seed_comment(post.id, &bob, "keep me", 1);

    let thread = CommentThread::new(api.clone(), Some(bob), post.id);
    thread.load().await.unwrap();
    thread.request_delete(comment.id).unwrap();

    api.offline.store(true, Ordering::SeqCst);
    let err = thread.confirm_delete(comment.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));

    let state = thread.snapshot();
    assert_eq!(state.count(), 1);
    let view = &state.comments[0];
    assert_eq!(view.comment, comment);
    assert_eq!(
        view.error.as_deref(),
        Some("Something went wrong. Please try again.")
    );
    assert!(!view.in_flight);
}

#[tokio::test]
async fn test_delete_removes_after_confirmation() {
    let api = Arc::new(FakeApi::new());
    let bob = api.sign_in("bob");
    let post = api.seed_post(&bob);
    let comment = api.seed_comment(post.id, &bob, "bye", 1);

    let thread = CommentThread::new(api.clone(), Some(bob), post.id);
    thread.load().await.unwrap();
    thread.request_delete(comment.id).unwrap();
    assert_eq!(
        thread.snapshot().comments[0].mode,
        CommentMode::ConfirmingDelete
    );

    thread.confirm_delete(comment.id).await.unwrap();
    assert_eq!(thread.count(), 0);
}

#[tokio::test]
async fn test_server_rejection_message_surfaces() {
    let api = Arc::new(FakeApi::new());
    let bob = api.sign_in("bob");
    let eve = api.sign_in("eve");
    let post = api.seed_post(&bob);
    let comment = api.seed_comment(post.id, &bob, "bob's", 1);

    let thread = CommentThread::new(api.clone(), Some(eve), post.id);
    thread.load().await.unwrap();
    thread.confirm_delete(comment.id).await.unwrap_err();

    let view = thread.snapshot().comments[0].clone();
    assert_eq!(view.error.as_deref(), Some("User not authorized"));
}

#[test]
fn test_visibility_toggle() {
    let api = Arc::new(FakeApi::new());
    let thread = CommentThread::new(api, None, uuid::Uuid::new_v4());
    assert!(!thread.snapshot().visible);
    assert!(thread.toggle_visible());
    assert!(!thread.toggle_visible());
}
