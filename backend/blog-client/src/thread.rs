//! Comment list state for one post
//!
//! [`ThreadState`] is plain data and every transition on it rebuilds the
//! list from values the server confirmed. [`CommentThread`] drives the
//! remote calls and owns the state behind a mutex that is never held across
//! a call.

use crate::api::BlogApi;
use crate::error::{ClientError, Result};
use crate::models::Comment;
use crate::session::Session;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Longest accepted comment body, in characters
pub const MAX_COMMENT_LENGTH: usize = 1000;

const LOAD_FAILED: &str = "Failed to load comments. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentMode {
    Viewing,
    Editing { draft: String },
    ConfirmingDelete,
}

/// A comment as displayed, with the state of its controls
#[derive(Debug, Clone, PartialEq)]
pub struct CommentView {
    pub comment: Comment,
    pub mode: CommentMode,
    pub error: Option<String>,
    pub in_flight: bool,
}

impl CommentView {
    fn new(comment: Comment) -> Self {
        Self {
            comment,
            mode: CommentMode::Viewing,
            error: None,
            in_flight: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.comment.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadState {
    pub post_id: Uuid,
    pub comments: Vec<CommentView>,
    /// Text of the new-comment form
    pub draft: String,
    pub form_error: Option<String>,
    pub submitting: bool,
    pub visible: bool,
    pub loading: bool,
    pub load_error: Option<String>,
}

impl ThreadState {
    pub fn new(post_id: Uuid) -> Self {
        Self {
            post_id,
            comments: Vec::new(),
            draft: String::new(),
            form_error: None,
            submitting: false,
            visible: false,
            loading: false,
            load_error: None,
        }
    }

    pub fn count(&self) -> usize {
        self.comments.len()
    }

    pub fn find(&self, comment_id: Uuid) -> Option<&CommentView> {
        self.comments.iter().find(|v| v.id() == comment_id)
    }

    /// Replace the list with server data, oldest first.
    ///
    /// Comments already shown keep their mode, error and in-flight flag.
    fn with_loaded(&self, comments: Vec<Comment>) -> Vec<CommentView> {
        sorted(
            comments
                .into_iter()
                .map(|comment| match self.find(comment.id) {
                    Some(view) => CommentView {
                        comment,
                        ..view.clone()
                    },
                    None => CommentView::new(comment),
                })
                .collect(),
        )
    }

    /// Insert a confirmed comment, replacing any entry with the same id
    fn with_added(&self, comment: Comment) -> Vec<CommentView> {
        let mut list = self.without(comment.id);
        list.push(CommentView::new(comment));
        sorted(list)
    }

    fn with_updated<F>(&self, comment_id: Uuid, update: F) -> Vec<CommentView>
    where
        F: FnOnce(&CommentView) -> CommentView,
    {
        let mut update = Some(update);
        self.comments
            .iter()
            .map(|view| {
                if view.id() == comment_id {
                    if let Some(f) = update.take() {
                        return f(view);
                    }
                }
                view.clone()
            })
            .collect()
    }

    fn without(&self, comment_id: Uuid) -> Vec<CommentView> {
        self.comments
            .iter()
            .filter(|v| v.id() != comment_id)
            .cloned()
            .collect()
    }
}

fn sorted(mut list: Vec<CommentView>) -> Vec<CommentView> {
    list.sort_by_key(|v| v.comment.create_date);
    list
}

fn validate_new_comment(body: &str, session: Option<&Session>) -> Result<()> {
    if body.trim().is_empty() {
        return Err(ClientError::Validation("Comment body is required".to_string()));
    }
    if body.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ClientError::Validation(
            "Comment body cannot exceed 1000 characters".to_string(),
        ));
    }
    if session.is_none() {
        return Err(ClientError::Validation(
            "You must be logged in to post a comment".to_string(),
        ));
    }
    Ok(())
}

fn validate_edit(draft: &str, current: &Comment, session: Option<&Session>) -> Result<()> {
    if draft.trim().is_empty() {
        return Err(ClientError::Validation("Comment body cannot be empty.".to_string()));
    }
    if draft == current.body {
        return Err(ClientError::Validation("No changes made to the comment.".to_string()));
    }
    if draft.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ClientError::Validation(
            "Comment body cannot exceed 1000 characters.".to_string(),
        ));
    }
    if !session.is_some_and(|s| s.owns(&current.user)) {
        return Err(ClientError::Validation(
            "You do not have permission to edit this comment.".to_string(),
        ));
    }
    Ok(())
}

fn unknown_comment() -> ClientError {
    ClientError::Validation("Comment not found".to_string())
}

/// Comment section of a post detail view
pub struct CommentThread {
    api: Arc<dyn BlogApi>,
    session: Option<Session>,
    state: Mutex<ThreadState>,
}

impl CommentThread {
    pub fn new(api: Arc<dyn BlogApi>, session: Option<Session>, post_id: Uuid) -> Self {
        Self {
            api,
            session,
            state: Mutex::new(ThreadState::new(post_id)),
        }
    }

    fn state(&self) -> MutexGuard<'_, ThreadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn token(&self) -> Result<String> {
        self.session
            .as_ref()
            .map(|s| s.token().to_string())
            .ok_or(ClientError::NotSignedIn)
    }

    pub fn snapshot(&self) -> ThreadState {
        self.state().clone()
    }

    pub fn count(&self) -> usize {
        self.state().count()
    }

    /// Show or hide the comment section, returning the new visibility
    pub fn toggle_visible(&self) -> bool {
        let mut state = self.state();
        state.visible = !state.visible;
        state.visible
    }

    /// Whether the signed-in user may edit or delete a comment
    pub fn can_edit(&self, comment_id: Uuid) -> bool {
        let state = self.state();
        match (state.find(comment_id), self.session.as_ref()) {
            (Some(view), Some(session)) => session.owns(&view.comment.user),
            _ => false,
        }
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        let mut state = self.state();
        state.draft = text.into();
        state.form_error = None;
    }

    /// Fetch the post's comments, replacing whatever is shown
    pub async fn load(&self) -> Result<()> {
        let post_id = {
            let mut state = self.state();
            state.loading = true;
            state.load_error = None;
            state.post_id
        };

        let result = self.api.list_comments(post_id).await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(comments) => {
                state.comments = state.with_loaded(comments);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%post_id, error = %err, "failed to load comments");
                state.load_error = Some(LOAD_FAILED.to_string());
                Err(err)
            }
        }
    }

    /// Submit the new-comment draft
    pub async fn add_comment(&self) -> Result<Comment> {
        let (post_id, body, token) = {
            let mut state = self.state();
            let checked = validate_new_comment(&state.draft, self.session.as_ref())
                .and_then(|_| self.token());
            let token = match checked {
                Ok(token) => token,
                Err(err) => {
                    state.form_error = Some(err.user_message());
                    return Err(err);
                }
            };
            if state.submitting {
                return Err(ClientError::InFlight(
                    "Comment is already being submitted".to_string(),
                ));
            }
            state.submitting = true;
            state.form_error = None;
            (state.post_id, state.draft.clone(), token)
        };

        let result = self.api.create_comment(&token, post_id, &body).await;

        let mut state = self.state();
        state.submitting = false;
        match result {
            Ok(comment) => {
                state.comments = state.with_added(comment.clone());
                state.draft.clear();
                Ok(comment)
            }
            Err(err) => {
                state.form_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Enter edit mode with the current body as the draft
    pub fn begin_edit(&self, comment_id: Uuid) -> Result<()> {
        let mut state = self.state();
        let body = state
            .find(comment_id)
            .map(|v| v.comment.body.clone())
            .ok_or_else(unknown_comment)?;
        state.comments = state.with_updated(comment_id, |view| CommentView {
            mode: CommentMode::Editing { draft: body },
            error: None,
            ..view.clone()
        });
        Ok(())
    }

    pub fn set_edit_draft(&self, comment_id: Uuid, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        let mut state = self.state();
        match state.find(comment_id).map(|v| &v.mode) {
            Some(CommentMode::Editing { .. }) => {}
            Some(_) => {
                return Err(ClientError::Validation(
                    "Comment is not being edited".to_string(),
                ))
            }
            None => return Err(unknown_comment()),
        }
        state.comments = state.with_updated(comment_id, |view| CommentView {
            mode: CommentMode::Editing { draft: text },
            ..view.clone()
        });
        Ok(())
    }

    /// Leave edit mode, discarding the draft
    pub fn cancel_edit(&self, comment_id: Uuid) {
        let mut state = self.state();
        state.comments = state.with_updated(comment_id, |view| CommentView {
            mode: CommentMode::Viewing,
            error: None,
            ..view.clone()
        });
    }

    /// Save the edit draft of a comment
    pub async fn submit_edit(&self, comment_id: Uuid) -> Result<Comment> {
        let (draft, token) = {
            let mut state = self.state();
            let view = state.find(comment_id).ok_or_else(unknown_comment)?;
            let draft = match &view.mode {
                CommentMode::Editing { draft } => draft.clone(),
                _ => {
                    return Err(ClientError::Validation(
                        "Comment is not being edited".to_string(),
                    ))
                }
            };
            if view.in_flight {
                return Err(ClientError::InFlight(
                    "Comment edit is already being saved".to_string(),
                ));
            }

            let checked = validate_edit(&draft, &view.comment, self.session.as_ref())
                .and_then(|_| self.token());
            let token = match checked {
                Ok(token) => token,
                Err(err) => {
                    let message = err.user_message();
                    state.comments = state.with_updated(comment_id, |view| CommentView {
                        error: Some(message),
                        ..view.clone()
                    });
                    return Err(err);
                }
            };

            state.comments = state.with_updated(comment_id, |view| CommentView {
                in_flight: true,
                error: None,
                ..view.clone()
            });
            (draft, token)
        };

        let result = self.api.update_comment(&token, comment_id, &draft).await;

        let mut state = self.state();
        match result {
            Ok(updated) => {
                state.comments =
                    state.with_updated(comment_id, |_| CommentView::new(updated.clone()));
                Ok(updated)
            }
            Err(err) => {
                let message = err.user_message();
                state.comments = state.with_updated(comment_id, |view| CommentView {
                    in_flight: false,
                    error: Some(message),
                    ..view.clone()
                });
                Err(err)
            }
        }
    }

    /// Ask for delete confirmation
    pub fn request_delete(&self, comment_id: Uuid) -> Result<()> {
        let mut state = self.state();
        state.find(comment_id).ok_or_else(unknown_comment)?;
        state.comments = state.with_updated(comment_id, |view| CommentView {
            mode: CommentMode::ConfirmingDelete,
            error: None,
            ..view.clone()
        });
        Ok(())
    }

    pub fn cancel_delete(&self, comment_id: Uuid) {
        self.cancel_edit(comment_id)
    }

    /// Delete a comment; it disappears only once the server confirms
    pub async fn confirm_delete(&self, comment_id: Uuid) -> Result<()> {
        let token = {
            let mut state = self.state();
            let view = state.find(comment_id).ok_or_else(unknown_comment)?;
            if view.in_flight {
                return Err(ClientError::InFlight(
                    "Comment is already being deleted".to_string(),
                ));
            }
            let token = self.token()?;
            state.comments = state.with_updated(comment_id, |view| CommentView {
                in_flight: true,
                error: None,
                ..view.clone()
            });
            token
        };

        let result = self.api.delete_comment(&token, comment_id).await;

        let mut state = self.state();
        match result {
            Ok(()) => {
                state.comments = state.without(comment_id);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%comment_id, error = %err, "comment delete failed");
                let message = err.user_message();
                state.comments = state.with_updated(comment_id, |view| CommentView {
                    in_flight: false,
                    error: Some(message),
                    ..view.clone()
                });
                Err(err)
            }
        }
    }
}
