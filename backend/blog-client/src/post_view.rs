//! Post detail state and the delete-post flow

use crate::api::BlogApi;
use crate::error::{ClientError, Result};
use crate::models::Post;
use crate::session::Session;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub const DELETE_POST_PROMPT: &str =
    "Are you sure you want to delete this post? This action cannot be undone.";

const LOAD_FAILED: &str = "Failed to load post. It may not exist or the server is down.";
const DELETE_FAILED: &str = "Failed to delete post. Please try again.";

/// Asks the user to confirm a destructive action
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Where the UI should go after a delete attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    NavigateHome,
    /// Remain on the post; `error` is set when something failed
    Stay { error: Option<String> },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostViewState {
    pub post: Option<Post>,
    pub loading: bool,
    pub error: Option<String>,
    pub deleting: bool,
    /// The server removed the post; only the comment purge is outstanding
    pub post_removed: bool,
}

pub struct PostView {
    api: Arc<dyn BlogApi>,
    session: Option<Session>,
    post_id: Uuid,
    state: Mutex<PostViewState>,
}

impl PostView {
    pub fn new(api: Arc<dyn BlogApi>, session: Option<Session>, post_id: Uuid) -> Self {
        Self {
            api,
            session,
            post_id,
            state: Mutex::new(PostViewState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PostViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> PostViewState {
        self.state().clone()
    }

    pub async fn load(&self) -> Result<Post> {
        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
        }

        let result = self.api.get_post(self.post_id).await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok(post) => {
                state.post = Some(post.clone());
                Ok(post)
            }
            Err(err) => {
                tracing::warn!(post_id = %self.post_id, error = %err, "failed to load post");
                state.error = Some(LOAD_FAILED.to_string());
                Err(err)
            }
        }
    }

    /// Edit and delete controls are shown only to the author
    pub fn can_modify(&self) -> bool {
        let state = self.state();
        match (&self.session, &state.post) {
            (Some(session), Some(post)) => session.owns(&post.user),
            _ => false,
        }
    }

    /// Delete the post, then purge its comments.
    ///
    /// Nothing is sent unless `confirm` agrees. A cascade failure reported by
    /// the server still counts as a removed post and is followed by the
    /// purge. Any failure keeps the user on the view with a message; a retry
    /// after the post is gone only repeats the purge.
    pub async fn delete_post(&self, confirm: &dyn Confirm) -> DeleteOutcome {
        match self.try_delete(confirm).await {
            Ok(()) => DeleteOutcome::NavigateHome,
            Err(ClientError::Cancelled) => DeleteOutcome::Stay { error: None },
            Err(err) => DeleteOutcome::Stay {
                error: Some(delete_message(&err)),
            },
        }
    }

    async fn try_delete(&self, confirm: &dyn Confirm) -> Result<()> {
        if self.state().deleting {
            return Err(already_deleting());
        }
        if !confirm.confirm(DELETE_POST_PROMPT) {
            return Err(ClientError::Cancelled);
        }
        let token = self
            .session
            .as_ref()
            .map(|s| s.token().to_string())
            .ok_or(ClientError::NotSignedIn)?;

        let post_removed = {
            let mut state = self.state();
            if state.deleting {
                return Err(already_deleting());
            }
            state.deleting = true;
            state.error = None;
            state.post_removed
        };

        let result = self.delete_remote(&token, post_removed).await;

        let mut state = self.state();
        state.deleting = false;
        if state.post_removed {
            state.post = None;
        }
        match result {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(post_id = %self.post_id, error = %err, "post delete failed");
                state.error = Some(delete_message(&err));
                Err(err)
            }
        }
    }

    async fn delete_remote(&self, token: &str, post_removed: bool) -> Result<()> {
        if !post_removed {
            match self.api.delete_post(token, self.post_id).await {
                Ok(receipt) => {
                    tracing::debug!(
                        post_id = %receipt.post_id,
                        comments_deleted = receipt.comments_deleted,
                        "post deleted"
                    );
                }
                Err(ClientError::CascadeFailure { post_id, .. }) => {
                    tracing::warn!(%post_id, "post deleted without its comments; purging");
                }
                Err(err) => return Err(err),
            }
            self.state().post_removed = true;
        }

        let purge = self.api.purge_comments(token, self.post_id).await?;
        tracing::debug!(
            post_id = %purge.post_id,
            comments_deleted = purge.comments_deleted,
            "post comments purged"
        );
        Ok(())
    }
}

fn already_deleting() -> ClientError {
    ClientError::InFlight("Post is already being deleted".to_string())
}

fn delete_message(err: &ClientError) -> String {
    if err.is_unexpected() {
        DELETE_FAILED.to_string()
    } else {
        err.user_message()
    }
}
