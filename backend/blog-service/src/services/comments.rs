/// Comment service - handles comment creation, listing, editing and deletion
use super::edit_timestamp;
use crate::db::{CommentRepository, PostRepository};
use crate::error::{AppError, Result};
use crate::middleware::ensure_can_mutate;
use crate::models::{Comment, CreateCommentRequest, Identity, MAX_COMMENT_LENGTH};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    async fn load(&self, comment_id: Uuid) -> Result<Comment> {
        self.comments
            .find(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    /// Create a comment on an existing post
    pub async fn create_comment(
        &self,
        caller: &Identity,
        post_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<Comment> {
        if self.posts.find(post_id).await?.is_none() {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        req.validate()
            .map_err(|e| AppError::from_validation(e, &["body"]))?;

        let comment = Comment {
            id: Uuid::new_v4(),
            user: caller.clone(),
            post_id,
            body: req.body,
            create_date: Utc::now(),
            last_edited: None,
        };
        self.comments.insert(&comment).await?;

        tracing::info!(comment_id = %comment.id, %post_id, user_id = %caller.id, "comment created");
        Ok(comment)
    }

    /// Comments of a post, oldest first. Unknown posts have no comments.
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        Ok(self.comments.list_by_post(post_id).await?)
    }

    /// Replace the body of a comment.
    ///
    /// Checks run in a fixed order and the first failure wins: existence,
    /// ownership, blank body, unchanged body, length.
    pub async fn edit_comment(
        &self,
        caller: &Identity,
        comment_id: Uuid,
        body: &str,
    ) -> Result<Comment> {
        let current = self.load(comment_id).await?;
        ensure_can_mutate(&current.user, caller)?;

        if body.trim().is_empty() {
            return Err(AppError::validation("body", "Comment body cannot be empty."));
        }
        if body == current.body {
            return Err(AppError::validation("body", "No changes made to the comment."));
        }
        if body.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::validation(
                "body",
                "Comment body cannot exceed 1000 characters.",
            ));
        }

        let edited_at = edit_timestamp(current.create_date);
        let updated = self
            .comments
            .update_body(comment_id, body, edited_at)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        tracing::info!(%comment_id, user_id = %caller.id, "comment edited");
        Ok(updated)
    }

    /// Delete a comment owned by `caller`
    pub async fn delete_comment(&self, caller: &Identity, comment_id: Uuid) -> Result<()> {
        let comment = self.load(comment_id).await?;
        ensure_can_mutate(&comment.user, caller)?;

        if !self.comments.delete(comment_id).await? {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        tracing::info!(%comment_id, post_id = %comment.post_id, "comment deleted");
        Ok(())
    }
}
