/// Post service - handles post creation, retrieval, editing and deletion
use super::edit_timestamp;
use crate::db::{CommentRepository, PostRepository};
use crate::error::{AppError, Result};
use crate::middleware::ensure_can_mutate;
use crate::models::{CreatePostRequest, Identity, Post, UpdatePostRequest};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Outcome of a post deletion or a comment purge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDeletion {
    pub post_id: Uuid,
    pub comments_deleted: u64,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    async fn load(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .find(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Create a new post owned by `caller`
    pub async fn create_post(&self, caller: &Identity, req: CreatePostRequest) -> Result<Post> {
        req.validate()
            .map_err(|e| AppError::from_validation(e, &["title", "body"]))?;

        let post = Post {
            id: Uuid::new_v4(),
            user: caller.clone(),
            title: req.title,
            body: req.body,
            create_date: Utc::now(),
            last_edited: None,
        };
        self.posts.insert(&post).await?;

        tracing::info!(post_id = %post.id, user_id = %caller.id, "post created");
        Ok(post)
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.load(post_id).await
    }

    /// Edit title and/or body of a post
    pub async fn edit_post(
        &self,
        caller: &Identity,
        post_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Post> {
        let current = self.load(post_id).await?;
        ensure_can_mutate(&current.user, caller)?;

        if req.title.is_none() && req.body.is_none() {
            return Err(AppError::validation(
                "request",
                "Provide a title or body to update",
            ));
        }
        req.validate()
            .map_err(|e| AppError::from_validation(e, &["title", "body"]))?;

        let title = req.title.unwrap_or_else(|| current.title.clone());
        let body = req.body.unwrap_or_else(|| current.body.clone());
        if title == current.title && body == current.body {
            return Err(AppError::validation("request", "No changes made to the post."));
        }

        let updated = Post {
            title,
            body,
            last_edited: Some(edit_timestamp(current.create_date)),
            ..current
        };
        if !self.posts.update(&updated).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        tracing::info!(%post_id, user_id = %caller.id, "post edited");
        Ok(updated)
    }

    /// Delete a post and every comment attached to it.
    ///
    /// The post row goes first. If the comments cannot be removed afterwards
    /// the caller gets `CascadeFailure` and may retry via `purge_comments`.
    pub async fn delete_post(&self, caller: &Identity, post_id: Uuid) -> Result<PostDeletion> {
        let post = self.load(post_id).await?;
        ensure_can_mutate(&post.user, caller)?;

        if !self.posts.delete(post_id).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let comments_deleted = match self.comments.delete_by_post(post_id).await {
            Ok(count) => count,
            Err(source) => {
                tracing::error!(
                    %post_id,
                    user_id = %caller.id,
                    error = %source,
                    "post deleted but comment cascade failed; orphaned comments remain"
                );
                return Err(AppError::CascadeFailure { post_id, source });
            }
        };

        tracing::info!(%post_id, comments_deleted, "post deleted");
        Ok(PostDeletion {
            post_id,
            comments_deleted,
        })
    }

    /// Remove every comment of a post.
    ///
    /// While the post exists only its owner may purge. Once the post is gone
    /// any authenticated caller may clean up what a failed cascade left.
    pub async fn purge_comments(&self, caller: &Identity, post_id: Uuid) -> Result<PostDeletion> {
        if let Some(post) = self.posts.find(post_id).await? {
            ensure_can_mutate(&post.user, caller)?;
        }

        let comments_deleted = self.comments.delete_by_post(post_id).await?;
        tracing::info!(%post_id, user_id = %caller.id, comments_deleted, "post comments purged");

        Ok(PostDeletion {
            post_id,
            comments_deleted,
        })
    }
}
