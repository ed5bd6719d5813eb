/// Database access layer
///
/// This module provides:
/// - Repository traits for posts and comments
/// - PostgreSQL implementations (`post_repo`, `comment_repo`)
/// - An in-memory implementation for development and tests (`memory`)
/// - Database migrations
use crate::models::{Comment, Post};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use uuid::Uuid;

pub mod comment_repo;
pub mod memory;
pub mod post_repo;

pub use comment_repo::PgCommentRepository;
pub use memory::InMemoryStore;
pub use post_repo::PgPostRepository;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// Storage for posts. Each call is atomic on its own.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> RepoResult<()>;

    async fn find(&self, post_id: Uuid) -> RepoResult<Option<Post>>;

    /// Replace title, body and `last_edited`; false when the post is gone.
    async fn update(&self, post: &Post) -> RepoResult<bool>;

    /// False when there was nothing to delete.
    async fn delete(&self, post_id: Uuid) -> RepoResult<bool>;
}

/// Storage for comments. Each call is atomic on its own.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: &Comment) -> RepoResult<()>;

    async fn find(&self, comment_id: Uuid) -> RepoResult<Option<Comment>>;

    async fn list_by_post(&self, post_id: Uuid) -> RepoResult<Vec<Comment>>;

    /// Set a new body and edit timestamp, returning the stored comment.
    async fn update_body(
        &self,
        comment_id: Uuid,
        body: &str,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<Option<Comment>>;

    async fn delete(&self, comment_id: Uuid) -> RepoResult<bool>;

    /// Remove every comment of a post, returning how many were removed.
    async fn delete_by_post(&self, post_id: Uuid) -> RepoResult<u64>;
}
