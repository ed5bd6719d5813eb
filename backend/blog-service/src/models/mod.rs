/// Data models for blog-service
///
/// This module defines structures for:
/// - Post: a titled text entry owned by its author
/// - Comment: a short reply attached to exactly one post
/// - Request bodies accepted by the HTTP layer, with their validation rules
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub use crypto_core::jwt::Identity;

/// Maximum comment body length, in characters
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Maximum post title length, in characters
pub const MAX_TITLE_LENGTH: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user: Identity,
    pub title: String,
    pub body: String,
    pub create_date: DateTime<Utc>,
    pub last_edited: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Identity,
    pub post_id: Uuid,
    pub body: String,
    pub create_date: DateTime<Utc>,
    pub last_edited: Option<DateTime<Utc>>,
}

/// Postgres row for `posts`
#[derive(Debug, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub last_edited: Option<DateTime<Utc>>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            user: Identity::new(row.user_id, row.user_name),
            title: row.title,
            body: row.body,
            create_date: row.created_at,
            last_edited: row.last_edited,
        }
    }
}

/// Postgres row for `comments`
#[derive(Debug, sqlx::FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub post_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub last_edited: Option<DateTime<Utc>>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            user: Identity::new(row.user_id, row.user_name),
            post_id: row.post_id,
            body: row.body,
            create_date: row.created_at,
            last_edited: row.last_edited,
        }
    }
}

// =====================================================================
// Request bodies
// =====================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(
        custom(function = "not_blank_title"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank_body"))]
    pub body: String,
}

/// Partial post edit; omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(
        custom(function = "not_blank_title"),
        length(max = 200, message = "Title cannot exceed 200 characters")
    )]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank_body"))]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(
        custom(function = "not_blank_comment"),
        length(max = 1000, message = "Comment body cannot exceed 1000 characters")
    )]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommentRequest {
    pub body: String,
}

fn blank(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(message.into()));
    }
    Ok(())
}

fn not_blank_title(value: &str) -> Result<(), ValidationError> {
    blank(value, "Title is required")
}

fn not_blank_body(value: &str) -> Result<(), ValidationError> {
    blank(value, "Body is required")
}

fn not_blank_comment(value: &str) -> Result<(), ValidationError> {
    blank(value, "Comment body is required")
}
