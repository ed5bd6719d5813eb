use super::{CommentRepository, RepoResult};
use crate::models::{Comment, CommentRow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed comment storage
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn insert(&self, comment: &Comment) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, user_id, user_name, post_id, body, created_at, last_edited)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(comment.id)
        .bind(comment.user.id)
        .bind(&comment.user.name)
        .bind(comment.post_id)
        .bind(&comment.body)
        .bind(comment.create_date)
        .bind(comment.last_edited)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, comment_id: Uuid) -> RepoResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, user_id, user_name, post_id, body, created_at, last_edited
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    async fn list_by_post(&self, post_id: Uuid) -> RepoResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, user_id, user_name, post_id, body, created_at, last_edited
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn update_body(
        &self,
        comment_id: Uuid,
        body: &str,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE comments
            SET body = $1, last_edited = $2
            WHERE id = $3
            RETURNING id, user_id, user_name, post_id, body, created_at, last_edited
            "#,
        )
        .bind(body)
        .bind(edited_at)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    async fn delete(&self, comment_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_post(&self, post_id: Uuid) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
