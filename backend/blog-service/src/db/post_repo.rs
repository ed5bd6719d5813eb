use super::{PostRepository, RepoResult};
use crate::models::{Post, PostRow};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed post storage
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: &Post) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, user_id, user_name, title, body, created_at, last_edited)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(post.id)
        .bind(post.user.id)
        .bind(&post.user.name)
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.create_date)
        .bind(post.last_edited)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, post_id: Uuid) -> RepoResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, user_name, title, body, created_at, last_edited
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn update(&self, post: &Post) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, body = $2, last_edited = $3
            WHERE id = $4
            "#,
        )
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.last_edited)
        .bind(post.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, post_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
