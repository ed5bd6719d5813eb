use super::{CommentRepository, PostRepository, RepoResult};
use crate::models::{Comment, Post};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local storage for posts and comments.
///
/// Used when no `DATABASE_URL` is configured, and by the test suites.
/// Clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    posts: Arc<RwLock<HashMap<Uuid, Post>>>,
    comments: Arc<RwLock<CommentTable>>,
}

/// Comments keyed by id, each tagged with its insertion sequence so that
/// equal creation timestamps still list in a stable order.
#[derive(Default)]
struct CommentTable {
    next_seq: u64,
    rows: HashMap<Uuid, (u64, Comment)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn comment_count(&self, post_id: Uuid) -> usize {
        self.comments
            .read()
            .await
            .rows
            .values()
            .filter(|(_, c)| c.post_id == post_id)
            .count()
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn insert(&self, post: &Post) -> RepoResult<()> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn find(&self, post_id: Uuid) -> RepoResult<Option<Post>> {
        Ok(self.posts.read().await.get(&post_id).cloned())
    }

    async fn update(&self, post: &Post) -> RepoResult<bool> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&post.id) {
            Some(stored) => {
                stored.title = post.title.clone();
                stored.body = post.body.clone();
                stored.last_edited = post.last_edited;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, post_id: Uuid) -> RepoResult<bool> {
        Ok(self.posts.write().await.remove(&post_id).is_some())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn insert(&self, comment: &Comment) -> RepoResult<()> {
        let mut table = self.comments.write().await;
        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(comment.id, (seq, comment.clone()));
        Ok(())
    }

    async fn find(&self, comment_id: Uuid) -> RepoResult<Option<Comment>> {
        Ok(self
            .comments
            .read()
            .await
            .rows
            .get(&comment_id)
            .map(|(_, c)| c.clone()))
    }

    async fn list_by_post(&self, post_id: Uuid) -> RepoResult<Vec<Comment>> {
        let table = self.comments.read().await;
        let mut list: Vec<&(u64, Comment)> = table
            .rows
            .values()
            .filter(|(_, c)| c.post_id == post_id)
            .collect();
        list.sort_by_key(|(seq, c)| (c.create_date, *seq));
        Ok(list.into_iter().map(|(_, c)| c.clone()).collect())
    }

    async fn update_body(
        &self,
        comment_id: Uuid,
        body: &str,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<Option<Comment>> {
        let mut table = self.comments.write().await;
        Ok(table.rows.get_mut(&comment_id).map(|(_, stored)| {
            stored.body = body.to_string();
            stored.last_edited = Some(edited_at);
            stored.clone()
        }))
    }

    async fn delete(&self, comment_id: Uuid) -> RepoResult<bool> {
        Ok(self
            .comments
            .write()
            .await
            .rows
            .remove(&comment_id)
            .is_some())
    }

    async fn delete_by_post(&self, post_id: Uuid) -> RepoResult<u64> {
        let mut table = self.comments.write().await;
        let before = table.rows.len();
        table.rows.retain(|_, (_, c)| c.post_id != post_id);
        Ok((before - table.rows.len()) as u64)
    }
}
