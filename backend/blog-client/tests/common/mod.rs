//! In-process `BlogApi` double for reconciler tests

#![allow(dead_code)]

use async_trait::async_trait;
use blog_client::models::Identity;
use blog_client::{BlogApi, ClientError, Comment, DeletionReceipt, Post, Result, Session};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;
use uuid::Uuid;

/// Server double keeping posts and comments in memory.
///
/// Tokens are the user id in string form.
#[derive(Default)]
pub struct FakeApi {
    pub posts: Mutex<HashMap<Uuid, Post>>,
    pub comments: Mutex<Vec<Comment>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub create_calls: AtomicUsize,
    /// Every call fails with a network error while set
    pub offline: AtomicBool,
    /// When set, `create_comment` stores the comment, then parks until
    /// `release` is notified
    pub hold_creates: AtomicBool,
    /// When set, `delete_comment` parks before removing anything
    pub hold_deletes: AtomicBool,
    /// `delete_post` removes the post but reports a failed comment cascade
    pub cascade_fails: AtomicBool,
    /// `purge_comments` answers with a server error
    pub purge_fails: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
    users: Mutex<HashMap<String, Identity>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, name: &str) -> Session {
        let identity = Identity::new(Uuid::new_v4(), name);
        let token = identity.id.to_string();
        self.users
            .lock()
            .unwrap()
            .insert(token.clone(), identity.clone());
        Session::new(identity, token)
    }

    pub fn seed_post(&self, owner: &Session) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            user: owner.identity().clone(),
            title: "Hello".to_string(),
            body: "World".to_string(),
            create_date: Utc::now(),
            last_edited: None,
        };
        self.posts.lock().unwrap().insert(post.id, post.clone());
        post
    }

    pub fn seed_comment(
        &self,
        post_id: Uuid,
        author: &Session,
        body: &str,
        minutes_ago: i64,
    ) -> Comment {
        let comment = Comment {
            id: Uuid::new_v4(),
            user: author.identity().clone(),
            post_id,
            body: body.to_string(),
            create_date: Utc::now() - Duration::minutes(minutes_ago),
            last_edited: None,
        };
        self.comments.lock().unwrap().push(comment.clone());
        comment
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        Ok(())
    }

    async fn park(&self, hold: &AtomicBool) {
        if hold.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    fn caller(&self, token: &str) -> Result<Identity> {
        self.users
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(ClientError::Rejected {
                status: 401,
                msg: "Token is not valid".to_string(),
            })
    }
}

fn forbidden() -> ClientError {
    ClientError::Rejected {
        status: 403,
        msg: "User not authorized".to_string(),
    }
}

fn not_found(what: &str) -> ClientError {
    ClientError::Rejected {
        status: 404,
        msg: format!("{} not found", what),
    }
}

#[async_trait]
impl BlogApi for FakeApi {
    async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.record("get_post")?;
        self.posts
            .lock()
            .unwrap()
            .get(&post_id)
            .cloned()
            .ok_or_else(|| not_found("Post"))
    }

    async fn create_post(&self, token: &str, title: &str, body: &str) -> Result<Post> {
        self.record("create_post")?;
        let user = self.caller(token)?;
        let post = Post {
            id: Uuid::new_v4(),
            user,
            title: title.to_string(),
            body: body.to_string(),
            create_date: Utc::now(),
            last_edited: None,
        };
        self.posts.lock().unwrap().insert(post.id, post.clone());
        Ok(post)
    }

    async fn edit_post(
        &self,
        token: &str,
        post_id: Uuid,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<Post> {
        self.record("edit_post")?;
        let user = self.caller(token)?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts.get_mut(&post_id).ok_or_else(|| not_found("Post"))?;
        if !post.user.same_user(&user) {
            return Err(forbidden());
        }
        if let Some(title) = title {
            post.title = title.to_string();
        }
        if let Some(body) = body {
            post.body = body.to_string();
        }
        post.last_edited = Some(Utc::now());
        Ok(post.clone())
    }

    async fn delete_post(&self, token: &str, post_id: Uuid) -> Result<DeletionReceipt> {
        self.record("delete_post")?;
        let user = self.caller(token)?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts.get(&post_id).ok_or_else(|| not_found("Post"))?;
        if !post.user.same_user(&user) {
            return Err(forbidden());
        }
        posts.remove(&post_id);
        if self.cascade_fails.load(Ordering::SeqCst) {
            return Err(ClientError::CascadeFailure {
                post_id,
                msg: "Post deleted, but its comments could not be removed".to_string(),
            });
        }
        Ok(DeletionReceipt {
            post_id,
            comments_deleted: 0,
        })
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.record("list_comments")?;
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn create_comment(&self, token: &str, post_id: Uuid, body: &str) -> Result<Comment> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.record("create_comment")?;
        let user = self.caller(token)?;
        let comment = Comment {
            id: Uuid::new_v4(),
            user,
            post_id,
            body: body.to_string(),
            create_date: Utc::now(),
            last_edited: None,
        };
        self.comments.lock().unwrap().push(comment.clone());
        self.park(&self.hold_creates).await;
        Ok(comment)
    }

    async fn update_comment(&self, token: &str, comment_id: Uuid, body: &str) -> Result<Comment> {
        self.record("update_comment")?;
        let user = self.caller(token)?;
        let mut comments = self.comments.lock().unwrap();
        let comment = comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| not_found("Comment"))?;
        if !comment.user.same_user(&user) {
            return Err(forbidden());
        }
        comment.body = body.to_string();
        comment.last_edited = Some(Utc::now());
        Ok(comment.clone())
    }

    async fn delete_comment(&self, token: &str, comment_id: Uuid) -> Result<()> {
        self.record("delete_comment")?;
        self.park(&self.hold_deletes).await;
        let user = self.caller(token)?;
        let mut comments = self.comments.lock().unwrap();
        let index = comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or_else(|| not_found("Comment"))?;
        if !comments[index].user.same_user(&user) {
            return Err(forbidden());
        }
        comments.remove(index);
        Ok(())
    }

    async fn purge_comments(&self, token: &str, post_id: Uuid) -> Result<DeletionReceipt> {
        self.record("purge_comments")?;
        self.caller(token)?;
        if self.purge_fails.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                status: 500,
                msg: "Server error".to_string(),
            });
        }
        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.post_id != post_id);
        Ok(DeletionReceipt {
            post_id,
            comments_deleted: (before - comments.len()) as u64,
        })
    }
}
