//! Shared fixtures for blog-service integration tests

#![allow(dead_code)]

use actix_middleware::AuthorizationGate;
use actix_web::{body, body::MessageBody, dev::ServiceResponse, http::StatusCode, test};
use async_trait::async_trait;
use blog_service::db::{CommentRepository, InMemoryStore, RepoError, RepoResult};
use blog_service::models::{Comment, Identity};
use blog_service::AppState;
use chrono::{DateTime, Duration, Utc};
use crypto_core::jwt::{TokenSigner, TokenVerifier};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestContext {
    pub store: InMemoryStore,
    pub state: AppState,
    signer: TokenSigner,
    cascade_broken: Arc<AtomicBool>,
}

impl TestContext {
    /// Application backed by a fresh in-memory store
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let comments: Arc<dyn CommentRepository> = Arc::new(store.clone());
        Self::with_comments(store, comments, Arc::new(AtomicBool::new(false)))
    }

    /// Application whose comment cascade fails until `repair_cascade`
    pub fn with_broken_cascade() -> Self {
        let store = InMemoryStore::new();
        let broken = Arc::new(AtomicBool::new(true));
        let comments: Arc<dyn CommentRepository> = Arc::new(BrokenCascade {
            store: store.clone(),
            broken: broken.clone(),
        });
        Self::with_comments(store, comments, broken)
    }

    fn with_comments(
        store: InMemoryStore,
        comments: Arc<dyn CommentRepository>,
        cascade_broken: Arc<AtomicBool>,
    ) -> Self {
        let gate = AuthorizationGate::new(Arc::new(TokenVerifier::from_secret(SECRET)));
        Self {
            state: AppState::new(Arc::new(store.clone()), comments, gate),
            store,
            signer: TokenSigner::from_secret(SECRET),
            cascade_broken,
        }
    }

    /// Let bulk comment deletion succeed again
    pub fn repair_cascade(&self) {
        self.cascade_broken.store(false, Ordering::SeqCst);
    }

    pub fn token(&self, user: &Identity) -> String {
        self.signer.sign(user, Some(Duration::hours(1))).unwrap()
    }

    pub fn expired_token(&self, user: &Identity) -> String {
        let issued = Utc::now() - Duration::hours(2);
        self.signer
            .sign_at(user, issued, Some(Duration::hours(1)))
            .unwrap()
    }
}

pub fn user(name: &str) -> Identity {
    Identity::new(Uuid::new_v4(), name)
}

/// Status and JSON body of a response, including middleware rejections
pub async fn respond<B: MessageBody>(
    result: Result<ServiceResponse<B>, actix_web::Error>,
) -> (StatusCode, Value) {
    match result {
        Ok(res) => {
            let status = res.status();
            let bytes = test::read_body(res).await;
            (status, parse(&bytes))
        }
        Err(err) => {
            let res = err.error_response();
            let status = res.status();
            let bytes = body::to_bytes(res.into_body()).await.unwrap();
            (status, parse(&bytes))
        }
    }
}

fn parse(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap()
    }
}

/// Comment storage whose bulk delete fails while `broken` is set
struct BrokenCascade {
    store: InMemoryStore,
    broken: Arc<AtomicBool>,
}

#[async_trait]
impl CommentRepository for BrokenCascade {
    async fn insert(&self, comment: &Comment) -> RepoResult<()> {
        CommentRepository::insert(&self.store, comment).await
    }

    async fn find(&self, comment_id: Uuid) -> RepoResult<Option<Comment>> {
        CommentRepository::find(&self.store, comment_id).await
    }

    async fn list_by_post(&self, post_id: Uuid) -> RepoResult<Vec<Comment>> {
        self.store.list_by_post(post_id).await
    }

    async fn update_body(
        &self,
        comment_id: Uuid,
        body: &str,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<Option<Comment>> {
        self.store.update_body(comment_id, body, edited_at).await
    }

    async fn delete(&self, comment_id: Uuid) -> RepoResult<bool> {
        CommentRepository::delete(&self.store, comment_id).await
    }

    async fn delete_by_post(&self, post_id: Uuid) -> RepoResult<u64> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("connection reset".to_string()));
        }
        self.store.delete_by_post(post_id).await
    }
}
