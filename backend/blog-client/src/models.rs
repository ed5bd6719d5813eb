//! Wire types returned by the blog API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crypto_core::jwt::Identity;

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

/// Server acknowledgement of a post deletion or comment purge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReceipt {
    pub post_id: Uuid,
    pub comments_deleted: u64,
}
