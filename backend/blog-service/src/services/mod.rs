/// Business logic layer for blog-service
///
/// This module provides the resource lifecycle:
/// - Post service: create, read, edit, delete (with comment cascade)
/// - Comment service: create, list, edit, delete
///
/// Every mutating operation takes the caller's `Identity` explicitly and
/// consults the ownership policy before touching storage.
use chrono::{DateTime, Duration, Utc};

pub mod comments;
pub mod posts;

pub use comments::CommentService;
pub use posts::{PostDeletion, PostService};

/// Timestamp for an edit, strictly after the resource's creation time.
pub(crate) fn edit_timestamp(created: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(created + Duration::microseconds(1))
}
