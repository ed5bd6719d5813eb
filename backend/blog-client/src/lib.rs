//! # Blog Client
//!
//! Client-side half of Quill: an HTTP API client and the state a UI keeps
//! for a post and its comment thread.
//!
//! Every mutating flow follows the same shape: mark the action in flight,
//! call the server, then either commit the server's answer to local state or
//! attach an error. Nothing is changed locally before the server confirms.
//!
//! ## Modules
//! - `api`: `BlogApi` trait and its reqwest implementation
//! - `thread`: comment list state (`CommentThread`)
//! - `post_view`: post detail state and the delete-post flow
//! - `session`: the signed-in identity and its token

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod post_view;
pub mod session;
pub mod thread;

pub use api::{BlogApi, HttpBlogApi};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use models::{Comment, DeletionReceipt, Post};
pub use post_view::{Confirm, DeleteOutcome, PostView};
pub use session::Session;
pub use thread::{CommentMode, CommentThread, CommentView, ThreadState};
