/// Blog Service Library
///
/// Posts and comments for Quill: registered users publish posts, comment on
/// them, and only the author of a post or comment may edit or delete it.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Posts, comments and request bodies
/// - `services`: Resource lifecycle (ownership checks, comment cascade)
/// - `db`: Repository traits with Postgres and in-memory backends
/// - `middleware`: Ownership policy
/// - `error`: Error types and their HTTP rendering
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use actix_middleware::AuthorizationGate;
use actix_web::web;
use db::{CommentRepository, PostRepository};
use services::{CommentService, PostService};
use std::sync::Arc;

/// Everything the HTTP layer needs, cloned into each worker
#[derive(Clone)]
pub struct AppState {
    pub posts: web::Data<PostService>,
    pub comments: web::Data<CommentService>,
    pub gate: AuthorizationGate,
}

impl AppState {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        gate: AuthorizationGate,
    ) -> Self {
        Self {
            posts: web::Data::new(PostService::new(posts.clone(), comments.clone())),
            comments: web::Data::new(CommentService::new(posts, comments)),
            gate,
        }
    }

    /// Mount the `/api` scope behind the authorization gate
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.posts.clone())
            .app_data(self.comments.clone())
            .service(
                web::scope("/api")
                    .wrap(self.gate.clone())
                    .configure(handlers::configure),
            );
    }
}
