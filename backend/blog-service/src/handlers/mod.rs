/// HTTP handlers for blog endpoints
///
/// This module contains handlers for:
/// - Posts: create, read, edit, delete (cascading to comments)
/// - Comments: create, list, edit, delete, purge by post
///
/// Mutating routes receive the caller through `AuthenticatedUser`, which the
/// authorization gate resolves before any handler runs.
use crate::error::AppError;
use actix_web::{web, HttpResponse};

pub mod comments;
pub mod posts;

// Re-export handler functions at module level
pub use comments::{create_comment, delete_comment, list_comments, purge_comments, update_comment};
pub use posts::{create_post, delete_post, get_post, update_post};

/// Register every API route. Mounted under `/api` by the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .route("/health", web::get().to(health))
        .service(web::resource("/posts").route(web::post().to(create_post)))
        .service(
            web::resource("/posts/{post_id}")
                .route(web::get().to(get_post))
                .route(web::put().to(update_post))
                .route(web::delete().to(delete_post)),
        )
        .service(
            web::resource("/posts/{post_id}/comments")
                .route(web::get().to(list_comments))
                .route(web::post().to(create_comment))
                .route(web::delete().to(purge_comments)),
        )
        .service(
            web::resource("/comments/{comment_id}")
                .route(web::put().to(update_comment))
                .route(web::delete().to(delete_comment)),
        );
}

/// Malformed or mistyped JSON bodies use the validation error shape
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "rejected request body");
        AppError::validation("request", &format!("Invalid JSON body: {}", err)).into()
    })
}

/// Ids that are not UUIDs cannot name any resource
fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| AppError::NotFound("Resource not found".to_string()).into())
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "blog-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
