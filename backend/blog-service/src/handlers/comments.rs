/// Comment handlers - HTTP endpoints for comment operations
use crate::error::Result;
use crate::models::{CreateCommentRequest, UpdateCommentRequest};
use crate::services::{CommentService, PostService};
use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// Create a new comment on a post
pub async fn create_comment(
    service: web::Data<CommentService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = service
        .create_comment(&user.0, post_id.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Get comments for a post
pub async fn list_comments(
    service: web::Data<CommentService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = service.list_comments(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Remove every comment of a post
pub async fn purge_comments(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let purge = service.purge_comments(&user.0, post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": "Comments removed",
        "post_id": purge.post_id,
        "comments_deleted": purge.comments_deleted,
    })))
}

/// Update a comment
pub async fn update_comment(
    service: web::Data<CommentService>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    let comment = service
        .edit_comment(&user.0, comment_id.into_inner(), &req.body)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// Delete a comment
pub async fn delete_comment(
    service: web::Data<CommentService>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comment_id = comment_id.into_inner();
    service.delete_comment(&user.0, comment_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": "Comment removed",
        "comment_id": comment_id,
    })))
}
