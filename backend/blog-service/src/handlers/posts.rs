/// Post handlers - HTTP endpoints for post operations
use crate::error::Result;
use crate::models::{CreatePostRequest, UpdatePostRequest};
use crate::services::PostService;
use actix_middleware::AuthenticatedUser;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// Create a new post
pub async fn create_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let post = service.create_post(&user.0, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service.get_post(post_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Edit title and/or body of a post
pub async fn update_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let post = service
        .edit_post(&user.0, post_id.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post together with its comments
pub async fn delete_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let deletion = service.delete_post(&user.0, post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "msg": "Post removed",
        "post_id": deletion.post_id,
        "comments_deleted": deletion.comments_deleted,
    })))
}
