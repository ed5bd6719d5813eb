/// Error types for Blog Service
///
/// Every failure a lifecycle operation can produce, and how each one is
/// rendered to API clients:
///
/// - validation failures: 400 with an ordered `errors` list
/// - ownership/lookup failures: 403/404 with a single `msg`
/// - a post whose comment cascade failed: 500 with `code = "cascade_failure"`
use crate::db::RepoError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// One field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub param: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            msg: msg.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Body constraints failed; messages are ordered, first one wins
    #[error("Validation failed: {}", first_message(.0))]
    ValidationFailed(Vec<FieldError>),

    /// Caller is not the recorded owner
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource id does not resolve
    #[error("Not found: {0}")]
    NotFound(String),

    /// The post is gone but some of its comments may remain
    #[error("Post {post_id} was deleted but its comments could not be removed: {source}")]
    CascadeFailure {
        post_id: Uuid,
        #[source]
        source: RepoError,
    },

    /// Storage backend failed
    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),
}

fn first_message(errors: &[FieldError]) -> &str {
    errors.first().map(|e| e.msg.as_str()).unwrap_or("invalid request")
}

impl AppError {
    pub fn validation(param: &str, msg: &str) -> Self {
        AppError::ValidationFailed(vec![FieldError::new(param, msg)])
    }

    /// Flatten `validator` output into an ordered list.
    ///
    /// Fields follow `field_order`; within a field, a blank value is reported
    /// before a length violation.
    pub fn from_validation(errors: ValidationErrors, field_order: &[&'static str]) -> Self {
        let fields = errors.field_errors();

        let mut list = Vec::new();
        for field in field_order {
            if let Some(field_errors) = fields.get(field) {
                let mut field_errors: Vec<_> = field_errors.iter().collect();
                field_errors.sort_by_key(|e| if e.code == "blank" { 0 } else { 1 });
                list.extend(field_errors.into_iter().map(|e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    FieldError::new(*field, msg)
                }));
            }
        }

        if list.is_empty() {
            list.push(FieldError::new("request", "Invalid request"));
        }
        AppError::ValidationFailed(list)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CascadeFailure { .. } | AppError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            AppError::ValidationFailed(errors) => serde_json::json!({ "errors": errors }),
            AppError::Forbidden(msg) | AppError::NotFound(msg) => serde_json::json!({ "msg": msg }),
            AppError::CascadeFailure { post_id, .. } => serde_json::json!({
                "msg": "Post deleted, but its comments could not be removed",
                "code": "cascade_failure",
                "post_id": post_id,
            }),
            AppError::Storage(err) => {
                tracing::error!(error = %err, "storage failure");
                serde_json::json!({ "msg": "Server error" })
            }
        };

        HttpResponse::build(status).json(body)
    }
}
