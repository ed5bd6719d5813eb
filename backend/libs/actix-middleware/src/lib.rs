//! # Actix Middleware Library
//!
//! Middleware components shared by Quill Actix services
//!
//! ## Modules
//! - `jwt_auth`: authorization gate for mutating requests
//! - `logging`: request/response logging

pub mod jwt_auth;
pub mod logging;

pub use jwt_auth::{AuthRejection, AuthenticatedUser, AuthorizationGate, DEFAULT_TOKEN_HEADER};
pub use logging::Logging;
