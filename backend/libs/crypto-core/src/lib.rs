//! Shared signed-token primitives for Quill services.
//!
//! - `jwt`: identity claims, token verification and signing

pub mod jwt;

pub use jwt::{AuthError, Claims, Identity, TokenSigner, TokenVerifier};
