/// Request-side policy for blog-service
///
/// Token verification itself lives in the shared `actix-middleware` crate;
/// this module holds the ownership rules applied once a caller is known.
pub mod permissions;

pub use permissions::*;
