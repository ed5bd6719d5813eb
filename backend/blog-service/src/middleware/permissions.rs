/// Ownership checks for posts and comments
///
/// Only the recorded author of a post or comment may change or remove it.
/// Identity is compared by user id alone; display names are informational.
use crate::error::{AppError, Result};
use crate::models::Identity;

/// True when `caller` is the recorded owner
pub fn can_mutate(resource_owner: &Identity, caller: &Identity) -> bool {
    resource_owner.same_user(caller)
}

/// Check if a user may edit or delete a resource owned by `resource_owner`
pub fn ensure_can_mutate(resource_owner: &Identity, caller: &Identity) -> Result<()> {
    if can_mutate(resource_owner, caller) {
        Ok(())
    } else {
        Err(AppError::Forbidden("User not authorized".to_string()))
    }
}
