use crate::models::Identity;

/// The signed-in user and the token the server issued for them.
///
/// Read-only for the lifetime of the login; components that act on behalf
/// of the user are handed a clone.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    identity: Identity,
    token: String,
}

impl Session {
    pub fn new(identity: Identity, token: impl Into<String>) -> Self {
        Self {
            identity,
            token: token.into(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// True when this session's user is `owner`
    pub fn owns(&self, owner: &Identity) -> bool {
        self.identity.same_user(owner)
    }
}
