use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Shown when the server gave no usable message, or never answered
pub const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Rejected locally before any request was made
    #[error("{0}")]
    Validation(String),

    /// The server answered with a non-success status
    #[error("{msg}")]
    Rejected { status: u16, msg: String },

    /// The post was deleted but the server could not remove its comments
    #[error("{msg}")]
    CascadeFailure { post_id: Uuid, msg: String },

    /// The request never produced a response
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not what the API promises
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The same action is already waiting on the server
    #[error("{0}")]
    InFlight(String),

    /// The action needs a session and there is none
    #[error("You must be logged in")]
    NotSignedIn,

    /// The user declined a confirmation prompt
    #[error("cancelled")]
    Cancelled,
}

impl ClientError {
    /// Build a rejection from a status and raw response body.
    ///
    /// The message is the first validation message, else `msg`, else a
    /// generic retry prompt. A body tagged `cascade_failure` becomes
    /// [`ClientError::CascadeFailure`].
    pub fn rejected(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let msg = parsed
            .as_ref()
            .and_then(|v| {
                v.pointer("/errors/0/msg")
                    .and_then(Value::as_str)
                    .or_else(|| v.get("msg").and_then(Value::as_str))
            })
            .map(str::to_string)
            .unwrap_or_else(|| RETRY_MESSAGE.to_string());

        let cascade_post = parsed
            .as_ref()
            .filter(|v| v.get("code").and_then(Value::as_str) == Some("cascade_failure"))
            .and_then(|v| v.get("post_id").and_then(Value::as_str))
            .and_then(|id| id.parse::<Uuid>().ok());

        match cascade_post {
            Some(post_id) => ClientError::CascadeFailure { post_id, msg },
            None => ClientError::Rejected { status, msg },
        }
    }

    /// No response, an unreadable one, or a server-side failure
    pub fn is_unexpected(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Decode(_) => true,
            ClientError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Text to show the user next to the control that failed
    pub fn user_message(&self) -> String {
        if self.is_unexpected() {
            RETRY_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
