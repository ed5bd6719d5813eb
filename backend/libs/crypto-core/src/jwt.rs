/// Shared JWT module for Quill services
///
/// Tokens are HS256-signed with a server-held secret and carry the caller's
/// identity in a `user` claim. Verification is stateless: no session lookup,
/// no process-global keys. Services construct a [`TokenVerifier`] from their
/// configuration and hand it to whatever needs to authenticate requests.
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::{Identity, TokenSigner, TokenVerifier};
/// use uuid::Uuid;
///
/// let secret = "an-example-secret-that-is-long-enough!!";
/// let signer = TokenSigner::from_secret(secret);
/// let verifier = TokenVerifier::from_secret(secret);
///
/// let alice = Identity::new(Uuid::new_v4(), "alice");
/// let token = signer.sign(&alice, None).unwrap();
///
/// assert_eq!(verifier.verify(Some(token.as_str())).unwrap(), alice);
/// ```
use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// JWT algorithm shared by signer and verifier
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Minimum secret length accepted in production (256 bits)
pub const MIN_SECRET_LENGTH: usize = 32;

// ============================================================================
// Data Structures
// ============================================================================

/// Authenticated user: stable id plus display name.
///
/// Two identities denote the same user when their ids match; the display
/// name is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
}

impl Identity {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// True when both identities refer to the same user.
    pub fn same_user(&self, other: &Identity) -> bool {
        self.id == other.id
    }
}

/// Token payload. `exp` is optional: a token without it never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: Identity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Authentication failures. The display strings are the user-facing
/// rejection messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("No token, authorization denied")]
    MissingToken,
    #[error("Token is not valid")]
    InvalidToken,
}

// ============================================================================
// Token Validation
// ============================================================================

/// Verifies signed identity tokens against a server-held secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_secs: i64,
}

impl TokenVerifier {
    pub fn from_secret(secret: &str) -> Self {
        let mut validation = Validation::new(JWT_ALGORITHM);
        // Expiry is checked against an explicit clock in `verify_at`
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            leeway_secs: 0,
        }
    }

    /// Tolerate clock skew of `secs` seconds when checking `exp`.
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = i64::try_from(secs).unwrap_or(i64::MAX);
        self
    }

    /// Verify a raw header value against the current time.
    pub fn verify(&self, token: Option<&str>) -> std::result::Result<Identity, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a raw header value as of `now`.
    ///
    /// ## Errors
    ///
    /// - `MissingToken` when the value is absent or blank
    /// - `InvalidToken` when the signature, algorithm or payload is wrong,
    ///   or when `exp` lies in the past
    pub fn verify_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> std::result::Result<Identity, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AuthError::InvalidToken
        })?;

        if let Some(exp) = data.claims.exp {
            if exp.saturating_add(self.leeway_secs) < now.timestamp() {
                tracing::debug!(user_id = %data.claims.user.id, exp, "token expired");
                return Err(AuthError::InvalidToken);
            }
        }

        Ok(data.claims.user)
    }
}

// ============================================================================
// Token Generation
// ============================================================================

/// Mints tokens for an identity. Login flows own issuance; this exists for
/// operators and tests.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
}

impl TokenSigner {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token issued now. `ttl = None` produces a token without `exp`.
    pub fn sign(&self, identity: &Identity, ttl: Option<Duration>) -> Result<String> {
        self.sign_at(identity, Utc::now(), ttl)
    }

    pub fn sign_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> Result<String> {
        let claims = Claims {
            user: identity.clone(),
            iat: Some(issued_at.timestamp()),
            exp: ttl.map(|ttl| (issued_at + ttl).timestamp()),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to sign token: {e}"))
    }
}

/// Reject secrets too short for HS256.
pub fn validate_secret_length(secret: &str) -> Result<()> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(anyhow!(
            "JWT secret too short: {} bytes, need at least {}",
            secret.len(),
            MIN_SECRET_LENGTH
        ));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
