//! Session token utilities using HS256.
//!
//! A browser session is a JWT signed with the server-wide session secret and
//! stored in an HttpOnly cookie. Tokens are stateless: validity is the
//! signature plus the expiry claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for session token operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to encode session: {0}")]
    EncodingError(String),

    #[error("Failed to decode session: {0}")]
    DecodingError(String),

    #[error("Session has expired")]
    Expired,

    #[error("Invalid session")]
    Invalid,

    #[error("Session secret must not be empty")]
    EmptySecret,
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email of the signed-in user
    pub email: String,
    /// Identity provider the session was established with
    pub provider: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique session identifier
    pub sid: String,
}

impl SessionClaims {
    /// Parses the subject claim as a user ID.
    pub fn user_id(&self) -> Result<Uuid, SessionError> {
        Uuid::parse_str(&self.sub).map_err(|_| SessionError::Invalid)
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Signs and validates session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Session lifetime in seconds
    pub ttl_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("ttl_secs", &self.ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionSigner {
    /// Creates a signer from the shared session secret.
    pub fn new(secret: &str, ttl_secs: i64) -> Result<Self, SessionError> {
        Self::with_leeway(secret, ttl_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a signer with a custom clock-skew leeway.
    pub fn with_leeway(secret: &str, ttl_secs: i64, leeway_secs: u64) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            leeway_secs,
        })
    }

    /// Issues a session token for a signed-in user.
    pub fn issue(&self, user_id: Uuid, email: &str, provider: &str) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            provider: provider.to_string(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            sid: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::EncodingError(e.to_string()))
    }

    /// Validates a session token and returns its claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => SessionError::Invalid,
                _ => SessionError::DecodingError(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> SessionSigner {
        SessionSigner::with_leeway("test_session_secret_12345", 3600, 0).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let signer = signer();
        let user_id = Uuid::new_v4();

        let token = signer.issue(user_id, "dev@example.com", "google").unwrap();
        let claims = signer.validate(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "dev@example.com");
        assert_eq!(claims.provider, "google");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            SessionSigner::new("", 3600),
            Err(SessionError::EmptySecret)
        ));
    }

    #[test]
    fn test_expired_session() {
        let signer = SessionSigner::with_leeway("test_session_secret_12345", -120, 0).unwrap();
        let token = signer.issue(Uuid::new_v4(), "dev@example.com", "google").unwrap();

        let result = signer.validate(&token);
        assert!(
            matches!(result, Err(SessionError::Expired)),
            "Expected Expired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = SessionSigner::new("another_secret", 3600).unwrap();
        let token = other.issue(Uuid::new_v4(), "dev@example.com", "google").unwrap();

        assert!(matches!(signer().validate(&token), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_garbage_token() {
        assert!(signer().validate("not_a_jwt").is_err());
        assert!(signer().validate("").is_err());
    }

    #[test]
    fn test_unique_session_ids() {
        let signer = signer();
        let user_id = Uuid::new_v4();

        let a = signer.validate(&signer.issue(user_id, "a@example.com", "google").unwrap()).unwrap();
        let b = signer.validate(&signer.issue(user_id, "a@example.com", "google").unwrap()).unwrap();

        assert_ne!(a.sid, b.sid);
    }

    #[test]
    fn test_invalid_subject() {
        let claims = SessionClaims {
            sub: "not-a-uuid".to_string(),
            email: String::new(),
            provider: String::new(),
            exp: 0,
            iat: 0,
            sid: String::new(),
        };
        assert!(matches!(claims.user_id(), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", signer());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test_session_secret"));
    }
}
