//! Account authentication
//!
//! [`AuthProvider`] covers what the client needs from the identity service:
//! password sign-in and sign-up, the verification email, and token refresh,
//! which doubles as the authoritative "is this session still valid" signal.

pub mod identity_toolkit;
pub mod memory;

pub use identity_toolkit::{AuthConfig, IdentityToolkitAuth};
pub use memory::MemoryAuth;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillswap_core::{CoreError, UserId};
use thiserror::Error;

/// An authenticated account and its credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: UserId,
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    pub id_token: String,
    pub refresh_token: String,

    #[serde(default)]
    pub email_verified: bool,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email format.")]
    InvalidEmail,

    #[error("No account found with this email.")]
    EmailNotFound,

    #[error("Incorrect password.")]
    InvalidPassword,

    #[error("Incorrect email or password.")]
    InvalidCredentials,

    #[error("This email is already in use.")]
    EmailExists,

    #[error("Password should be at least 6 characters.")]
    WeakPassword,

    #[error("This account has been disabled.")]
    UserDisabled,

    #[error("Too many attempts. Please try again later.")]
    TooManyAttempts,

    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    #[error("Authentication failed: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed auth response: {0}")]
    Malformed(String),

    #[error("Invalid account id: {0}")]
    InvalidUserId(#[from] CoreError),
}

impl AuthError {
    /// Map an identity-service error message to a variant
    ///
    /// Messages look like `CODE` or `CODE : detail`.
    pub fn from_code(message: &str) -> Self {
        let code = message.split(" : ").next().unwrap_or(message).trim();
        match code {
            "INVALID_EMAIL" => AuthError::InvalidEmail,
            "EMAIL_NOT_FOUND" => AuthError::EmailNotFound,
            "INVALID_PASSWORD" => AuthError::InvalidPassword,
            "INVALID_LOGIN_CREDENTIALS" => AuthError::InvalidCredentials,
            "EMAIL_EXISTS" => AuthError::EmailExists,
            "WEAK_PASSWORD" => AuthError::WeakPassword,
            "USER_DISABLED" => AuthError::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
            "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" | "INVALID_ID_TOKEN" => {
                AuthError::SessionExpired
            }
            _ => AuthError::Provider(message.to_string()),
        }
    }

    /// True when the service has said the session is no longer valid, as
    /// opposed to being unreachable
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, AuthError::SessionExpired | AuthError::UserDisabled)
    }
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sign in with email and password; the identity reports whether the
    /// email has been verified
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity>;

    /// Create an account; the new account is not yet verified
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity>;

    async fn send_email_verification(&self, identity: &Identity) -> AuthResult<()>;

    /// Exchange the refresh token for fresh credentials
    ///
    /// Fails with an error for which [`AuthError::is_session_invalid`] holds
    /// when the session has been revoked or the account removed.
    async fn refresh(&self, identity: &Identity) -> AuthResult<Identity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert!(matches!(
            AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        ));
        assert!(matches!(
            AuthError::from_code("EMAIL_EXISTS"),
            AuthError::EmailExists
        ));
        assert!(AuthError::from_code("TOKEN_EXPIRED").is_session_invalid());
        assert!(!AuthError::from_code("INVALID_PASSWORD").is_session_invalid());
        assert!(matches!(
            AuthError::from_code("OPERATION_NOT_ALLOWED"),
            AuthError::Provider(_)
        ));
    }

    #[test]
    fn test_identity_cache_format() {
        let identity = Identity {
            uid: UserId::new("u1").unwrap(),
            email: "a@b.c".to_string(),
            display_name: None,
            id_token: "id".to_string(),
            refresh_token: "rt".to_string(),
            email_verified: true,
        };
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(value["idToken"], "id");
        assert_eq!(value["refreshToken"], "rt");
        let back: Identity = serde_json::from_value(value).unwrap();
        assert_eq!(back, identity);
    }
}
