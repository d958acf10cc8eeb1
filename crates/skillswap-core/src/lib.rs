//! Core types and data structures for SkillSwap
//!
//! This crate defines the documents stored in the remote database and the
//! rules that apply to them before they are written:
//! - User profiles and skill lists
//! - Ratings and their aggregation
//! - Favorites, topics and notifications
//! - Account form validation
//! - Store key validation

pub mod account;
pub mod favorite;
pub mod notification;
pub mod profile;
pub mod rating;
pub mod skills;
pub mod topic;

pub use account::{LoginForm, SignupForm, MIN_PASSWORD_LEN};
pub use favorite::FavoriteSet;
pub use notification::{Notification, NotificationKind};
pub use profile::{ProfileDraft, UserProfile, UserRecord};
pub use rating::{Rating, RatingScore, RatingSet, RatingSummary};
pub use skills::{SkillEdit, SkillList};
pub use topic::Topic;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error types for core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid key {0:?}: {1}")]
    InvalidKey(String, &'static str),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),

    #[error("\"{0}\" is already in your list")]
    DuplicateSkill(String),

    #[error("Please enter your name")]
    MissingName,

    #[error("Please enter your email address")]
    MissingEmail,

    #[error("Please enter a password")]
    MissingPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password should be at least 6 characters")]
    WeakPassword,
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Characters the remote store refuses inside a single key
pub const FORBIDDEN_KEY_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

/// Check that `key` can be used as one segment of a store path
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CoreError::InvalidKey(key.to_string(), "key is empty"));
    }
    if key.contains(FORBIDDEN_KEY_CHARS) {
        return Err(CoreError::InvalidKey(
            key.to_string(),
            "key contains one of . $ # [ ] /",
        ));
    }
    if key.chars().any(char::is_control) {
        return Err(CoreError::InvalidKey(
            key.to_string(),
            "key contains control characters",
        ));
    }
    Ok(())
}

/// Stable identifier of a user account
///
/// Doubles as the key of the user's document under `users/`, so it obeys
/// the store key rules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_key(&id)?;
        Ok(UserId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        UserId::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        UserId::new(s)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("abc123").is_ok());
        assert!(validate_key("Guitar Lessons").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("a.b").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("a#b").is_err());
        assert!(validate_key("a\nb").is_err());
    }

    #[test]
    fn test_user_id_serde() {
        let id: UserId = serde_json::from_str("\"uid-1\"").unwrap();
        assert_eq!(id.as_str(), "uid-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"uid-1\"");

        let bad: std::result::Result<UserId, _> = serde_json::from_str("\"a/b\"");
        assert!(bad.is_err());
    }
}
