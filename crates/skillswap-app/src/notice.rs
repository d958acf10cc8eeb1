//! User-facing messages

use crate::AppError;
use serde::Serialize;
use skillswap_core::CoreError;
use skillswap_session::SessionError;
use skillswap_store::{AuthError, StoreError};
use std::fmt;

/// A short message for the user, with a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notice {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new("Success", message)
    }

    /// Notice for a failed action, titled by what went wrong
    pub fn from_error(err: &AppError) -> Self {
        let title = match err {
            AppError::LoginRequired(_) => "Login Required",
            AppError::NoRatingSelected => "Missing Information",
            AppError::Invalid(e) => core_title(e),
            AppError::UserNotFound(_) => "Not Found",
            AppError::Store(e) => store_title(e),
            AppError::Session(e) => match e {
                SessionError::Invalid(e) => core_title(e),
                SessionError::EmailNotVerified => "Email Not Verified",
                SessionError::NotLoggedIn => "Login Required",
                SessionError::Auth(AuthError::Http(_)) => "Network Error",
                SessionError::Auth(_) => "Authentication Error",
                SessionError::Store(e) => store_title(e),
                SessionError::Cache(_) => "Error",
            },
        };
        Self::new(title, err.to_string())
    }

    /// Notice for `err` under a fixed title, such as "Login Error"
    pub fn titled(title: impl Into<String>, err: &AppError) -> Self {
        Self::new(title, err.to_string())
    }
}

fn core_title(err: &CoreError) -> &'static str {
    match err {
        CoreError::MissingName | CoreError::MissingEmail | CoreError::MissingPassword => {
            "Missing Information"
        }
        CoreError::PasswordMismatch => "Password Mismatch",
        CoreError::WeakPassword => "Weak Password",
        CoreError::DuplicateSkill(_) => "Duplicate Skill",
        CoreError::InvalidKey(..) | CoreError::InvalidRating(_) => "Invalid Input",
    }
}

fn store_title(err: &StoreError) -> &'static str {
    match err {
        StoreError::PermissionDenied(_) => "Permission Denied",
        StoreError::Http(_) => "Network Error",
        _ => "Error",
    }
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        Notice::from_error(err)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles() {
        let notice = Notice::from_error(&AppError::LoginRequired("rate"));
        assert_eq!(notice.title, "Login Required");
        assert_eq!(notice.message, "You must be logged in to rate");

        let notice = Notice::from_error(&AppError::Session(SessionError::Auth(
            AuthError::EmailExists,
        )));
        assert_eq!(notice.title, "Authentication Error");
        assert_eq!(notice.message, "This email is already in use.");

        let notice = Notice::from_error(&AppError::Store(StoreError::PermissionDenied(
            "users/u1".to_string(),
        )));
        assert_eq!(notice.title, "Permission Denied");

        let notice = Notice::from_error(&AppError::Invalid(CoreError::MissingName));
        assert_eq!(notice.to_string(), "Missing Information: Please enter your name");
    }
}
