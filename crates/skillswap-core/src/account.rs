//! Sign-up and login form validation

use crate::{CoreError, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Checks run in the order the user sees them reported
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(CoreError::MissingEmail);
        }
        if self.password.trim().is_empty() {
            return Err(CoreError::MissingPassword);
        }
        if self.password != self.confirm_password {
            return Err(CoreError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::WeakPassword);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(CoreError::MissingEmail);
        }
        if self.password.is_empty() {
            return Err(CoreError::MissingPassword);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_signup_validation_order() {
        assert_eq!(form("", "", "").validate(), Err(CoreError::MissingEmail));
        assert_eq!(form("a@b.c", " ", " ").validate(), Err(CoreError::MissingPassword));
        assert_eq!(
            form("a@b.c", "secret1", "secret2").validate(),
            Err(CoreError::PasswordMismatch)
        );
        assert_eq!(form("a@b.c", "abc", "abc").validate(), Err(CoreError::WeakPassword));
        assert!(form("a@b.c", "abcdef", "abcdef").validate().is_ok());
    }

    #[test]
    fn test_login_validation() {
        let login = LoginForm {
            email: "a@b.c".to_string(),
            password: String::new(),
        };
        assert_eq!(login.validate(), Err(CoreError::MissingPassword));
    }
}
