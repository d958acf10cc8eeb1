//! Login and sign-up forms

use crate::{AppError, Notice};
use skillswap_core::{LoginForm, SignupForm};
use skillswap_session::SessionContext;
use skillswap_store::Identity;

#[derive(Debug, Clone, Default)]
pub struct LoginScreen {
    pub form: LoginForm,
}

impl LoginScreen {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        LoginScreen {
            form: LoginForm {
                email: email.into(),
                password: password.into(),
            },
        }
    }

    /// Sign in; failures come back as a notice ready to show
    pub async fn submit(&self, session: &SessionContext) -> Result<(Identity, Notice), Notice> {
        match session.sign_in(&self.form).await {
            Ok(identity) => Ok((identity, Notice::new("Login Successful", "Welcome!"))),
            Err(e) => {
                let err = AppError::from(e);
                Err(match &err {
                    AppError::Session(skillswap_session::SessionError::Auth(_)) => {
                        Notice::titled("Login Error", &err)
                    }
                    _ => Notice::from_error(&err),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupScreen {
    pub form: SignupForm,
}

impl SignupScreen {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        SignupScreen {
            form: SignupForm {
                email: email.into(),
                password: password.into(),
                confirm_password: confirm_password.into(),
            },
        }
    }

    /// Create the account; the returned identity is the pending account that
    /// onboarding writes the profile for
    pub async fn submit(&self, session: &SessionContext) -> Result<(Identity, Notice), Notice> {
        match session.sign_up(&self.form).await {
            Ok(identity) => {
                let notice = Notice::new(
                    "Verify Your Email",
                    format!(
                        "A verification link has been sent to {}. Please verify your email before logging in.",
                        identity.email
                    ),
                );
                Ok((identity, notice))
            }
            Err(e) => {
                let err = AppError::from(e);
                Err(match &err {
                    AppError::Session(skillswap_session::SessionError::Auth(_)) => {
                        Notice::titled("Signup Error", &err)
                    }
                    _ => Notice::from_error(&err),
                })
            }
        }
    }
}
