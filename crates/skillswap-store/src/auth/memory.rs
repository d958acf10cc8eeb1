//! In-process authentication, for tests and offline mode

use super::{AuthError, AuthProvider, AuthResult, Identity};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skillswap_core::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
struct Account {
    uid: UserId,
    password: String,
    email_verified: bool,
    disabled: bool,
    verification_sent: usize,
}

#[derive(Default, Serialize, Deserialize)]
struct State {
    /// Accounts by lowercased email
    accounts: HashMap<String, Account>,
    /// Live refresh tokens and the email they belong to
    refresh_tokens: HashMap<String, String>,
}

/// Accounts kept in memory
///
/// Accounts created with [`MemoryAuth::add_account`] can be pre-verified;
/// accounts created through `sign_up` start unverified until
/// [`MemoryAuth::verify_email`] is called.
#[derive(Clone, Default)]
pub struct MemoryAuth {
    state: Arc<Mutex<State>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account directly, returning its uid
    pub fn add_account(&self, email: &str, password: &str, verified: bool) -> UserId {
        let uid = Self::new_uid();
        self.state.lock().accounts.insert(
            email.to_lowercase(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
                email_verified: verified,
                disabled: false,
                verification_sent: 0,
            },
        );
        uid
    }

    /// Accounts and live sessions as JSON, for [`MemoryAuth::import`]
    pub fn export(&self) -> Value {
        serde_json::to_value(&*self.state.lock()).unwrap_or(Value::Null)
    }

    pub fn import(value: Value) -> Result<Self, serde_json::Error> {
        let state: State = serde_json::from_value(value)?;
        Ok(MemoryAuth {
            state: Arc::new(Mutex::new(state)),
        })
    }

    pub fn verify_email(&self, email: &str) {
        if let Some(account) = self.state.lock().accounts.get_mut(&email.to_lowercase()) {
            account.email_verified = true;
        }
    }

    pub fn disable(&self, email: &str) {
        if let Some(account) = self.state.lock().accounts.get_mut(&email.to_lowercase()) {
            account.disabled = true;
        }
    }

    /// Invalidate every refresh token issued for `email`
    pub fn revoke_sessions(&self, email: &str) {
        let email = email.to_lowercase();
        self.state.lock().refresh_tokens.retain(|_, owner| *owner != email);
    }

    pub fn verification_emails_sent(&self, email: &str) -> usize {
        self.state
            .lock()
            .accounts
            .get(&email.to_lowercase())
            .map(|a| a.verification_sent)
            .unwrap_or(0)
    }

    fn new_uid() -> UserId {
        // Simple uuids contain only hex digits, always a valid key
        UserId::new(Uuid::new_v4().simple().to_string())
            .unwrap_or_else(|_| unreachable!("hex keys are always valid"))
    }

    fn issue(state: &mut State, email: &str) -> AuthResult<Identity> {
        let account = state.accounts.get(email).ok_or(AuthError::EmailNotFound)?;
        let refresh_token = Uuid::new_v4().simple().to_string();
        let identity = Identity {
            uid: account.uid.clone(),
            email: email.to_string(),
            display_name: None,
            id_token: Uuid::new_v4().simple().to_string(),
            refresh_token: refresh_token.clone(),
            email_verified: account.email_verified,
        };
        state.refresh_tokens.insert(refresh_token, email.to_string());
        Ok(identity)
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let email = email.trim().to_lowercase();
        let mut state = self.state.lock();
        let account = state.accounts.get(&email).ok_or(AuthError::EmailNotFound)?;
        if account.disabled {
            return Err(AuthError::UserDisabled);
        }
        if account.password != password {
            return Err(AuthError::InvalidPassword);
        }
        Self::issue(&mut state, &email)
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < skillswap_core::MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        if self.state.lock().accounts.contains_key(&email) {
            return Err(AuthError::EmailExists);
        }
        self.add_account(&email, password, false);
        let mut state = self.state.lock();
        Self::issue(&mut state, &email)
    }

    async fn send_email_verification(&self, identity: &Identity) -> AuthResult<()> {
        let mut state = self.state.lock();
        let account = state
            .accounts
            .get_mut(&identity.email.to_lowercase())
            .ok_or(AuthError::SessionExpired)?;
        account.verification_sent += 1;
        Ok(())
    }

    async fn refresh(&self, identity: &Identity) -> AuthResult<Identity> {
        let mut state = self.state.lock();
        let email = state
            .refresh_tokens
            .remove(&identity.refresh_token)
            .ok_or(AuthError::SessionExpired)?;
        let disabled = state.accounts.get(&email).map(|a| a.disabled);
        match disabled {
            Some(true) => Err(AuthError::UserDisabled),
            Some(false) => Self::issue(&mut state, &email),
            None => Err(AuthError::SessionExpired),
        }
    }
}
