//! Identity-toolkit REST authentication
//!
//! Endpoints used:
//! - `accounts:signInWithPassword`, `accounts:signUp`
//! - `accounts:lookup` for the verification flag
//! - `accounts:sendOobCode` with `VERIFY_EMAIL`
//! - the secure-token `token` endpoint for refresh

use super::{AuthError, AuthProvider, AuthResult, Identity};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use skillswap_core::UserId;
use tracing::{debug, info};

fn default_identity_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_token_url() -> String {
    "https://securetoken.googleapis.com/v1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Web API key of the project
    pub api_key: String,

    #[serde(default = "default_identity_url")]
    pub identity_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl AuthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        AuthConfig {
            api_key: api_key.into(),
            identity_url: default_identity_url(),
            token_url: default_token_url(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorReply {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordReply {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct LookupReply {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct RefreshReply {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

pub struct IdentityToolkitAuth {
    config: AuthConfig,
    client: Client,
}

impl IdentityToolkitAuth {
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: AuthConfig, client: Client) -> Self {
        IdentityToolkitAuth { config, client }
    }

    fn endpoint(&self, base: &str, method: &str) -> AuthResult<Url> {
        let raw = format!("{}/{}", base.trim_end_matches('/'), method);
        let mut url = Url::parse(&raw).map_err(|e| AuthError::Malformed(format!("{}: {}", raw, e)))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(&self, url: Url, body: Value) -> AuthResult<T> {
        debug!("POST {}", url.path());
        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorReply>(&text) {
                Ok(reply) => AuthError::from_code(&reply.error.message),
                Err(_) => AuthError::Provider(format!("status {}: {}", status, text)),
            });
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Malformed(e.to_string()))
    }

    async fn lookup(&self, id_token: &str) -> AuthResult<LookupUser> {
        let url = self.endpoint(&self.config.identity_url, "accounts:lookup")?;
        let reply: LookupReply = self.call(url, json!({ "idToken": id_token })).await?;
        reply
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::Malformed("lookup returned no users".to_string()))
    }

    async fn password_flow(&self, method: &str, email: &str, password: &str) -> AuthResult<Identity> {
        let url = self.endpoint(&self.config.identity_url, method)?;
        let reply: PasswordReply = self
            .call(
                url,
                json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        let user = self.lookup(&reply.id_token).await?;
        Ok(Identity {
            uid: UserId::new(reply.local_id)?,
            email: if reply.email.is_empty() { user.email } else { reply.email },
            display_name: reply.display_name.or(user.display_name),
            id_token: reply.id_token,
            refresh_token: reply.refresh_token,
            email_verified: user.email_verified,
        })
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitAuth {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let identity = self
            .password_flow("accounts:signInWithPassword", email, password)
            .await?;
        info!("Signed in as {}", identity.email);
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let identity = self.password_flow("accounts:signUp", email, password).await?;
        info!("Created account {}", identity.uid);
        Ok(identity)
    }

    async fn send_email_verification(&self, identity: &Identity) -> AuthResult<()> {
        let url = self.endpoint(&self.config.identity_url, "accounts:sendOobCode")?;
        let _: Value = self
            .call(
                url,
                json!({
                    "requestType": "VERIFY_EMAIL",
                    "idToken": identity.id_token,
                }),
            )
            .await?;
        info!("Verification email sent to {}", identity.email);
        Ok(())
    }

    async fn refresh(&self, identity: &Identity) -> AuthResult<Identity> {
        let url = self.endpoint(&self.config.token_url, "token")?;
        let reply: RefreshReply = self
            .call(
                url,
                json!({
                    "grant_type": "refresh_token",
                    "refresh_token": identity.refresh_token,
                }),
            )
            .await?;

        let user = self.lookup(&reply.id_token).await?;
        if user.local_id != reply.user_id {
            return Err(AuthError::Malformed(format!(
                "token for {} looked up as {}",
                reply.user_id, user.local_id
            )));
        }
        Ok(Identity {
            uid: UserId::new(reply.user_id)?,
            email: user.email,
            display_name: user.display_name,
            id_token: reply.id_token,
            refresh_token: reply.refresh_token,
            email_verified: user.email_verified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_carries_key() {
        let auth = IdentityToolkitAuth::new(AuthConfig::new("k123"));
        let url = auth
            .endpoint(&auth.config.identity_url, "accounts:signUp")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signUp?key=k123"
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AuthConfig = serde_json::from_value(json!({"api_key": "k"})).unwrap();
        assert_eq!(config.token_url, "https://securetoken.googleapis.com/v1");
    }
}
