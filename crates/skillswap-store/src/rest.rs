//! REST store client
//!
//! Every path maps to `{database_url}/{path}.json`:
//! - GET reads (`null` means absent)
//! - PUT overwrites
//! - PATCH merges
//! - DELETE removes
//! - POST pushes and replies `{"name": "<key>"}`
//!
//! Subscriptions poll the path at a fixed interval and publish only when the
//! value changes.

use crate::path::StorePath;
use crate::subscription::{publish, Snapshot, Subscription};
use crate::token::AuthToken;
use crate::{RemoteStore, Result, StoreError};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

fn default_poll_interval_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Base URL of the database, e.g. `https://example-default-rtdb.firebaseio.com`
    pub database_url: String,

    /// Polling period for subscriptions
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl RestConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        RestConfig {
            database_url: database_url.into(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Clone)]
pub struct RestStore {
    base: Url,
    client: Client,
    token: AuthToken,
    poll_interval: Duration,
}

#[derive(Deserialize)]
struct PushReply {
    name: String,
}

impl RestStore {
    pub fn new(config: &RestConfig, token: AuthToken) -> Result<Self> {
        Self::with_client(config, token, Client::new())
    }

    pub fn with_client(config: &RestConfig, token: AuthToken, client: Client) -> Result<Self> {
        let base = Url::parse(config.database_url.trim_end_matches('/'))
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", config.database_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.database_url.clone()));
        }
        Ok(RestStore {
            base,
            client,
            token,
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
        })
    }

    /// URL for `path`, with the current token attached
    pub fn url_for(&self, path: &StorePath) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidUrl(self.base.to_string()))?;
            segments.pop_if_empty();
            match path.segments().split_last() {
                Some((last, parents)) => {
                    segments.extend(parents);
                    segments.push(&format!("{}.json", last));
                }
                None => {
                    segments.push(".json");
                }
            }
        }
        if let Some(token) = self.token.get() {
            url.query_pairs_mut().append_pair("auth", &token);
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        path: &StorePath,
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        let url = self.url_for(path)?;
        debug!("{} {}", method, path);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreError::PermissionDenied(path.to_string()));
        }
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| StoreError::Malformed(format!("{}: {}", path, e)))?;
        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn get(&self, path: &StorePath) -> Result<Option<Value>> {
        self.send(Method::GET, path, None).await
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        self.send(Method::PUT, path, Some(&value)).await?;
        Ok(())
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<()> {
        self.send(Method::PATCH, path, Some(&Value::Object(fields)))
            .await?;
        Ok(())
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn push(&self, path: &StorePath, value: Value) -> Result<String> {
        let reply = self
            .send(Method::POST, path, Some(&value))
            .await?
            .ok_or_else(|| StoreError::Malformed(format!("empty push reply for {}", path)))?;
        let reply: PushReply = serde_json::from_value(reply)
            .map_err(|e| StoreError::Malformed(format!("push reply for {}: {}", path, e)))?;
        Ok(reply.name)
    }

    fn subscribe(&self, path: &StorePath) -> Subscription {
        let (tx, rx) = watch::channel(None);
        let store = self.clone();
        let watched = path.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(store.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                match store.get(&watched).await {
                    Ok(value) => {
                        publish(&tx, Snapshot::new(watched.clone(), value));
                    }
                    Err(e) => warn!("Error in listener for {}: {}", watched, e),
                }
            }
            debug!("Listener for {} stopped", watched);
        });

        Subscription::new(path.clone(), rx, Some(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(url: &str) -> RestStore {
        RestStore::new(&RestConfig::new(url), AuthToken::new()).unwrap()
    }

    #[test]
    fn test_url_for_paths() {
        let store = store("https://db.example.com/");
        let path = StorePath::parse("users/u1").unwrap();
        assert_eq!(
            store.url_for(&path).unwrap().as_str(),
            "https://db.example.com/users/u1.json"
        );
        assert_eq!(
            store.url_for(&StorePath::root()).unwrap().as_str(),
            "https://db.example.com/.json"
        );
        assert_eq!(
            store.url_for(&StorePath::topic("Web Dev")).unwrap().as_str(),
            "https://db.example.com/topics/web%20dev.json"
        );
    }

    #[test]
    fn test_url_carries_token() {
        let token = AuthToken::new();
        let store = RestStore::new(&RestConfig::new("https://db.example.com"), token.clone())
            .unwrap();
        token.replace(Some("tok123".to_string()));

        let path = StorePath::parse("favorites/u1").unwrap();
        assert_eq!(
            store.url_for(&path).unwrap().as_str(),
            "https://db.example.com/favorites/u1.json?auth=tok123"
        );
    }

    #[test]
    fn test_rejects_bad_url() {
        assert!(RestStore::new(&RestConfig::new("not a url"), AuthToken::new()).is_err());
        assert!(RestStore::new(&RestConfig::new("mailto:x@y.z"), AuthToken::new()).is_err());
    }
}
