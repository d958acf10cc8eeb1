//! Remote store client for SkillSwap
//!
//! The database is a single JSON tree addressed by slash-separated paths.
//! Everything the app needs from it goes through the [`RemoteStore`]
//! capability: point reads, overwrites, merges, deletes, pushes with a
//! server-generated key, and change subscriptions.
//!
//! Two implementations are provided:
//! - [`RestStore`]: HTTP against `{database_url}/{path}.json`
//! - [`MemoryStore`]: in-process, used for tests and offline mode
//!
//! Authentication lives next to it in [`auth`].

pub mod auth;
pub mod memory;
pub mod path;
pub mod rest;
pub mod subscription;
pub mod token;
pub mod tree;

pub use auth::{AuthError, AuthProvider, Identity, MemoryAuth};
pub use memory::MemoryStore;
pub use path::StorePath;
pub use rest::{RestConfig, RestStore};
pub use subscription::{Snapshot, Subscription};
pub use token::AuthToken;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use skillswap_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unexpected status {status} for {path}: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(#[from] CoreError),

    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Read/write/subscribe capability over the hierarchical store
///
/// Writes are last-write-wins; there are no transactions.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Value at `path`, `None` when absent
    async fn get(&self, path: &StorePath) -> Result<Option<Value>>;

    /// Overwrite the value at `path`; writing `null` deletes it
    async fn set(&self, path: &StorePath, value: Value) -> Result<()>;

    /// Merge `fields` into the value at `path`
    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<()>;

    async fn remove(&self, path: &StorePath) -> Result<()>;

    /// Add `value` as a new child with a store-generated key, returning the key
    async fn push(&self, path: &StorePath, value: Value) -> Result<String>;

    /// Watch `path` for changes
    ///
    /// Must be called from within a tokio runtime.
    fn subscribe(&self, path: &StorePath) -> Subscription;
}

/// Typed helpers over any [`RemoteStore`]
#[async_trait]
pub trait RemoteStoreExt: RemoteStore {
    async fn get_as<T>(&self, path: &StorePath) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(path).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn set_as<T>(&self, path: &StorePath, value: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        self.set(path, value).await
    }

    async fn exists(&self, path: &StorePath) -> Result<bool> {
        Ok(self.get(path).await?.is_some())
    }
}

impl<S: RemoteStore + ?Sized> RemoteStoreExt for S {}
