//! Local persistent cache
//!
//! A handful of named slots, each holding one serialized JSON document:
//! - `user`: the last signed-in identity
//! - `userProfile`: the last loaded profile, tagged with its owner

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use skillswap_core::{UserId, UserProfile};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const USER_KEY: &str = "user";
pub const PROFILE_KEY: &str = "userProfile";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Typed helpers over any [`LocalCache`]
#[async_trait]
pub trait LocalCacheExt: LocalCache {
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw).await
    }
}

impl<C: LocalCache + ?Sized> LocalCacheExt for C {}

/// Cached profile together with the account it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedProfile {
    pub uid: UserId,
    pub profile: UserProfile,
}

/// One file per key inside a directory
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(FileCache { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl LocalCache for FileCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.file_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.file_for(key)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Cached {} ({} bytes)", key, value.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.file_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryCache {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.slots.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_cache_round_trip() {
        let temp = TempDir::new().unwrap();
        let cache = FileCache::new(temp.path().join("cache")).unwrap();

        assert_eq!(cache.get(USER_KEY).await.unwrap(), None);
        cache.set(USER_KEY, "{\"uid\":\"u1\"}").await.unwrap();
        assert_eq!(
            cache.get(USER_KEY).await.unwrap().as_deref(),
            Some("{\"uid\":\"u1\"}")
        );
        assert!(temp.path().join("cache/user.json").exists());

        cache.remove(USER_KEY).await.unwrap();
        cache.remove(USER_KEY).await.unwrap();
        assert_eq!(cache.get(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_cache_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let cache = FileCache::new(temp.path()).unwrap();
            cache.set(PROFILE_KEY, "{}").await.unwrap();
        }
        let reopened = FileCache::new(temp.path()).unwrap();
        assert_eq!(reopened.get(PROFILE_KEY).await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let cache = FileCache::new(temp.path()).unwrap();
        assert!(matches!(
            cache.set("../escape", "x").await,
            Err(CacheError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let cache = MemoryCache::new();
        let cached = CachedProfile {
            uid: UserId::new("u1").unwrap(),
            profile: UserProfile {
                name: "Ada".to_string(),
                ..Default::default()
            },
        };
        cache.set_json(PROFILE_KEY, &cached).await.unwrap();
        let back: Option<CachedProfile> = cache.get_json(PROFILE_KEY).await.unwrap();
        assert_eq!(back, Some(cached));

        cache.set(USER_KEY, "not json").await.unwrap();
        let broken: Result<Option<CachedProfile>> = cache.get_json(USER_KEY).await;
        assert!(matches!(broken, Err(CacheError::Serialization(_))));
    }
}
