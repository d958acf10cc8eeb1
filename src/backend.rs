//! Wiring of the store, auth service and cache into a session
//!
//! Online, the session talks to the REST database and the identity toolkit.
//! Offline, both are in-process and their contents are kept as JSON files in
//! the data directory between runs.

use crate::config::Settings;
use crate::paths::SkillSwapPaths;
use anyhow::{Context, Result};
use serde_json::Value;
use skillswap_session::{FileCache, SessionContext};
use skillswap_store::auth::IdentityToolkitAuth;
use skillswap_store::{AuthToken, MemoryAuth, MemoryStore, RestStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

struct OfflineFiles {
    store: MemoryStore,
    auth: MemoryAuth,
    store_path: PathBuf,
    accounts_path: PathBuf,
}

pub struct Backend {
    pub session: Arc<SessionContext>,
    offline: Option<OfflineFiles>,
}

impl Backend {
    pub fn connect(settings: &Settings, paths: &SkillSwapPaths) -> Result<Self> {
        if settings.offline {
            return Self::offline(paths);
        }

        let token = AuthToken::new();
        let store = RestStore::new(&settings.rest_config()?, token.clone())
            .context("Failed to create store client")?;
        let auth = IdentityToolkitAuth::new(settings.auth_config()?);
        let cache = FileCache::new(&paths.cache_dir).context("Failed to open session cache")?;
        info!("Using remote store at {}", settings.store.database_url.as_deref().unwrap_or(""));

        Ok(Backend {
            session: Arc::new(SessionContext::new(
                Arc::new(store),
                Arc::new(auth),
                Arc::new(cache),
                token,
            )),
            offline: None,
        })
    }

    /// In-process backends restored from the data directory
    pub fn offline(paths: &SkillSwapPaths) -> Result<Self> {
        let store = match read_json(&paths.offline_store)? {
            Some(data) => MemoryStore::with_data(data),
            None => MemoryStore::new(),
        };
        let auth = match read_json(&paths.offline_accounts)? {
            Some(accounts) => MemoryAuth::import(accounts)
                .with_context(|| format!("Invalid {}", paths.offline_accounts.display()))?,
            None => MemoryAuth::new(),
        };
        let cache = FileCache::new(&paths.cache_dir).context("Failed to open session cache")?;
        info!("Offline mode, data in {}", paths.data_dir.display());

        Ok(Backend {
            session: Arc::new(SessionContext::new(
                Arc::new(store.clone()),
                Arc::new(auth.clone()),
                Arc::new(cache),
                AuthToken::new(),
            )),
            offline: Some(OfflineFiles {
                store,
                auth,
                store_path: paths.offline_store.clone(),
                accounts_path: paths.offline_accounts.clone(),
            }),
        })
    }

    pub fn is_offline(&self) -> bool {
        self.offline.is_some()
    }

    /// Offline accounts, for marking emails verified
    pub fn offline_auth(&self) -> Option<&MemoryAuth> {
        self.offline.as_ref().map(|o| &o.auth)
    }

    /// Offline store contents
    pub fn offline_store(&self) -> Option<&MemoryStore> {
        self.offline.as_ref().map(|o| &o.store)
    }

    /// Write offline data back to disk; nothing to do online
    pub fn save(&self) -> Result<()> {
        let Some(offline) = &self.offline else {
            return Ok(());
        };
        write_json(&offline.store_path, &offline.store.dump())?;
        write_json(&offline.accounts_path, &offline.auth.export())?;
        debug!("Saved offline data");
        Ok(())
    }
}

fn read_json(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(Some(value))
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}
