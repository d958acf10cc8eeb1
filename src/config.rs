//! Settings
//!
//! Read from a YAML file, then overlaid with `SKILLSWAP__*` environment
//! variables (`SKILLSWAP__STORE__DATABASE_URL` sets `store.database_url`).
//! Command-line flags are applied last by the binary.

use crate::paths::PathsConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skillswap_store::auth::AuthConfig;
use skillswap_store::RestConfig;
use std::path::Path;
use tracing::info;

pub const ENV_PREFIX: &str = "SKILLSWAP";

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_identity_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_token_url() -> String {
    "https://securetoken.googleapis.com/v1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the REST database, e.g. `https://example-rtdb.firebaseio.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Interval between polls of a subscribed path
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            database_url: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_identity_url")]
    pub identity_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            api_key: None,
            identity_url: default_identity_url(),
            token_url: default_token_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default, skip_serializing_if = "PathsConfig::is_empty")]
    pub paths: PathsConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Use in-process backends kept under the data directory
    #[serde(default)]
    pub offline: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            store: StoreSettings::default(),
            auth: AuthSettings::default(),
            paths: PathsConfig::default(),
            log_level: default_log_level(),
            offline: false,
        }
    }
}

impl Settings {
    /// Load `path` (if it exists) and overlay the environment
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading config from: {}", path.display());
        } else {
            info!("Config file not found: {}, using defaults", path.display());
        }

        let settings = ::config::Config::builder()
            .add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Write the settings as YAML, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_yaml()?)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn rest_config(&self) -> Result<RestConfig> {
        let database_url = self
            .store
            .database_url
            .clone()
            .context("store.database_url is not set (or use --offline)")?;
        Ok(RestConfig {
            database_url,
            poll_interval_ms: self.store.poll_interval_ms,
        })
    }

    pub fn auth_config(&self) -> Result<AuthConfig> {
        let api_key = self
            .auth
            .api_key
            .clone()
            .context("auth.api_key is not set (or use --offline)")?;
        Ok(AuthConfig {
            api_key,
            identity_url: self.auth.identity_url.clone(),
            token_url: self.auth.token_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(&temp_dir.path().join("absent.yaml")).unwrap();
        assert_eq!(settings.store.poll_interval_ms, 5000);
        assert!(!settings.offline);
        assert!(settings.rest_config().is_err());
    }

    #[test]
    fn test_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "store:\n  database_url: https://db.example.com\n  poll_interval_ms: 250\nauth:\n  api_key: k1\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        let rest = settings.rest_config().unwrap();
        assert_eq!(rest.database_url, "https://db.example.com");
        assert_eq!(rest.poll_interval_ms, 250);
        let auth = settings.auth_config().unwrap();
        assert_eq!(auth.api_key, "k1");
        assert_eq!(auth.token_url, "https://securetoken.googleapis.com/v1");
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.yaml");
        let settings = Settings {
            offline: true,
            log_level: "debug".to_string(),
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }
}
