//! System paths and directory management for SkillSwap
//!
//! This module handles platform-appropriate directory locations for:
//! - Configuration files
//! - The local session cache
//! - Offline-mode data
//!
//! It follows XDG Base Directory specification on Linux and platform conventions
//! on macOS and Windows.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_QUALIFIER: &str = "app";
const APP_ORGANIZATION: &str = "skillswap";
const APP_NAME: &str = "skillswap";

/// System paths for SkillSwap
#[derive(Debug, Clone)]
pub struct SkillSwapPaths {
    /// Root data directory
    pub data_dir: PathBuf,

    /// Configuration directory
    pub config_dir: PathBuf,

    /// Session cache directory (`user` and `userProfile` slots)
    pub cache_dir: PathBuf,

    /// Remote store contents in offline mode
    pub offline_store: PathBuf,

    /// Accounts in offline mode
    pub offline_accounts: PathBuf,
}

impl SkillSwapPaths {
    /// Create paths using system defaults
    ///
    /// - Linux: ~/.local/share/skillswap, ~/.config/skillswap, ~/.cache/skillswap
    /// - macOS: ~/Library/Application Support/app.skillswap.skillswap, ...
    /// - Windows: %APPDATA%\skillswap\skillswap, ...
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .context("Failed to determine system directories")?;

        let data_dir = project_dirs.data_dir().to_path_buf();
        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
            cache_dir: project_dirs.cache_dir().to_path_buf(),
            offline_store: data_dir.join("offline-store.json"),
            offline_accounts: data_dir.join("offline-accounts.json"),
            data_dir,
        })
    }

    /// Create paths with custom root directory
    ///
    /// All paths will be placed under the root directory.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();

        Self {
            data_dir: root.clone(),
            config_dir: root.join("config"),
            cache_dir: root.join("cache"),
            offline_store: root.join("offline-store.json"),
            offline_accounts: root.join("offline-accounts.json"),
        }
    }

    /// Create all necessary directories. Safe to call multiple times.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.data_dir, &self.config_dir, &self.cache_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Get default config file path
    pub fn default_config_file(&self) -> PathBuf {
        self.config_dir.join("config.yaml")
    }

    /// Display paths for informational purposes
    pub fn display(&self) -> String {
        format!(
            "SkillSwap paths:
  Data directory:    {}
  Config directory:  {}
  Cache directory:   {}
  Offline store:     {}
  Offline accounts:  {}",
            self.data_dir.display(),
            self.config_dir.display(),
            self.cache_dir.display(),
            self.offline_store.display(),
            self.offline_accounts.display()
        )
    }
}

/// Configuration overrides for paths
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Override data directory; offline files move with it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl PathsConfig {
    pub fn is_empty(&self) -> bool {
        self.data_dir.is_none() && self.config_dir.is_none() && self.cache_dir.is_none()
    }

    /// Apply overrides to default paths
    pub fn apply_to(&self, mut paths: SkillSwapPaths) -> SkillSwapPaths {
        if let Some(ref data_dir) = self.data_dir {
            paths.offline_store = data_dir.join("offline-store.json");
            paths.offline_accounts = data_dir.join("offline-accounts.json");
            paths.data_dir = data_dir.clone();
        }
        if let Some(ref config_dir) = self.config_dir {
            paths.config_dir = config_dir.clone();
        }
        if let Some(ref cache_dir) = self.cache_dir {
            paths.cache_dir = cache_dir.clone();
        }
        paths
    }

    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: &PathsConfig) -> PathsConfig {
        PathsConfig {
            data_dir: self.data_dir.or_else(|| fallback.data_dir.clone()),
            config_dir: self.config_dir.or_else(|| fallback.config_dir.clone()),
            cache_dir: self.cache_dir.or_else(|| fallback.cache_dir.clone()),
        }
    }
}

/// Path overrides from environment variables:
/// - SKILLSWAP_DATA_DIR
/// - SKILLSWAP_CONFIG_DIR
/// - SKILLSWAP_CACHE_DIR
pub fn paths_from_env() -> PathsConfig {
    PathsConfig {
        data_dir: std::env::var("SKILLSWAP_DATA_DIR").ok().map(PathBuf::from),
        config_dir: std::env::var("SKILLSWAP_CONFIG_DIR").ok().map(PathBuf::from),
        cache_dir: std::env::var("SKILLSWAP_CACHE_DIR").ok().map(PathBuf::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_or_prefers_self() {
        let temp_dir = TempDir::new().unwrap();
        let cli = PathsConfig {
            cache_dir: Some(temp_dir.path().join("cli")),
            ..Default::default()
        };
        let file = PathsConfig {
            cache_dir: Some(temp_dir.path().join("file")),
            data_dir: Some(temp_dir.path().join("data")),
            ..Default::default()
        };

        let merged = cli.or(&file);
        assert_eq!(merged.cache_dir, Some(temp_dir.path().join("cli")));
        assert_eq!(merged.data_dir, Some(temp_dir.path().join("data")));
        assert_eq!(merged.config_dir, None);
    }
}
