//! Store configuration loading
//!
//! Loads configuration from `~/.config/halalmatches/config.toml` (or the
//! `HALALMATCHES_CONFIG` env var). A missing file yields defaults.
//! `HALALMATCHES_DB_PATH` and `HALALMATCHES_KEY_PREFIX` override the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{Result, StoreError};
use crate::keys::{DEFAULT_KEY_PREFIX, KeyNamespace};
use crate::media::{MAX_MEDIA_ITEMS, MediaPolicy};
use crate::readiness::DEFAULT_READINESS_THRESHOLD;

/// Root configuration for the record store
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Prefix prepended to every storage key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Path to the SQLite database used by the CLI
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Maximum number of linked photos
    #[serde(default = "default_media_limit")]
    pub media_limit: usize,

    /// Completion percentage at which the profile step counts as done
    #[serde(default = "default_readiness_threshold")]
    pub readiness_threshold: u8,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_db_path() -> String {
    dirs::data_dir()
        .map(|d| {
            d.join("halalmatches")
                .join("store.db")
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_else(|| "halalmatches-store.db".to_string())
}

fn default_media_limit() -> usize {
    MAX_MEDIA_ITEMS
}

fn default_readiness_threshold() -> u8 {
    DEFAULT_READINESS_THRESHOLD
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            db_path: default_db_path(),
            media_limit: default_media_limit(),
            readiness_threshold: default_readiness_threshold(),
        }
    }
}

impl StoreConfig {
    /// Environment variable pointing at the config file
    pub const ENV_CONFIG_PATH: &'static str = "HALALMATCHES_CONFIG";

    /// Environment override for `db_path`
    pub const ENV_DB_PATH: &'static str = "HALALMATCHES_DB_PATH";

    /// Environment override for `key_prefix`
    pub const ENV_KEY_PREFIX: &'static str = "HALALMATCHES_KEY_PREFIX";

    /// Default config filename
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "config.toml";

    /// Load configuration from file, then apply environment overrides.
    ///
    /// Resolution order:
    /// 1. `HALALMATCHES_CONFIG` environment variable
    /// 2. `~/.config/halalmatches/config.toml`
    pub fn load() -> Result<Self> {
        let path = Self::resolve_config_path();

        let cfg = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            tracing::debug!(path = %path.display(), "store config not found, using defaults");
            Self::default()
        };

        cfg.with_env_overrides(|var| std::env::var(var).ok())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::config(format!("failed to read config at {}: {e}", path.display()))
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: StoreConfig = toml::from_str(contents)
            .map_err(|e| StoreError::config(format!("failed to parse config: {e}")))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides read through `lookup` (normally the process env).
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = lookup(Self::ENV_DB_PATH).filter(|v| !v.is_empty()) {
            self.db_path = db_path;
        }
        if let Some(prefix) = lookup(Self::ENV_KEY_PREFIX) {
            self.key_prefix = prefix;
        }
        self.validate()?;
        Ok(self)
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("halalmatches")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }

    fn validate(&self) -> Result<()> {
        if self.key_prefix.is_empty() {
            return Err(StoreError::config(
                "key_prefix must not be empty; unprefixed keys would collide with unrelated data",
            ));
        }
        if self.media_limit == 0 {
            return Err(StoreError::config("media_limit must be at least 1"));
        }
        if self.readiness_threshold > 100 {
            return Err(StoreError::config(format!(
                "readiness_threshold must be a percentage, got {}",
                self.readiness_threshold
            )));
        }
        Ok(())
    }

    /// Photo policy using `media_limit`.
    pub fn media_policy(&self) -> MediaPolicy {
        MediaPolicy::new(self.media_limit)
    }

    /// Key namespace for this configuration.
    pub fn namespace(&self) -> KeyNamespace {
        KeyNamespace::new(self.key_prefix.clone())
    }

    /// Get the resolved database path (expanding ~ if needed)
    pub fn resolved_db_path(&self) -> PathBuf {
        let path = &self.db_path;
        if let Some(stripped) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.key_prefix, "halalmatches_");
        assert_eq!(cfg.media_limit, 6);
        assert_eq!(cfg.readiness_threshold, 60);
        assert!(cfg.db_path.ends_with("store.db"));
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let cfg = StoreConfig::parse(
            r#"
            db_path = "/tmp/hm.db"
            media_limit = 4
            "#,
        )
        .unwrap();
        assert_eq!(cfg.db_path, "/tmp/hm.db");
        assert_eq!(cfg.media_limit, 4);
        assert_eq!(cfg.key_prefix, "halalmatches_");
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for toml in [
            r#"key_prefix = """#,
            "media_limit = 0",
            "readiness_threshold = 101",
            "media_limit = \"six\"",
        ] {
            let err = StoreConfig::parse(toml).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::ConfigError, "{toml}");
        }
    }

    #[test]
    fn test_env_overrides() {
        let cfg = StoreConfig::default()
            .with_env_overrides(|var| match var {
                StoreConfig::ENV_DB_PATH => Some("/srv/hm/store.db".to_string()),
                StoreConfig::ENV_KEY_PREFIX => Some("staging_".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(cfg.db_path, "/srv/hm/store.db");
        assert_eq!(cfg.namespace().prefix(), "staging_");
    }

    #[test]
    fn test_empty_prefix_override_rejected() {
        let result = StoreConfig::default().with_env_overrides(|var| {
            (var == StoreConfig::ENV_KEY_PREFIX).then(String::new)
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "readiness_threshold = 70\n").unwrap();

        let cfg = StoreConfig::load_from_path(&path).unwrap();
        assert_eq!(cfg.readiness_threshold, 70);
    }

    #[test]
    fn test_resolved_db_path_expands_home() {
        let cfg = StoreConfig {
            db_path: "~/hm/store.db".to_string(),
            ..StoreConfig::default()
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(cfg.resolved_db_path(), home.join("hm/store.db"));
        }
    }
}
