//! Configuration management for jwt-forge

use config::Environment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{ForgeError, Result};
use crate::key::KeyPaths;

/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "jwt-forge";

/// Prefix for environment overrides (`JWT_FORGE_KEY_BITS`, ...)
pub const ENV_PREFIX: &str = "JWT_FORGE";

/// Key size used when nothing else is configured
pub const DEFAULT_KEY_BITS: u32 = 2048;

/// Persisted per-user configuration
///
/// Missing fields are backfilled from [`Config::default`] when the file is read,
/// so a loaded value always carries all three settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    pub key_bits: u32,
}

impl Default for Config {
    fn default() -> Self {
        let keys_dir = default_keys_dir();
        Self {
            private_key_path: keys_dir.join("private.pem"),
            public_key_path: keys_dir.join("public.pem"),
            key_bits: DEFAULT_KEY_BITS,
        }
    }
}

impl Config {
    /// Load the config file, creating it with defaults on first run
    ///
    /// A file that exists but cannot be parsed is reported and the defaults are
    /// used for this invocation; the broken file is left untouched.
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path(),
        };

        if !config_file.exists() {
            let config = Self::default();
            config.save(&config_file).await?;
            tracing::debug!("Created default config at {}", config_file.display());
            return Ok(config);
        }

        let content = match fs::read_to_string(&config_file).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    "Error loading config {}, using defaults: {}",
                    config_file.display(),
                    e
                );
                return Ok(Self::default());
            }
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", config_file.display());
                Ok(config)
            }
            Err(e) => {
                tracing::warn!(
                    "Error parsing config {}, using defaults: {}",
                    config_file.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Write the whole config, replacing whatever was on disk
    pub async fn save(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ForgeError::write_failed(
                    format!("Create config directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content).await.map_err(|e| {
            ForgeError::write_failed(format!("Write config {}", config_path.display()), e)
        })?;
        Ok(())
    }

    /// Apply `JWT_FORGE_*` environment overrides for this invocation
    pub fn with_env_overrides(self) -> Result<Self> {
        Ok(EnvOverrides::from_env()?.apply(self))
    }

    /// Resolved key file locations
    pub fn key_paths(&self) -> KeyPaths {
        KeyPaths {
            private_key_path: self.private_key_path.clone(),
            public_key_path: self.public_key_path.clone(),
        }
    }
}

/// Per-invocation overrides read from the environment
///
/// These are never written back to the config file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvOverrides {
    pub private_key_path: Option<PathBuf>,
    pub public_key_path: Option<PathBuf>,
    pub key_bits: Option<u32>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_source(None)
    }

    /// Read overrides from an explicit variable map instead of the process environment
    pub fn from_source(source: Option<config::Map<String, String>>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(source),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn apply(self, mut config: Config) -> Config {
        if let Some(path) = self.private_key_path {
            config.private_key_path = path;
        }
        if let Some(path) = self.public_key_path {
            config.public_key_path = path;
        }
        if let Some(bits) = self.key_bits {
            config.key_bits = bits;
        }
        config
    }
}

pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

pub fn default_keys_dir() -> PathBuf {
    default_config_dir().join("keys")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::utils::test_helpers::*;

    #[test]
    fn test_default_paths_live_under_app_dir() {
        let config = Config::default();
        assert_eq!(config.key_bits, 2048);
        assert!(config.private_key_path.ends_with("jwt-forge/keys/private.pem"));
        assert!(config.public_key_path.ends_with("jwt-forge/keys/public.pem"));
    }

    #[test]
    fn test_serialized_field_names() {
        let config = Config {
            private_key_path: PathBuf::from("/k/private.pem"),
            public_key_path: PathBuf::from("/k/public.pem"),
            key_bits: 3072,
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["privateKeyPath"], "/k/private.pem");
        assert_eq!(value["publicKeyPath"], "/k/public.pem");
        assert_eq!(value["keyBits"], 3072);
    }

    #[tokio::test]
    async fn test_load_creates_default_on_first_run() {
        let temp_dir = create_temp_dir();
        let path = temp_dir.path().join("nested").join("config.json");

        let config = Config::load(Some(&path)).await.unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["keyBits"], 2048);
    }

    #[tokio::test]
    async fn test_load_backfills_missing_fields() {
        let temp_dir = create_temp_dir();
        let path = create_temp_file_with_content(
            &temp_dir,
            "config.json",
            br#"{"keyBits": 3072}"#,
        );

        let config = Config::load(Some(&path)).await.unwrap();
        assert_eq!(config.key_bits, 3072);
        assert_eq!(config.private_key_path, Config::default().private_key_path);
        assert_eq!(config.public_key_path, Config::default().public_key_path);
    }

    #[tokio::test]
    async fn test_load_invalid_json_uses_defaults_without_overwriting() {
        let temp_dir = create_temp_dir();
        let path = create_temp_file_with_content(&temp_dir, "config.json", b"{not json");

        let config = Config::load(Some(&path)).await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[tokio::test]
    async fn test_save_rewrites_whole_file() {
        let temp_dir = create_temp_dir();
        let path = create_temp_file_with_content(
            &temp_dir,
            "config.json",
            br#"{"keyBits": 2048, "legacy": true}"#,
        );

        let mut config = Config::load(Some(&path)).await.unwrap();
        config.key_bits = 3072;
        config.save(&path).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["keyBits"], 3072);
        assert!(written.get("legacy").is_none());
        assert!(written.get("privateKeyPath").is_some());
    }

    #[test]
    fn test_env_overrides_from_source() {
        let mut vars = config::Map::new();
        vars.insert(
            "JWT_FORGE_PRIVATE_KEY_PATH".to_string(),
            "/secure/private.pem".to_string(),
        );
        vars.insert("JWT_FORGE_KEY_BITS".to_string(), "3072".to_string());
        vars.insert("UNRELATED_KEY_BITS".to_string(), "1024".to_string());

        let overrides = EnvOverrides::from_source(Some(vars)).unwrap();
        assert_eq!(
            overrides.private_key_path,
            Some(PathBuf::from("/secure/private.pem"))
        );
        assert_eq!(overrides.public_key_path, None);
        assert_eq!(overrides.key_bits, Some(3072));

        let config = overrides.apply(Config::default());
        assert_eq!(config.private_key_path, PathBuf::from("/secure/private.pem"));
        assert_eq!(config.public_key_path, Config::default().public_key_path);
        assert_eq!(config.key_bits, 3072);
    }

    #[test]
    fn test_empty_env_overrides_change_nothing() {
        let overrides = EnvOverrides::from_source(Some(config::Map::new())).unwrap();
        assert_eq!(overrides, EnvOverrides::default());
        assert_eq!(overrides.apply(Config::default()), Config::default());
    }
}
