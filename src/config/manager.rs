use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::resolve::{ResolvedConfig, resolve_config};
use crate::error::ConfigError;
use crate::fs::{atomic_write, restrict_to_owner};
use crate::paths;

/// Configuration for one translation provider.
///
/// `kind` may be omitted when the name is itself a provider kind
/// (e.g. a provider named `deepl`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// API key stored directly in config (not recommended).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Azure resource region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Lower values are tried first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Environment variable consulted for this provider's key.
    pub fn api_key_env_name(&self) -> String {
        self.api_key_env
            .clone()
            .unwrap_or_else(|| default_api_key_env(&self.name))
    }

    /// Gets the API key, preferring the environment over the config file.
    pub fn resolve_api_key<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = env(&self.api_key_env_name())
            && !key.trim().is_empty()
        {
            return Some(key.trim().to_string());
        }
        self.api_key.clone().filter(|k| !k.trim().is_empty())
    }
}

/// `LINGO_<NAME>_API_KEY`, with non-alphanumerics mapped to `_`.
pub fn default_api_key_env(provider_name: &str) -> String {
    let name: String = provider_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("LINGO_{name}_API_KEY")
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/lingo/config.json`. Unset options take their
/// defaults during resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_target: Option<String>,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_threshold: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

impl ConfigFile {
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Inserts `provider`, replacing any provider with the same name.
    pub fn upsert_provider(&mut self, provider: ProviderConfig) {
        if let Some(existing) = self.providers.iter_mut().find(|p| p.name == provider.name) {
            *existing = provider;
        } else {
            self.providers.push(provider);
        }
    }
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the default location.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/lingo/config.json`
    /// or `~/.config/lingo/config.json` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::with_path(paths::config_file()?))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.config_path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    pub fn load(&self) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(&self.config_path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ConfigError::Missing {
                    path: self.config_path.clone(),
                }
            } else {
                ConfigError::Io {
                    path: self.config_path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::Malformed {
            path: self.config_path.clone(),
            source,
        })
    }

    /// Loads and validates the file in one step.
    pub fn load_resolved(&self) -> Result<ResolvedConfig, ConfigError> {
        resolve_config(&self.load()?)
    }

    /// Writes `config` as pretty JSON.
    ///
    /// The previous file, if any, is kept as `config.json.bak`. The new
    /// file is only readable by its owner.
    pub fn save(&self, config: &ConfigFile) -> Result<(), ConfigError> {
        let io_error = |source: std::io::Error| ConfigError::Io {
            path: self.config_path.clone(),
            source,
        };

        let mut contents = serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::Invalid(format!("Failed to serialize config: {e}")))?;
        contents.push('\n');

        if self.config_path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.config_path, &backup).map_err(io_error)?;
            restrict_to_owner(&backup).map_err(io_error)?;
            debug!(path = %backup.display(), "Backed up previous config");
        }

        atomic_write(&self.config_path, &contents).map_err(io_error)?;
        restrict_to_owner(&self.config_path).map_err(io_error)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_manager(temp_dir: &TempDir) -> ConfigManager {
        ConfigManager::with_path(temp_dir.path().join("config.json"))
    }

    fn sample_config() -> ConfigFile {
        ConfigFile {
            default_target: Some("es".to_string()),
            providers: vec![
                ProviderConfig {
                    api_key: Some("deepl-key".to_string()),
                    priority: Some(1),
                    ..ProviderConfig::new("deepl")
                },
                ProviderConfig {
                    kind: Some("libretranslate".to_string()),
                    endpoint: Some("http://localhost:5000".to_string()),
                    ..ProviderConfig::new("local")
                },
            ],
            history_limit: Some(50),
            ..ConfigFile::default()
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        manager.save(&sample_config()).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded, sample_config());
        assert_eq!(loaded.provider("local").unwrap().priority, None);
    }

    #[test]
    fn test_saved_file_uses_camel_case() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        manager.save(&sample_config()).unwrap();
        let raw = fs::read_to_string(manager.config_path()).unwrap();

        assert!(raw.contains("\"defaultTarget\""));
        assert!(raw.contains("\"apiKey\""));
        assert!(raw.contains("\"historyLimit\""));
        assert!(!raw.contains("cacheTtlSeconds"));
    }

    #[test]
    fn test_save_keeps_backup() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        manager.save(&sample_config()).unwrap();
        let mut updated = sample_config();
        updated.default_target = Some("fr".to_string());
        manager.save(&updated).unwrap();

        let backup: ConfigFile =
            serde_json::from_str(&fs::read_to_string(manager.backup_path()).unwrap()).unwrap();
        assert_eq!(backup.default_target.as_deref(), Some("es"));
        assert_eq!(
            manager.load().unwrap().default_target.as_deref(),
            Some("fr")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        manager.save(&sample_config()).unwrap();

        let mode = fs::metadata(manager.config_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);

        let err = manager.load().unwrap_err();
        assert!(matches!(err, ConfigError::Missing { .. }));
    }

    #[test]
    fn test_load_malformed_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = create_test_manager(&temp_dir);
        fs::write(manager.config_path(), "{ \"providers\": [").unwrap();

        let err = manager.load().unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn test_provider_api_key_from_env() {
        let provider = ProviderConfig {
            api_key: Some("fallback-key".to_string()),
            api_key_env: Some("TEST_API_KEY".to_string()),
            ..ProviderConfig::new("google")
        };

        let env = |name: &str| (name == "TEST_API_KEY").then(|| "env-key".to_string());
        assert_eq!(provider.resolve_api_key(env), Some("env-key".to_string()));
    }

    #[test]
    fn test_provider_api_key_fallback() {
        let provider = ProviderConfig {
            api_key: Some("fallback-key".to_string()),
            ..ProviderConfig::new("google")
        };

        assert_eq!(
            provider.resolve_api_key(|_| None),
            Some("fallback-key".to_string())
        );
        assert_eq!(
            provider.resolve_api_key(|_| Some("   ".to_string())),
            Some("fallback-key".to_string())
        );
    }

    #[test]
    fn test_default_api_key_env() {
        assert_eq!(default_api_key_env("deepl"), "LINGO_DEEPL_API_KEY");
        assert_eq!(default_api_key_env("my-libre"), "LINGO_MY_LIBRE_API_KEY");
    }

    #[test]
    fn test_upsert_provider_replaces_by_name() {
        let mut config = sample_config();
        config.upsert_provider(ProviderConfig {
            api_key: Some("new".to_string()),
            ..ProviderConfig::new("deepl")
        });
        config.upsert_provider(ProviderConfig::new("google"));

        assert_eq!(config.providers.len(), 3);
        assert_eq!(
            config.provider("deepl").unwrap().api_key.as_deref(),
            Some("new")
        );
    }
}
