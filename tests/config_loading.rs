#![allow(clippy::unwrap_used)]
//! Configuration loading contract tests.
//!
//! Tests that read API keys from the process environment are serialized.

use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

use lingo_cli::config::{ConfigFile, ConfigManager, ProviderConfig};
use lingo_cli::error::{ConfigError, TranslationError};
use lingo_cli::provider::ProviderKind;

fn with_env<F: FnOnce()>(var: &str, value: Option<&str>, f: F) {
    let original = std::env::var(var).ok();
    // SAFETY: tests touching the environment are serialized.
    unsafe {
        match value {
            Some(v) => std::env::set_var(var, v),
            None => std::env::remove_var(var),
        }
    }

    f();

    // SAFETY: see above.
    unsafe {
        match original {
            Some(v) => std::env::set_var(var, v),
            None => std::env::remove_var(var),
        }
    }
}

fn write_config(dir: &TempDir, json: &str) -> ConfigManager {
    let path = dir.path().join("config.json");
    fs::write(&path, json).unwrap();
    ConfigManager::with_path(path)
}

#[test]
fn test_missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_path(dir.path().join("config.json"));

    let err = manager.load_resolved().unwrap_err();
    assert!(matches!(err, ConfigError::Missing { .. }));

    let err = TranslationError::from(err);
    assert_eq!(err.exit_code(), exitcode::CONFIG);
    assert!(err.hint().unwrap().contains("lingo --config"));
}

#[test]
fn test_malformed_json_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let manager = write_config(&dir, r#"{ "providers": [ { "name": "libre" "#);

    let err = manager.load_resolved().unwrap_err();
    assert!(matches!(err, ConfigError::Malformed { .. }));
}

#[test]
#[serial]
fn test_defaults_apply_to_minimal_file() {
    let dir = TempDir::new().unwrap();
    let manager = write_config(&dir, r#"{ "providers": [ { "name": "libretranslate" } ] }"#);

    let config = manager.load_resolved().unwrap();

    assert_eq!(config.default_source, None);
    assert_eq!(config.default_target, "en");
    assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
    assert_eq!(config.history_limit, 100);
    assert!(config.history_enabled);
    assert_eq!(config.request_timeout, Duration::from_secs(10));
    assert_eq!(config.concurrency, 4);
    assert_eq!(config.providers[0].kind, ProviderKind::LibreTranslate);
}

#[test]
#[serial]
fn test_environment_key_beats_file_key() {
    let dir = TempDir::new().unwrap();
    let manager = write_config(
        &dir,
        r#"{ "providers": [ { "name": "deepl", "apiKey": "from-file" } ] }"#,
    );

    with_env("LINGO_DEEPL_API_KEY", Some("from-env"), || {
        let config = manager.load_resolved().unwrap();
        assert_eq!(config.providers[0].api_key.as_deref(), Some("from-env"));
    });

    with_env("LINGO_DEEPL_API_KEY", None, || {
        let config = manager.load_resolved().unwrap();
        assert_eq!(config.providers[0].api_key.as_deref(), Some("from-file"));
    });
}

#[test]
#[serial]
fn test_custom_key_variable_is_honored() {
    let dir = TempDir::new().unwrap();
    let manager = write_config(
        &dir,
        r#"{ "providers": [ { "name": "work", "kind": "google", "apiKeyEnv": "WORK_GOOGLE_KEY" } ] }"#,
    );

    with_env("WORK_GOOGLE_KEY", None, || {
        let err = manager.load_resolved().unwrap_err();
        assert!(err.to_string().contains("work"));
    });

    with_env("WORK_GOOGLE_KEY", Some("g-123"), || {
        let config = manager.load_resolved().unwrap();
        assert_eq!(config.providers[0].kind, ProviderKind::Google);
        assert_eq!(config.providers[0].api_key.as_deref(), Some("g-123"));
    });
}

#[test]
#[serial]
fn test_invalid_values_are_all_reported() {
    let dir = TempDir::new().unwrap();
    let manager = write_config(
        &dir,
        r#"{
            "defaultTarget": "klingon",
            "detectionThreshold": 1.5,
            "concurrency": 0,
            "providers": [ { "name": "libretranslate", "endpoint": "ftp://example.com" } ]
        }"#,
    );

    let err = manager.load_resolved().unwrap_err();
    let message = err.to_string();

    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(message.contains("klingon"));
    assert!(message.contains("ftp://example.com"));
    assert!(message.contains("concurrency"));
}

#[test]
#[serial]
fn test_providers_follow_priority_then_file_order() {
    let dir = TempDir::new().unwrap();
    let manager = write_config(
        &dir,
        r#"{ "providers": [
            { "name": "libretranslate" },
            { "name": "backup", "kind": "libre", "endpoint": "http://localhost:5000" },
            { "name": "preferred", "kind": "libretranslate", "endpoint": "http://localhost:5001", "priority": 1 }
        ] }"#,
    );

    let config = manager.load_resolved().unwrap();
    assert_eq!(
        config.provider_names(),
        ["preferred", "libretranslate", "backup"]
    );
}

#[test]
fn test_save_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));
    let config = ConfigFile {
        default_target: Some("ja".to_string()),
        providers: vec![ProviderConfig::new("libretranslate")],
        ..ConfigFile::default()
    };

    manager.save(&config).unwrap();
    assert_eq!(manager.load().unwrap(), config);

    manager.save(&config).unwrap();
    assert!(manager.backup_path().exists());
}
