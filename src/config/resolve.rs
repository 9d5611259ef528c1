use std::collections::HashSet;
use std::time::Duration;

use super::manager::{ConfigFile, ProviderConfig};
use crate::error::ConfigError;
use crate::provider::ProviderKind;
use crate::translation::{AUTO, is_auto, normalize_language};

pub const DEFAULT_TARGET: &str = "en";
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 24 * 60 * 60;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.5;
pub const DEFAULT_CONCURRENCY: usize = 4;
pub const MAX_CONCURRENCY: usize = 32;

/// A provider ready to be instantiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub name: String,
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub endpoint: String,
    pub region: Option<String>,
}

/// Validated configuration with every default filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// `None` means detect the source language.
    pub default_source: Option<String>,
    pub default_target: String,
    /// Providers in the order they are tried.
    pub providers: Vec<ResolvedProvider>,
    pub cache_ttl: Duration,
    pub history_limit: usize,
    pub history_enabled: bool,
    pub request_timeout: Duration,
    pub detection_threshold: f32,
    pub concurrency: usize,
}

impl ResolvedConfig {
    pub fn provider(&self, name: &str) -> Option<&ResolvedProvider> {
        self.providers.iter().find(|p| p.name == name)
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Validates `file`, reading API keys from the process environment.
pub fn resolve_config(file: &ConfigFile) -> Result<ResolvedConfig, ConfigError> {
    resolve_config_with_env(file, |name| std::env::var(name).ok())
}

/// Validates `file` using `env` to look up API key variables.
///
/// Every problem found is reported together; nothing is returned unless the
/// whole file is valid.
pub fn resolve_config_with_env<F>(file: &ConfigFile, env: F) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut problems = Vec::new();

    if file.providers.is_empty() {
        problems.push("at least one provider must be configured".to_string());
    }

    let mut seen = HashSet::new();
    let mut providers = Vec::new();
    for (index, provider) in file.providers.iter().enumerate() {
        let name = provider.name.trim();
        if !seen.insert(name) {
            problems.push(format!("duplicate provider name '{name}'"));
            continue;
        }
        match resolve_provider(provider, &env) {
            Ok(resolved) => providers.push((provider.priority, index, resolved)),
            Err(problem) => problems.push(problem),
        }
    }
    // Unset priority sorts last; ties keep file order.
    providers.sort_by_key(|(priority, index, _)| (priority.is_none(), *priority, *index));

    let default_source = match file.default_source.as_deref() {
        None => None,
        Some(code) if is_auto(code) => None,
        Some(code) => {
            if let Some(canonical) = normalize_language(code) {
                Some(canonical.to_string())
            } else {
                problems.push(format!("defaultSource '{code}' is not a supported language"));
                None
            }
        }
    };

    let target = file.default_target.as_deref().unwrap_or(DEFAULT_TARGET);
    let default_target = if target.eq_ignore_ascii_case(AUTO) {
        problems.push("defaultTarget cannot be 'auto'".to_string());
        String::new()
    } else {
        normalize_language(target).map_or_else(
            || {
                problems.push(format!("defaultTarget '{target}' is not a supported language"));
                String::new()
            },
            str::to_string,
        )
    };

    let cache_ttl_seconds = file.cache_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECONDS);
    if cache_ttl_seconds == 0 {
        problems.push("cacheTtlSeconds must be positive".to_string());
    }

    let history_limit = file.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if history_limit == 0 {
        problems.push("historyLimit must be positive".to_string());
    }

    let timeout_seconds = file
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);
    if timeout_seconds == 0 {
        problems.push("requestTimeoutSeconds must be positive".to_string());
    }

    let detection_threshold = file
        .detection_threshold
        .unwrap_or(DEFAULT_DETECTION_THRESHOLD);
    if !(0.0..=1.0).contains(&detection_threshold) {
        problems.push(format!(
            "detectionThreshold must be between 0 and 1, got {detection_threshold}"
        ));
    }

    let concurrency = file.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
    if !(1..=MAX_CONCURRENCY).contains(&concurrency) {
        problems.push(format!(
            "concurrency must be between 1 and {MAX_CONCURRENCY}, got {concurrency}"
        ));
    }

    if !problems.is_empty() {
        return Err(ConfigError::Invalid(problems.join("; ")));
    }

    Ok(ResolvedConfig {
        default_source,
        default_target,
        providers: providers.into_iter().map(|(_, _, p)| p).collect(),
        cache_ttl: Duration::from_secs(cache_ttl_seconds),
        history_limit,
        history_enabled: file.history_enabled.unwrap_or(true),
        request_timeout: Duration::from_secs(timeout_seconds),
        detection_threshold,
        concurrency,
    })
}

fn resolve_provider<F>(provider: &ProviderConfig, env: &F) -> Result<ResolvedProvider, String>
where
    F: Fn(&str) -> Option<String>,
{
    let name = provider.name.trim();
    if name.is_empty() {
        return Err("provider name cannot be empty".to_string());
    }

    let kind_source = provider.kind.as_deref().unwrap_or(name);
    let kind: ProviderKind = kind_source.parse().map_err(|_| {
        if provider.kind.is_some() {
            format!("provider '{name}' has unknown kind '{kind_source}'")
        } else {
            format!("provider '{name}' needs a 'kind' (google, azure, deepl, libretranslate)")
        }
    })?;

    let endpoint = provider
        .endpoint
        .as_deref()
        .unwrap_or(kind.default_endpoint())
        .trim()
        .to_string();
    match reqwest::Url::parse(&endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => {
            return Err(format!(
                "provider '{name}' has an invalid endpoint '{endpoint}' (expected an http(s) URL)"
            ));
        }
    }

    let api_key = provider.resolve_api_key(env);
    if kind.requires_api_key() && api_key.is_none() {
        return Err(format!(
            "provider '{name}' requires an API key (set {} or apiKey)",
            provider.api_key_env_name()
        ));
    }

    Ok(ResolvedProvider {
        name: name.to_string(),
        kind,
        api_key,
        endpoint,
        region: provider.region.clone().filter(|r| !r.trim().is_empty()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keyed(name: &str, key: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: Some(key.to_string()),
            ..ProviderConfig::new(name)
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn create_test_config() -> ConfigFile {
        ConfigFile {
            providers: vec![
                keyed("google", "g-key"),
                ProviderConfig {
                    kind: Some("libre".to_string()),
                    endpoint: Some("http://localhost:5000".to_string()),
                    ..ProviderConfig::new("local")
                },
            ],
            ..ConfigFile::default()
        }
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let resolved = resolve_config_with_env(&create_test_config(), no_env).unwrap();

        assert_eq!(resolved.default_source, None);
        assert_eq!(resolved.default_target, "en");
        assert_eq!(resolved.cache_ttl, Duration::from_secs(86_400));
        assert_eq!(resolved.history_limit, 100);
        assert!(resolved.history_enabled);
        assert_eq!(resolved.request_timeout, Duration::from_secs(10));
        assert!((resolved.detection_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(resolved.concurrency, 4);
    }

    #[test]
    fn test_resolve_kind_from_name_and_default_endpoint() {
        let resolved = resolve_config_with_env(&create_test_config(), no_env).unwrap();

        let google = resolved.provider("google").unwrap();
        assert_eq!(google.kind, ProviderKind::Google);
        assert_eq!(google.endpoint, ProviderKind::Google.default_endpoint());

        let local = resolved.provider("local").unwrap();
        assert_eq!(local.kind, ProviderKind::LibreTranslate);
        assert_eq!(local.endpoint, "http://localhost:5000");
        assert!(local.api_key.is_none());
    }

    #[test]
    fn test_resolve_orders_by_priority() {
        let mut config = create_test_config();
        config.providers.push(ProviderConfig {
            priority: Some(2),
            ..keyed("deepl", "d-key")
        });
        config.providers.push(ProviderConfig {
            priority: Some(1),
            ..keyed("azure", "a-key")
        });

        let resolved = resolve_config_with_env(&config, no_env).unwrap();
        assert_eq!(
            resolved.provider_names(),
            ["azure", "deepl", "google", "local"]
        );
    }

    #[test]
    fn test_env_key_beats_file_key() {
        let env = |name: &str| (name == "LINGO_GOOGLE_API_KEY").then(|| "from-env".to_string());
        let resolved = resolve_config_with_env(&create_test_config(), env).unwrap();

        assert_eq!(
            resolved.provider("google").unwrap().api_key.as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn test_missing_required_key_is_invalid() {
        let config = ConfigFile {
            providers: vec![ProviderConfig::new("deepl")],
            ..ConfigFile::default()
        };

        let err = resolve_config_with_env(&config, no_env).unwrap_err();
        assert!(err.to_string().contains("LINGO_DEEPL_API_KEY"));
    }

    #[test]
    fn test_no_providers_is_invalid() {
        let err = resolve_config_with_env(&ConfigFile::default(), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("at least one provider"));
    }

    #[test]
    fn test_duplicate_names_are_invalid() {
        let mut config = create_test_config();
        config.providers.push(keyed("google", "other"));

        let err = resolve_config_with_env(&config, no_env).unwrap_err();
        assert!(err.to_string().contains("duplicate provider name 'google'"));
    }

    #[test]
    fn test_duplicate_names_ignore_surrounding_whitespace() {
        let mut config = create_test_config();
        config.providers.push(keyed(" google ", "other"));

        let err = resolve_config_with_env(&config, no_env).unwrap_err();
        assert!(err.to_string().contains("duplicate provider name 'google'"));
    }

    #[test]
    fn test_unknown_kind_is_invalid() {
        let config = ConfigFile {
            providers: vec![keyed("bing", "key")],
            ..ConfigFile::default()
        };

        let err = resolve_config_with_env(&config, no_env).unwrap_err();
        assert!(err.to_string().contains("needs a 'kind'"));
    }

    #[test]
    fn test_non_http_endpoint_is_invalid() {
        let mut config = create_test_config();
        config.providers[1].endpoint = Some("ftp://example.com".to_string());

        let err = resolve_config_with_env(&config, no_env).unwrap_err();
        assert!(err.to_string().contains("invalid endpoint"));
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = create_test_config();
        config.default_target = Some("klingon".to_string());
        config.detection_threshold = Some(1.5);
        config.concurrency = Some(0);
        config.history_limit = Some(0);

        let message = resolve_config_with_env(&config, no_env)
            .unwrap_err()
            .to_string();
        assert!(message.contains("defaultTarget"));
        assert!(message.contains("detectionThreshold"));
        assert!(message.contains("concurrency"));
        assert!(message.contains("historyLimit"));
    }

    #[test]
    fn test_default_languages_are_normalized() {
        let mut config = create_test_config();
        config.default_source = Some("AUTO".to_string());
        config.default_target = Some("ZH-cn".to_string());

        let resolved = resolve_config_with_env(&config, no_env).unwrap();
        assert_eq!(resolved.default_source, None);
        assert_eq!(resolved.default_target, "zh");

        config.default_source = Some("FR".to_string());
        let resolved = resolve_config_with_env(&config, no_env).unwrap();
        assert_eq!(resolved.default_source.as_deref(), Some("fr"));
    }
}
