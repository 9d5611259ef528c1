//! Startup wiring: configuration, HTTP client and orchestrator.

use anyhow::Result;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use tracing::{debug, warn};

use super::args::Args;
use super::commands::configure;
use crate::config::{ConfigManager, ResolvedConfig};
use crate::error::{ConfigError, TranslationError};
use crate::history::HistoryStore;
use crate::orchestrator::Orchestrator;
use crate::paths;
use crate::provider::http_client;
use crate::translation::{is_auto, validate_language};

/// Loads and validates the configuration.
///
/// A missing file starts the setup wizard when someone is at the terminal.
pub fn load_config(manager: &ConfigManager) -> Result<ResolvedConfig> {
    match manager.load_resolved() {
        Err(ConfigError::Missing { path }) if io::stdin().is_terminal() => {
            debug!(path = %path.display(), "No configuration found, starting setup");
            if configure::run_setup(manager)? {
                Ok(manager.load_resolved().map_err(TranslationError::from)?)
            } else {
                Err(TranslationError::from(ConfigError::Missing { path }).into())
            }
        }
        result => Ok(result.map_err(TranslationError::from)?),
    }
}

/// Builds the orchestrator for `config`. History that cannot be opened is
/// skipped with a warning.
pub fn build_orchestrator(config: &ResolvedConfig, no_cache: bool) -> Result<Orchestrator> {
    let client = http_client(config.request_timeout).map_err(TranslationError::from)?;
    let mut orchestrator = Orchestrator::from_config(config, &client);

    if no_cache {
        orchestrator = orchestrator.without_cache();
    }

    if config.history_enabled {
        match paths::history_db().and_then(|path| HistoryStore::open(&path)) {
            Ok(store) => orchestrator = orchestrator.with_history(Arc::new(store)),
            Err(e) => warn!(error = %format!("{e:#}"), "History unavailable"),
        }
    }

    Ok(orchestrator)
}

/// Source language, target language and provider pin for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSelection {
    /// `None` means detect the source language.
    pub source: Option<String>,
    pub target: String,
    pub provider: Option<String>,
}

impl LanguageSelection {
    /// Command-line flags win over the configured defaults.
    pub fn resolve(args: &Args, config: &ResolvedConfig) -> Result<Self, TranslationError> {
        let source = match args.source.as_deref() {
            Some(code) if is_auto(code) => None,
            Some(code) => Some(validate_language(code, false)?.to_string()),
            None => config.default_source.clone(),
        };
        let target = match args.target.as_deref() {
            Some(code) => validate_language(code, false)?.to_string(),
            None => config.default_target.clone(),
        };

        Ok(Self {
            source,
            target,
            provider: args.provider.clone(),
        })
    }
}
