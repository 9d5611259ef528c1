//! Configuration wizard.

use anyhow::{Result, bail};
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};

use crate::config::{ConfigFile, ConfigManager, DEFAULT_TARGET, ProviderConfig, resolve_config};
use crate::error::ConfigError;
use crate::provider::ProviderKind;
use crate::translation::sorted_languages;
use crate::ui::{Style, prompt_or_cancel};

/// Runs the configuration wizard for `lingo --config`.
///
/// Starts from the existing file when there is one, so providers can be
/// added or updated one at a time.
pub fn run_configure() -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = match manager.load() {
        Ok(config) => config,
        Err(ConfigError::Missing { .. }) => ConfigFile::default(),
        Err(e) => return Err(e.into()),
    };

    prompt_or_cancel(|| run_wizard(&manager, config)).map(drop)
}

/// First-run setup. Returns `false` when the user backs out.
pub fn run_setup(manager: &ConfigManager) -> Result<bool> {
    println!("{}", Style::header("Welcome to lingo!"));
    println!(
        "{}",
        Style::secondary("No configuration found. Let's set up a translation provider.")
    );
    println!();

    Ok(prompt_or_cancel(|| run_wizard(manager, ConfigFile::default()))?.is_some())
}

fn run_wizard(manager: &ConfigManager, mut config: ConfigFile) -> Result<()> {
    print_current_providers(&config);

    loop {
        let provider = prompt_provider(&config)?;
        config.upsert_provider(provider);

        if !Confirm::new("Add another provider?")
            .with_default(false)
            .prompt()?
        {
            break;
        }
    }

    let target = select_target_language(config.default_target.as_deref())?;
    config.default_target = Some(target);

    manager.save(&config)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display().to_string())
    );

    if let Err(e) = resolve_config(&config) {
        println!("{} {e}", Style::warning("Warning:"));
    }

    Ok(())
}

fn print_current_providers(config: &ConfigFile) {
    if config.providers.is_empty() {
        return;
    }
    println!("{}", Style::header("Configured providers"));
    for provider in &config.providers {
        println!(
            "  {}  {}",
            Style::value(&provider.name),
            Style::secondary(provider.endpoint.as_deref().unwrap_or("(default endpoint)"))
        );
    }
    println!();
}

fn prompt_provider(config: &ConfigFile) -> Result<ProviderConfig> {
    let kinds: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.as_str()).collect();
    let kind = Select::new("Provider type:", kinds).prompt()?;
    let kind: ProviderKind = kind.parse().map_err(anyhow::Error::msg)?;

    let name = Text::new("Provider name:")
        .with_default(kind.as_str())
        .with_help_message("Used with --provider and in history")
        .prompt()?;
    let name = name.trim().to_string();
    if name.is_empty() {
        bail!("Provider name cannot be empty");
    }

    let existing = config.provider(&name);
    let mut provider = existing.cloned().unwrap_or_else(|| ProviderConfig::new(&name));
    if name != kind.as_str() {
        provider.kind = Some(kind.as_str().to_string());
    }

    let endpoint = Text::new("Endpoint:")
        .with_default(
            existing
                .and_then(|p| p.endpoint.as_deref())
                .unwrap_or_else(|| kind.default_endpoint()),
        )
        .prompt()?;
    let endpoint = endpoint.trim();
    provider.endpoint =
        (!endpoint.is_empty() && endpoint != kind.default_endpoint()).then(|| endpoint.to_string());

    let env_name = provider.api_key_env_name();
    let help = if kind.requires_api_key() {
        format!("Leave empty to read it from ${env_name}")
    } else {
        "Optional for self-hosted instances".to_string()
    };
    let api_key = Password::new("API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(&help)
        .prompt()?;
    if !api_key.trim().is_empty() {
        provider.api_key = Some(api_key.trim().to_string());
    }

    if kind == ProviderKind::Azure {
        let mut prompt = Text::new("Region:").with_help_message("Leave empty for global resources");
        if let Some(region) = existing.and_then(|p| p.region.as_deref()) {
            prompt = prompt.with_default(region);
        }
        let region = prompt.prompt()?;
        provider.region = Some(region.trim().to_string()).filter(|r| !r.is_empty());
    }

    Ok(provider)
}

fn select_target_language(default: Option<&str>) -> Result<String> {
    let languages = sorted_languages();
    // Build options with format "code - Name"
    let options: Vec<String> = languages
        .iter()
        .map(|l| format!("{} - {}", l.code, l.name))
        .collect();

    let current = default.unwrap_or(DEFAULT_TARGET);
    let default_index = languages
        .iter()
        .position(|l| l.code == current)
        .unwrap_or(0);

    let selection = Select::new("Default target language:", options)
        .with_starting_cursor(default_index)
        .prompt()?;

    let code = selection.split(" - ").next().unwrap_or(&selection);

    Ok(code.to_string())
}
