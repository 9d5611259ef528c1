use anyhow::Result;
use inquire::Text;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
use super::ui;
use crate::error::TranslationError;
use crate::orchestrator::Orchestrator;
use crate::translation::{TranslatedText, TranslationRequest, is_auto, normalize_language};
use crate::ui::{Spinner, Style, is_prompt_cancelled, print_history};

const DEFAULT_HISTORY_ROWS: usize = 10;

/// Language pair and provider pin for an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// `None` means detect the source language.
    pub source: Option<String>,
    pub target: String,
    pub provider: Option<String>,
    /// Source language of the last translation, used by `/swap` when the
    /// source is detected.
    pub last_detected: Option<String>,
}

impl SessionState {
    pub const fn new(source: Option<String>, target: String, provider: Option<String>) -> Self {
        Self {
            source,
            target,
            provider,
            last_detected: None,
        }
    }

    pub fn set_source(&mut self, code: &str) -> Result<(), String> {
        if is_auto(code) {
            self.source = None;
            return Ok(());
        }
        let canonical =
            normalize_language(code).ok_or_else(|| format!("Unknown language code: '{code}'"))?;
        self.source = Some(canonical.to_string());
        Ok(())
    }

    pub fn set_target(&mut self, code: &str) -> Result<(), String> {
        if is_auto(code) {
            return Err("The target language cannot be 'auto'".to_string());
        }
        let canonical =
            normalize_language(code).ok_or_else(|| format!("Unknown language code: '{code}'"))?;
        self.target = canonical.to_string();
        Ok(())
    }

    /// Swaps source and target. A detected source is swapped using the
    /// language found by the last translation.
    pub fn swap(&mut self) -> Result<(), String> {
        let source = self
            .source
            .clone()
            .or_else(|| self.last_detected.clone())
            .ok_or_else(|| {
                "Cannot swap before the source language is known; use /from first".to_string()
            })?;
        self.source = Some(std::mem::replace(&mut self.target, source));
        Ok(())
    }

    pub fn request(&self, text: &str) -> TranslationRequest {
        TranslationRequest {
            text: text.to_string(),
            source_lang: self.source.clone(),
            target_lang: self.target.clone(),
            provider: self.provider.clone(),
        }
    }
}

/// A REPL-style translation session.
pub struct InteractiveSession {
    orchestrator: Arc<Orchestrator>,
    state: SessionState,
}

impl InteractiveSession {
    pub const fn new(orchestrator: Arc<Orchestrator>, state: SessionState) -> Self {
        Self {
            orchestrator,
            state,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        ui::print_header();

        let prompt_style = Styled::new("❯")
            .with_fg(Color::LightBlue)
            .with_attr(Attributes::BOLD);
        let mut render_config = RenderConfig::default()
            .with_prompt_prefix(prompt_style)
            .with_answered_prompt_prefix(prompt_style);

        // Non-highlighted suggestions: gray
        render_config.option = StyleSheet::new().with_fg(Color::Grey);
        // Highlighted suggestion: purple
        render_config.selected_option = Some(StyleSheet::new().with_fg(Color::DarkMagenta));

        let completer = SlashCommandCompleter::new(
            self.orchestrator
                .provider_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        );

        loop {
            let input = Text::new(&ui::prompt_label(&self.state))
                .with_render_config(render_config)
                .with_autocomplete(completer.clone())
                .with_help_message("Type text to translate, /help for commands, Ctrl+C to quit")
                .prompt();

            match input {
                Ok(line) => match parse_input(&line) {
                    Input::Empty => {}
                    Input::Command(cmd) => {
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    Input::Text(text) => self.translate_and_print(&text).await,
                },
                Err(e) if is_prompt_cancelled(&e) => {
                    println!(); // Clear line before goodbye message
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        ui::print_goodbye();
        Ok(())
    }

    fn handle_command(&mut self, cmd: SlashCommand) -> bool {
        match cmd {
            SlashCommand::Swap => {
                report(self.state.swap(), || {
                    format!(
                        "Now translating {}",
                        ui::language_pair(self.state.source.as_deref(), &self.state.target)
                    )
                });
            }
            SlashCommand::From(None) => ui::print_error("Usage: /from <code|auto>"),
            SlashCommand::From(Some(code)) => {
                report(self.state.set_source(&code), || {
                    format!(
                        "Source language set to {}",
                        Style::code(self.state.source.as_deref().unwrap_or("auto"))
                    )
                });
            }
            SlashCommand::To(None) => ui::print_error("Usage: /to <code>"),
            SlashCommand::To(Some(code)) => {
                report(self.state.set_target(&code), || {
                    format!("Target language set to {}", Style::code(&self.state.target))
                });
            }
            SlashCommand::Provider(name) => self.set_provider(name.as_deref()),
            SlashCommand::History(rows) => self.show_history(rows.unwrap_or(DEFAULT_HISTORY_ROWS)),
            SlashCommand::Config => {
                ui::print_config(&self.state, &self.orchestrator.provider_names());
            }
            SlashCommand::Help => ui::print_help(),
            SlashCommand::Quit => return false,
            SlashCommand::Unknown(cmd) => ui::print_error(&format!("Unknown command: /{cmd}")),
        }
        true
    }

    fn set_provider(&mut self, name: Option<&str>) {
        match name {
            None | Some("any") => {
                self.state.provider = None;
                println!(
                    "{} Using all providers in priority order",
                    Style::success("✓")
                );
            }
            Some(name) if self.orchestrator.has_provider(name) => {
                self.state.provider = Some(name.to_string());
                println!(
                    "{} Provider pinned to {}",
                    Style::success("✓"),
                    Style::value(name)
                );
            }
            Some(name) => ui::print_error(&format!(
                "Provider '{name}' is not configured (available: {})",
                self.orchestrator.provider_names().join(", ")
            )),
        }
    }

    fn show_history(&self, rows: usize) {
        let Some(history) = self.orchestrator.history() else {
            ui::print_error("History is disabled in the configuration");
            return;
        };
        match history.list(rows, 0) {
            Ok(records) => print_history(&records, chrono::Utc::now()),
            Err(e) => ui::print_error(&format!("{e:#}")),
        }
        println!();
    }

    async fn translate_and_print(&mut self, text: &str) {
        let request = self.state.request(text);
        let cancel = CancellationToken::new();
        let spinner = Spinner::new("Translating...");

        let result = tokio::select! {
            result = self.orchestrator.translate_with_cancel(request, &cancel) => result,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                Err(TranslationError::Cancelled)
            }
        };
        spinner.stop();

        match result {
            Ok(translated) => {
                self.remember_source(&translated);
                ui::print_translation(&translated);
            }
            Err(e) => ui::print_translation_error(&e),
        }
    }

    fn remember_source(&mut self, translated: &TranslatedText) {
        if self.state.source.is_none()
            && let Some(code) = normalize_language(&translated.source_lang_resolved)
        {
            self.state.last_detected = Some(code.to_string());
        }
    }
}

fn report<F: FnOnce() -> String>(result: Result<(), String>, success: F) {
    match result {
        Ok(()) => println!("{} {}", Style::success("✓"), success()),
        Err(message) => ui::print_error(&message),
    }
}
