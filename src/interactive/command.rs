use inquire::autocompletion::{Autocomplete, Replacement};

use crate::translation::SUPPORTED_LANGUAGES;

// Available slash commands: (command, description)
const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/swap", "Swap source and target languages"),
    ("/from", "Set source language (code or auto)"),
    ("/to", "Set target language"),
    ("/provider", "Pin a provider (name or any)"),
    ("/history", "Show recent translations"),
    ("/config", "Show current settings"),
    ("/help", "Show available commands"),
    ("/quit", "Exit interactive mode"),
];

/// Completes slash commands, then language codes after `/from` and `/to`
/// and provider names after `/provider`.
#[derive(Clone, Default)]
pub struct SlashCommandCompleter {
    providers: Vec<String>,
}

impl SlashCommandCompleter {
    pub const fn new(providers: Vec<String>) -> Self {
        Self { providers }
    }

    fn argument_suggestions(&self, command: &str, partial: &str) -> Vec<String> {
        let partial = partial.to_ascii_lowercase();
        let candidates: Vec<String> = match command {
            "/from" => std::iter::once("auto".to_string())
                .chain(SUPPORTED_LANGUAGES.iter().map(|l| l.code.to_string()))
                .collect(),
            "/to" => SUPPORTED_LANGUAGES
                .iter()
                .map(|l| l.code.to_string())
                .collect(),
            "/provider" => std::iter::once("any".to_string())
                .chain(self.providers.iter().cloned())
                .collect(),
            _ => Vec::new(),
        };

        candidates
            .into_iter()
            .filter(|c| c.to_ascii_lowercase().starts_with(&partial))
            .map(|c| format!("{command} {c}"))
            .collect()
    }
}

impl Autocomplete for SlashCommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, inquire::CustomUserError> {
        if !input.starts_with('/') {
            return Ok(vec![]);
        }

        if let Some((command, partial)) = input.split_once(' ') {
            return Ok(self.argument_suggestions(command, partial.trim_start()));
        }

        let suggestions: Vec<String> = SLASH_COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd.starts_with(input))
            .map(|(cmd, desc)| format!("{cmd}  {desc}"))
            .collect();

        Ok(suggestions)
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, inquire::CustomUserError> {
        // Command suggestions carry a description after two spaces.
        let replacement = highlighted_suggestion
            .map(|s| s.split("  ").next().unwrap_or_default().to_string());
        Ok(replacement)
    }
}

/// Slash command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Swap,
    From(Option<String>),
    To(Option<String>),
    Provider(Option<String>),
    History(Option<usize>),
    Config,
    Help,
    Quit,
    Unknown(String),
}

/// Input types
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Command(SlashCommand),
    Empty,
}

pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        return Input::Empty;
    }

    input
        .strip_prefix('/')
        .map_or_else(|| Input::Text(input.to_string()), parse_slash_command)
}

fn parse_slash_command(cmd: &str) -> Input {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let argument = parts.get(1).map(|s| (*s).to_string());

    let command = match parts.first().copied() {
        Some("swap") => SlashCommand::Swap,
        Some("from") => SlashCommand::From(argument),
        Some("to") => SlashCommand::To(argument),
        Some("provider") => SlashCommand::Provider(argument),
        Some("history") => match argument {
            None => SlashCommand::History(None),
            Some(n) => match n.parse() {
                Ok(n) => SlashCommand::History(Some(n)),
                Err(_) => SlashCommand::Unknown(parts.join(" ")),
            },
        },
        Some("config") => SlashCommand::Config,
        Some("help") => SlashCommand::Help,
        Some("quit" | "exit" | "q") => SlashCommand::Quit,
        _ => SlashCommand::Unknown(parts.join(" ")),
    };
    Input::Command(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_input(""), Input::Empty);
        assert_eq!(parse_input("   "), Input::Empty);
    }

    #[test]
    fn test_parse_text_input() {
        assert_eq!(
            parse_input("  Hello, world!  "),
            Input::Text("Hello, world!".to_string())
        );
    }

    #[test]
    fn test_parse_language_commands() {
        assert_eq!(
            parse_input("/from fr"),
            Input::Command(SlashCommand::From(Some("fr".to_string())))
        );
        assert_eq!(
            parse_input("/to"),
            Input::Command(SlashCommand::To(None))
        );
        assert_eq!(parse_input("/swap"), Input::Command(SlashCommand::Swap));
    }

    #[test]
    fn test_parse_provider_command() {
        assert_eq!(
            parse_input("/provider deepl"),
            Input::Command(SlashCommand::Provider(Some("deepl".to_string())))
        );
        assert_eq!(
            parse_input("/provider"),
            Input::Command(SlashCommand::Provider(None))
        );
    }

    #[test]
    fn test_parse_history_command() {
        assert_eq!(
            parse_input("/history"),
            Input::Command(SlashCommand::History(None))
        );
        assert_eq!(
            parse_input("/history 5"),
            Input::Command(SlashCommand::History(Some(5)))
        );
        assert_eq!(
            parse_input("/history lots"),
            Input::Command(SlashCommand::Unknown("history lots".to_string()))
        );
    }

    #[test]
    fn test_parse_quit_commands() {
        for input in ["/quit", "/exit", "/q"] {
            assert_eq!(parse_input(input), Input::Command(SlashCommand::Quit));
        }
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_input("/unknown"),
            Input::Command(SlashCommand::Unknown("unknown".to_string()))
        );
    }

    // SlashCommandCompleter tests

    #[test]
    fn test_completer_no_suggestions_for_regular_text() {
        let mut completer = SlashCommandCompleter::default();
        assert!(completer.get_suggestions("hello").unwrap().is_empty());
    }

    #[test]
    fn test_completer_suggestions_for_slash() {
        let mut completer = SlashCommandCompleter::default();
        let suggestions = completer.get_suggestions("/").unwrap();
        assert_eq!(suggestions.len(), SLASH_COMMANDS.len());
    }

    #[test]
    fn test_completer_suggestions_filter_by_prefix() {
        let mut completer = SlashCommandCompleter::default();

        let suggestions = completer.get_suggestions("/h").unwrap();
        assert_eq!(suggestions.len(), 2); // /history, /help

        let suggestions = completer.get_suggestions("/q").unwrap();
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].starts_with("/quit"));
    }

    #[test]
    fn test_completer_language_arguments() {
        let mut completer = SlashCommandCompleter::default();
        let suggestions = completer.get_suggestions("/from au").unwrap();
        assert_eq!(suggestions, ["/from auto"]);

        let suggestions = completer.get_suggestions("/to zh").unwrap();
        assert!(suggestions.contains(&"/to zh-TW".to_string()));
    }

    #[test]
    fn test_completer_provider_arguments() {
        let mut completer = SlashCommandCompleter::new(vec!["deepl".into(), "google".into()]);
        let suggestions = completer.get_suggestions("/provider d").unwrap();
        assert_eq!(suggestions, ["/provider deepl"]);
    }

    #[test]
    fn test_completer_completion() {
        let mut completer = SlashCommandCompleter::default();
        let suggestion = "/config  Show current settings".to_string();
        let completion = completer.get_completion("/c", Some(suggestion)).unwrap();
        assert_eq!(completion, Some("/config".to_string()));

        let completion = completer
            .get_completion("/to e", Some("/to es".to_string()))
            .unwrap();
        assert_eq!(completion, Some("/to es".to_string()));
    }

    #[test]
    fn test_completer_completion_none() {
        let mut completer = SlashCommandCompleter::default();
        assert!(completer.get_completion("/x", None).unwrap().is_none());
    }
}
