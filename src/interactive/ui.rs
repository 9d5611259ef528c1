//! Interactive mode UI components.

use super::session::SessionState;
use crate::error::TranslationError;
use crate::translation::{TranslatedText, language_name};
use crate::ui::Style;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header() {
    println!(
        "{} {} - Interactive Translation Mode",
        Style::header("lingo"),
        Style::version(format!("v{VERSION}"))
    );
    println!();
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}

/// Prompt text such as `auto→es` or `en→ja@deepl`.
pub fn prompt_label(state: &SessionState) -> String {
    let source = state.source.as_deref().unwrap_or("auto");
    state.provider.as_ref().map_or_else(
        || format!("{source}→{}", state.target),
        |provider| format!("{source}→{}@{provider}", state.target),
    )
}

pub fn language_pair(source: Option<&str>, target: &str) -> String {
    format!(
        "{} → {}",
        Style::code(source.unwrap_or("auto")),
        Style::code(target)
    )
}

pub fn print_translation(translated: &TranslatedText) {
    println!("{}", Style::translation(&translated.translated_text));

    let mut details = format!(
        "{} → {} · {}",
        translated.source_lang_resolved,
        translated.target_lang,
        translated.provider_used
    );
    if let Some(confidence) = translated.detected_confidence {
        details.push_str(&format!(" · detected {:.0}%", confidence * 100.0));
    }
    println!("{}", Style::secondary(details));
    println!();
}

pub fn print_translation_error(err: &TranslationError) {
    print_error(&err.to_string());
    if let Some(hint) = err.hint() {
        eprintln!("{}", Style::hint(hint));
        eprintln!();
    }
}

pub fn print_config(state: &SessionState, providers: &[&str]) {
    let source = state
        .source
        .as_deref()
        .map_or_else(|| "auto (detect)".to_string(), describe);

    println!("{}", Style::header("Configuration"));
    println!("  {}       {}", Style::label("from"), Style::value(source));
    println!(
        "  {}         {}",
        Style::label("to"),
        Style::value(describe(&state.target))
    );
    println!(
        "  {}   {}",
        Style::label("provider"),
        Style::value(state.provider.as_deref().unwrap_or("any"))
    );
    println!(
        "  {}  {}",
        Style::label("providers"),
        Style::secondary(providers.join(", "))
    );
    println!();
}

fn describe(code: &str) -> String {
    format!("{code} ({})", language_name(code))
}

pub fn print_help() {
    println!("{}", Style::header("Available commands"));
    let commands = [
        ("/swap", "Swap source and target languages"),
        ("/from <code|auto>", "Set the source language"),
        ("/to <code>", "Set the target language"),
        ("/provider [name|any]", "Pin a provider or use all"),
        ("/history [n]", "Show the last n translations"),
        ("/config", "Show current settings"),
        ("/help", "Show this help"),
        ("/quit", "Exit interactive mode"),
    ];
    for (command, description) in commands {
        println!(
            "  {:<22} {}",
            Style::command(command),
            Style::secondary(description)
        );
    }
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
    eprintln!();
}
