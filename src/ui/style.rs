//! Consistent styling utilities for CLI output.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Styles for different semantic elements.
pub struct Style;

impl Style {
    /// Section headers (e.g., "Configuration", "History")
    pub fn header<T: Display>(text: T) -> String {
        format!("{}", text.bold())
    }

    /// Labels and keys (e.g., "from", "provider")
    pub fn label<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }

    /// Primary values such as provider names
    pub fn value<T: Display>(text: T) -> String {
        format!("{}", text.cyan())
    }

    /// Supplementary info such as endpoints and timestamps
    pub fn secondary<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }

    pub fn success<T: Display>(text: T) -> String {
        format!("{}", text.green())
    }

    pub fn error<T: Display>(text: T) -> String {
        format!("{}", text.red().bold())
    }

    pub fn warning<T: Display>(text: T) -> String {
        format!("{}", text.yellow())
    }

    /// Slash commands (e.g., "/swap", "/help")
    pub fn command<T: Display>(text: T) -> String {
        format!("{}", text.green())
    }

    pub fn code<T: Display>(text: T) -> String {
        format!("{}", text.yellow())
    }

    pub fn hint<T: Display>(text: T) -> String {
        format!("{}", text.dimmed().italic())
    }

    /// The translated text itself
    pub fn translation<T: Display>(text: T) -> String {
        format!("{}", text.bold())
    }

    pub fn version<T: Display>(text: T) -> String {
        format!("{}", text.dimmed())
    }
}
