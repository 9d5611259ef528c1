//! Interactive translation mode.

mod command;
mod session;
mod ui;

pub use command::{Input, SlashCommand, SlashCommandCompleter, parse_input};
pub use session::{InteractiveSession, SessionState};
