//! Command-line interface definitions and handlers.

/// CLI argument parsing with clap.
pub mod args;

/// Command implementations.
pub mod commands;

mod context;

pub use args::Args;
pub use context::{LanguageSelection, build_orchestrator, load_config};
