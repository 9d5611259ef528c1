//! Command handlers.

/// Configuration wizard.
pub mod configure;

/// History listing and clearing.
pub mod history;

/// Interactive session launcher.
pub mod interactive;

/// Single-text and file translation.
pub mod translate;
