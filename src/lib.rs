//! # lingo - Multi-Provider Translation CLI
//!
//! `lingo` translates text through Google, Azure, DeepL and LibreTranslate
//! behind one interface. Requests are served from a TTL cache when possible,
//! retried with exponential backoff, and failed over to the next configured
//! provider. Successful translations are recorded in a local history.
//!
//! ## Quick Start
//!
//! ```bash
//! # Translate a phrase, detecting the source language
//! lingo "Bonjour tout le monde" -t en
//!
//! # Translate stdin with a specific provider
//! cat notes.txt | lingo -t ja -p deepl
//!
//! # Translate a long document in chunks
//! lingo -f report.md -t de -o report.de.md
//!
//! # Interactive session
//! lingo -i
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/lingo/config.json`:
//!
//! ```json
//! {
//!   "defaultTarget": "en",
//!   "providers": [
//!     { "name": "deepl", "apiKeyEnv": "DEEPL_KEY", "priority": 1 },
//!     { "name": "libre", "kind": "libretranslate", "endpoint": "http://localhost:5000" }
//!   ]
//! }
//! ```

/// In-memory translation cache with TTL and LRU eviction.
pub mod cache;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Time source abstraction.
pub mod clock;

/// Configuration file management and validation.
pub mod config;

/// Error types and exit codes.
pub mod error;

/// File system utilities.
pub mod fs;

/// Translation history backed by `SQLite`.
pub mod history;

/// Input reading from files and stdin.
pub mod input;

/// Interactive translation session.
pub mod interactive;

/// Provider selection, retry, failover and document translation.
pub mod orchestrator;

/// XDG-style path utilities for configuration and data.
pub mod paths;

/// Translation backends.
pub mod provider;

/// Requests, languages, detection and chunking.
pub mod translation;

/// Terminal UI components (spinner, progress, colors).
pub mod ui;
