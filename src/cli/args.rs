use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_HISTORY_ROWS: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "lingo")]
#[command(about = "Multi-provider translation CLI with failover, caching and history")]
#[command(version)]
pub struct Args {
    /// Text to translate (reads stdin when omitted and input is piped)
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Source language code, or "auto" to detect it
    #[arg(short = 's', long)]
    pub source: Option<String>,

    /// Target language code (e.g., es, ja, zh-TW)
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Use only this configured provider (no failover)
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Start an interactive translation session
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Translate a text file of any length
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Write the translation to this file instead of stdout
    #[arg(short = 'o', long, requires = "file")]
    pub output: Option<PathBuf>,

    /// List supported language codes
    #[arg(short = 'l', long)]
    pub list_languages: bool,

    /// Show recent translations
    #[arg(long)]
    pub history: bool,

    /// Number of history entries to show
    #[arg(long, value_name = "N", default_value_t = DEFAULT_HISTORY_ROWS, requires = "history")]
    pub limit: usize,

    /// Only show history entries involving this language
    #[arg(long, value_name = "CODE", requires = "history")]
    pub lang: Option<String>,

    /// Delete all translation history
    #[arg(long, conflicts_with = "history")]
    pub clear_history: bool,

    /// Run the configuration wizard
    #[arg(short = 'c', long)]
    pub config: bool,

    /// Show detected language, provider and timing details
    #[arg(long)]
    pub details: bool,

    /// Bypass the translation cache
    #[arg(long)]
    pub no_cache: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
