use anyhow::{Context, Result};
use clap::Parser;
use std::io;

use lingo_cli::cli::commands::{configure, history, interactive, translate};
use lingo_cli::cli::{Args, LanguageSelection, build_orchestrator, load_config};
use lingo_cli::config::ConfigManager;
use lingo_cli::error::{ConfigError, TranslationError};
use lingo_cli::input::InputReader;
use lingo_cli::translation::print_languages;
use lingo_cli::ui::Style;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("{} {e:#}", Style::warning("Warning:"));
    }

    if let Err(err) = run(args).await {
        report_error(&err);
        std::process::exit(exit_code(&err));
    }
}

async fn run(args: Args) -> Result<()> {
    if args.list_languages {
        print_languages();
        return Ok(());
    }
    if args.clear_history {
        return history::run_clear_history();
    }
    if args.history {
        return history::run_history(args.limit, args.lang.as_deref());
    }
    if args.config {
        return configure::run_configure();
    }

    let manager = ConfigManager::new()?;
    let config = load_config(&manager)?;
    let selection = LanguageSelection::resolve(&args, &config)?;
    let orchestrator = build_orchestrator(&config, args.no_cache)?;

    // Nothing to translate and nothing piped in: start a session instead of
    // waiting on the terminal.
    let nothing_given =
        args.text.is_none() && args.file.is_none() && !InputReader::stdin_is_piped();

    if args.interactive || nothing_given {
        return interactive::run_interactive(orchestrator, selection).await;
    }

    let options = translate::TranslateOptions {
        text: args.text,
        file: args.file,
        output: args.output,
        selection,
        details: args.details,
    };
    translate::run_translate(&orchestrator, options).await
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

fn report_error(err: &anyhow::Error) {
    if let Some(e) = err.downcast_ref::<TranslationError>() {
        eprintln!("{} {e}", Style::error("Error:"));
        if let Some(hint) = e.hint() {
            eprintln!();
            eprintln!("{}", Style::hint(hint));
        }
        return;
    }
    eprintln!("{} {err:#}", Style::error("Error:"));
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<TranslationError>() {
        return e.exit_code();
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return exitcode::CONFIG;
    }
    if err.chain().any(|cause| cause.is::<io::Error>()) {
        return exitcode::IOERR;
    }
    1
}
