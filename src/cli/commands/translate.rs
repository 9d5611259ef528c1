use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::LanguageSelection;
use crate::fs::atomic_write;
use crate::input::InputReader;
use crate::orchestrator::{DocumentOptions, Orchestrator, TranslatedDocument, TranslationOutcome};
use crate::translation::TranslationRequest;
use crate::ui::{Spinner, Style, chunk_progress};

pub struct TranslateOptions {
    pub text: Option<String>,
    pub file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub selection: LanguageSelection,
    pub details: bool,
}

pub async fn run_translate(orchestrator: &Orchestrator, options: TranslateOptions) -> Result<()> {
    if let Some(path) = options.file.as_deref() {
        return translate_file(orchestrator, path, &options).await;
    }

    let text = match options.text {
        Some(text) => text,
        None => InputReader::read(None)?,
    };

    let request = TranslationRequest {
        text,
        source_lang: options.selection.source.clone(),
        target_lang: options.selection.target.clone(),
        provider: options.selection.provider.clone(),
    };

    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(&cancel);
    let spinner = Spinner::new("Translating...");
    let outcome = orchestrator.translate_detailed(request, &cancel).await;
    spinner.stop();
    watcher.abort();

    let outcome = outcome?;
    println!("{}", outcome.result.translated_text);
    io::stdout().flush()?;

    if options.details {
        print_details(&outcome);
    }

    Ok(())
}

async fn translate_file(
    orchestrator: &Orchestrator,
    path: &Path,
    options: &TranslateOptions,
) -> Result<()> {
    let text = InputReader::read(Some(path))?;
    let progress = chunk_progress();

    let mut document_options = DocumentOptions::new(options.selection.target.clone());
    document_options.source_lang.clone_from(&options.selection.source);
    document_options.provider.clone_from(&options.selection.provider);
    document_options.progress = Some(progress.clone());

    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(&cancel);
    let document = orchestrator
        .translate_document(&text, &document_options, &cancel)
        .await;
    progress.finish_and_clear();
    watcher.abort();

    let document = document?;

    match options.output.as_deref() {
        Some(output) => {
            atomic_write(output, &document.text)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            eprintln!(
                "{} Translation written to {}",
                Style::success("✓"),
                Style::secondary(output.display().to_string())
            );
        }
        None => {
            print!("{}", document.text);
            if !document.text.ends_with('\n') {
                println!();
            }
            io::stdout().flush()?;
        }
    }

    if options.details {
        print_document_details(&document);
    }

    Ok(())
}

/// Cancels `cancel` on the first Ctrl+C.
fn cancel_on_ctrl_c(cancel: &CancellationToken) -> JoinHandle<()> {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, cancelling");
            cancel.cancel();
        }
    })
}

fn print_details(outcome: &TranslationOutcome) {
    let result = &outcome.result;
    let mut source = result.source_lang_resolved.clone();
    if let Some(confidence) = result.detected_confidence {
        source.push_str(&format!(" (detected, {:.0}%)", confidence * 100.0));
    }

    eprintln!();
    eprintln!("  {}      {}", Style::label("source"), Style::value(source));
    eprintln!(
        "  {}      {}",
        Style::label("target"),
        Style::value(&result.target_lang)
    );
    eprintln!(
        "  {}    {}{}",
        Style::label("provider"),
        Style::value(&result.provider_used),
        if outcome.from_cache {
            Style::secondary(" (cached)")
        } else {
            String::new()
        }
    );
    for failure in &outcome.attempts {
        eprintln!(
            "  {}      {}",
            Style::label("failed"),
            Style::warning(failure.to_string())
        );
    }
}

fn print_document_details(document: &TranslatedDocument) {
    let summary = &document.summary;
    eprintln!();
    eprintln!(
        "  {}  {}",
        Style::label("characters"),
        Style::value(summary.total_chars)
    );
    eprintln!(
        "  {}       {}",
        Style::label("lines"),
        Style::value(summary.total_lines)
    );
    eprintln!(
        "  {}      {}",
        Style::label("chunks"),
        Style::value(summary.chunks)
    );
    eprintln!(
        "  {}     {}",
        Style::label("sources"),
        Style::value(document.source_langs.join(", "))
    );
    eprintln!(
        "  {}   {}",
        Style::label("providers"),
        Style::value(document.providers_used.join(", "))
    );
    eprintln!(
        "  {}     {}",
        Style::label("elapsed"),
        Style::secondary(format!("{:.1}s", summary.elapsed.as_secs_f64()))
    );
}
