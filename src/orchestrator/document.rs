use indicatif::ProgressBar;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::Orchestrator;
use crate::error::TranslationError;
use crate::history::HistoryEntry;
use crate::translation::{MAX_TEXT_CHARS, TranslationRequest, chunk_text};

/// How to translate a whole document.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub provider: Option<String>,
    /// Largest chunk sent in one request, capped at [`MAX_TEXT_CHARS`].
    pub max_chunk_chars: usize,
    /// Advanced once per translated chunk.
    pub progress: Option<ProgressBar>,
}

impl DocumentOptions {
    pub fn new(target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: None,
            target_lang: target_lang.into(),
            provider: None,
            max_chunk_chars: MAX_TEXT_CHARS,
            progress: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub total_chars: usize,
    pub total_lines: usize,
    pub chunks: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct TranslatedDocument {
    pub text: String,
    /// Distinct source languages reported across chunks.
    pub source_langs: Vec<String>,
    /// Distinct providers that answered, in first-use order.
    pub providers_used: Vec<String>,
    pub summary: DocumentSummary,
}

impl Orchestrator {
    /// Translates text of any length by splitting it into chunks.
    ///
    /// Whitespace between chunks, including blank lines, is copied through
    /// unchanged. The document fails as a whole if any chunk fails, and only
    /// a finished document is recorded in history, as a single entry.
    pub async fn translate_document(
        &self,
        text: &str,
        options: &DocumentOptions,
        cancel: &CancellationToken,
    ) -> Result<TranslatedDocument, TranslationError> {
        let started = Instant::now();

        if text.trim().is_empty() {
            return Err(TranslationError::invalid_with_hint(
                "Document is empty",
                "Check the input file.",
            ));
        }

        let chunks = chunk_text(text, options.max_chunk_chars.clamp(1, MAX_TEXT_CHARS));
        let requests: Vec<TranslationRequest> = chunks
            .iter()
            .filter(|chunk| !chunk.is_blank())
            .map(|chunk| TranslationRequest {
                text: chunk.body.clone(),
                source_lang: options.source_lang.clone(),
                target_lang: options.target_lang.clone(),
                provider: options.provider.clone(),
            })
            .collect();
        let chunk_count = requests.len();

        info!(
            chunks = chunk_count,
            concurrency = self.settings.concurrency,
            "Translating document"
        );
        if let Some(pb) = &options.progress {
            pb.set_length(chunk_count as u64);
        }

        let translated = self
            .dispatch(requests, cancel, options.progress.as_ref(), false)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let target_lang = translated
            .first()
            .map_or_else(|| options.target_lang.clone(), |r| r.target_lang.clone());
        let mut output = String::with_capacity(text.len());
        let mut source_langs = BTreeSet::new();
        let mut providers_used: Vec<String> = Vec::new();
        let mut results = translated.into_iter();

        for chunk in &chunks {
            output.push_str(&chunk.leading);
            if !chunk.is_blank()
                && let Some(result) = results.next()
            {
                output.push_str(&result.translated_text);
                source_langs.insert(result.source_lang_resolved);
                if !providers_used.contains(&result.provider_used) {
                    providers_used.push(result.provider_used);
                }
            }
            output.push_str(&chunk.trailing);
        }

        let source_langs: Vec<String> = source_langs.into_iter().collect();
        self.record_history(&HistoryEntry {
            timestamp: self.clock.now(),
            text: text.trim().to_string(),
            source_lang: options.source_lang.clone(),
            source_lang_resolved: source_langs.join(","),
            target_lang,
            provider: options.provider.clone(),
            translated_text: output.trim().to_string(),
            provider_used: providers_used.join(","),
        });

        Ok(TranslatedDocument {
            text: output,
            source_langs,
            providers_used,
            summary: DocumentSummary {
                total_chars: text.chars().count(),
                total_lines: text.lines().count(),
                chunks: chunk_count,
                elapsed: started.elapsed(),
            },
        })
    }
}
