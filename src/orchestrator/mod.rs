//! Request routing across providers with caching, retry and failover.

mod document;
mod retry;

use futures_util::stream::{self, StreamExt};
use indicatif::ProgressBar;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use document::{DocumentOptions, DocumentSummary, TranslatedDocument};
pub use retry::{INITIAL_BACKOFF, MAX_ATTEMPTS, MAX_BACKOFF, RetryPolicy};

use crate::cache::{DEFAULT_CAPACITY, TranslationCache};
use crate::clock::{Clock, SystemClock};
use crate::config::{
    DEFAULT_CACHE_TTL_SECONDS, DEFAULT_CONCURRENCY, DEFAULT_DETECTION_THRESHOLD,
    DEFAULT_HISTORY_LIMIT, DEFAULT_REQUEST_TIMEOUT_SECONDS, ResolvedConfig,
};
use crate::error::{AttemptFailure, ProviderError, TranslationError};
use crate::history::{HistoryEntry, HistoryStore};
use crate::provider::{ProviderClient, ProviderKind, build_providers};
use crate::translation::{
    AUTO, Detection, DetectorChain, HeuristicDetector, LanguageDetector, ProviderDetector,
    TranslatedText, TranslationRequest, normalize_language,
};

/// Tunables that shape how a request is served.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    pub cache_ttl: Duration,
    pub history_limit: usize,
    pub request_timeout: Duration,
    pub detection_threshold: f32,
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&ResolvedConfig> for OrchestratorSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            cache_ttl: config.cache_ttl,
            history_limit: config.history_limit,
            request_timeout: config.request_timeout,
            detection_threshold: config.detection_threshold,
            concurrency: config.concurrency,
            retry: RetryPolicy::default(),
        }
    }
}

/// A successful translation plus how it was obtained.
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub result: TranslatedText,
    /// Failed attempts that preceded the answer, in order.
    pub attempts: Vec<AttemptFailure>,
    pub from_cache: bool,
}

/// Why a single provider gave up.
enum ProviderFailure {
    /// Retries ran out on retryable errors; the next provider may help.
    Exhausted,
    /// Retrying or failing over cannot help.
    Fatal(ProviderError),
    Cancelled,
}

/// Where the source language comes from for one request.
struct SourcePlan {
    /// Code sent to the provider, possibly `"auto"`.
    send: String,
    detection: Option<Detection>,
}

pub struct Orchestrator {
    providers: Vec<Arc<dyn ProviderClient>>,
    detector: Arc<dyn LanguageDetector>,
    cache: Option<Arc<TranslationCache>>,
    history: Option<Arc<HistoryStore>>,
    clock: Arc<dyn Clock>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// Creates an orchestrator over `providers`, tried in the given order.
    ///
    /// Starts with the heuristic detector, an in-memory cache and no history.
    pub fn new(providers: Vec<Arc<dyn ProviderClient>>, settings: OrchestratorSettings) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            providers,
            detector: Arc::new(HeuristicDetector),
            cache: Some(Arc::new(TranslationCache::with_clock(
                DEFAULT_CAPACITY,
                clock.clone(),
            ))),
            history: None,
            clock,
            settings,
        }
    }

    /// Builds providers from `config`. Local detection falls back to the
    /// first provider with a detection endpoint.
    pub fn from_config(config: &ResolvedConfig, client: &Client) -> Self {
        let providers = build_providers(&config.providers, client);

        let mut detectors: Vec<Arc<dyn LanguageDetector>> = vec![Arc::new(HeuristicDetector)];
        if let Some(remote) = providers.iter().find(|p| p.kind() != ProviderKind::DeepL) {
            detectors.push(Arc::new(ProviderDetector::new(remote.clone())));
        }

        Self::new(providers, OrchestratorSettings::from(config))
            .with_detector(Arc::new(DetectorChain::new(detectors)))
    }

    #[must_use]
    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<TranslationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: Arc<HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// Clock used for history timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub const fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.iter().any(|p| p.name() == name)
    }

    pub fn history(&self) -> Option<&Arc<HistoryStore>> {
        self.history.as_ref()
    }

    pub async fn translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslatedText, TranslationError> {
        self.translate_with_cancel(request, &CancellationToken::new())
            .await
    }

    pub async fn translate_with_cancel(
        &self,
        request: TranslationRequest,
        cancel: &CancellationToken,
    ) -> Result<TranslatedText, TranslationError> {
        self.translate_detailed(request, cancel)
            .await
            .map(|outcome| outcome.result)
    }

    /// Translates one request and reports every failed attempt on the way.
    pub async fn translate_detailed(
        &self,
        request: TranslationRequest,
        cancel: &CancellationToken,
    ) -> Result<TranslationOutcome, TranslationError> {
        self.serve(request, cancel, true).await
    }

    /// Serves one request. Document chunks pass `record_history: false`
    /// so that only whole documents reach the history.
    async fn serve(
        &self,
        request: TranslationRequest,
        cancel: &CancellationToken,
        record_history: bool,
    ) -> Result<TranslationOutcome, TranslationError> {
        if cancel.is_cancelled() {
            return Err(TranslationError::Cancelled);
        }

        let request = request.validated()?;
        let candidates = self.candidates(request.provider.as_deref())?;

        let cache_key = request.cache_key();
        if let Some(cache) = &self.cache
            && let Some(entry) = cache.get(&cache_key)
        {
            debug!(key = %cache_key, "Cache hit");
            return Ok(TranslationOutcome {
                result: entry.value,
                attempts: Vec::new(),
                from_cache: true,
            });
        }

        let plan = self.plan_source(&request, cancel).await?;
        let mut attempts = Vec::new();

        for provider in candidates {
            let outcome = self
                .call_with_retry(provider, &request, &plan.send, cancel, &mut attempts)
                .await;

            match outcome {
                Ok(result) => {
                    let result = finish_result(result, &request, provider.name(), &plan);
                    self.cache_result(&cache_key, &result);
                    if record_history {
                        self.record_history(&HistoryEntry::from_translation(
                            &request,
                            &result,
                            self.clock.now(),
                        ));
                    }
                    return Ok(TranslationOutcome {
                        result,
                        attempts,
                        from_cache: false,
                    });
                }
                Err(ProviderFailure::Fatal(source)) => {
                    return Err(TranslationError::Provider {
                        provider: provider.name().to_string(),
                        source,
                    });
                }
                Err(ProviderFailure::Cancelled) => return Err(TranslationError::Cancelled),
                Err(ProviderFailure::Exhausted) => {
                    warn!(provider = provider.name(), "Provider exhausted, failing over");
                }
            }
        }

        Err(TranslationError::AllProvidersFailed { attempts })
    }

    /// Translates `requests` with bounded concurrency. Results keep the
    /// input order.
    pub async fn translate_batch(
        &self,
        requests: Vec<TranslationRequest>,
        cancel: &CancellationToken,
    ) -> Vec<Result<TranslatedText, TranslationError>> {
        self.dispatch(requests, cancel, None, true).await
    }

    async fn dispatch(
        &self,
        requests: Vec<TranslationRequest>,
        cancel: &CancellationToken,
        progress: Option<&ProgressBar>,
        record_history: bool,
    ) -> Vec<Result<TranslatedText, TranslationError>> {
        stream::iter(requests)
            .map(|request| async move {
                let result = self
                    .serve(request, cancel, record_history)
                    .await
                    .map(|outcome| outcome.result);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                result
            })
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await
    }

    fn candidates(
        &self,
        pinned: Option<&str>,
    ) -> Result<Vec<&Arc<dyn ProviderClient>>, TranslationError> {
        if self.providers.is_empty() {
            return Err(TranslationError::invalid_with_hint(
                "No translation providers are configured",
                "Run 'lingo --config' to add one.",
            ));
        }

        let Some(name) = pinned else {
            return Ok(self.providers.iter().collect());
        };

        self.providers
            .iter()
            .find(|p| p.name() == name)
            .map(|p| vec![p])
            .ok_or_else(|| {
                TranslationError::invalid_with_hint(
                    format!("Provider '{name}' is not configured"),
                    format!("Configured providers: {}", self.provider_names().join(", ")),
                )
            })
    }

    async fn plan_source(
        &self,
        request: &TranslationRequest,
        cancel: &CancellationToken,
    ) -> Result<SourcePlan, TranslationError> {
        if !request.needs_detection() {
            return Ok(SourcePlan {
                send: request.source_lang.clone().unwrap_or_else(|| AUTO.to_string()),
                detection: None,
            });
        }

        let detected = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TranslationError::Cancelled),
            detected = self.detector.detect(&request.text) => detected,
        };

        let detection = detected.and_then(|d| {
            let Some(code) = normalize_language(&d.language) else {
                debug!(language = %d.language, "Ignoring detection of unsupported language");
                return None;
            };
            Some(Detection {
                language: code.to_string(),
                confidence: d.confidence.clamp(0.0, 1.0),
            })
        });

        let send = match &detection {
            Some(d) if d.confidence >= self.settings.detection_threshold => {
                debug!(language = %d.language, confidence = d.confidence, "Detected source language");
                d.language.clone()
            }
            Some(d) => {
                debug!(
                    language = %d.language,
                    confidence = d.confidence,
                    "Low detection confidence, letting the provider decide"
                );
                AUTO.to_string()
            }
            None => {
                debug!("Detection gave no answer, letting the provider decide");
                AUTO.to_string()
            }
        };

        Ok(SourcePlan { send, detection })
    }

    async fn call_with_retry(
        &self,
        provider: &Arc<dyn ProviderClient>,
        request: &TranslationRequest,
        source: &str,
        cancel: &CancellationToken,
        attempts: &mut Vec<AttemptFailure>,
    ) -> Result<TranslatedText, ProviderFailure> {
        let policy = self.settings.retry;
        let timeout = self.settings.request_timeout;
        let name = provider.name();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let call = tokio::time::timeout(
                timeout,
                provider.translate(&request.text, source, &request.target_lang),
            );

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ProviderFailure::Cancelled),
                outcome = call => outcome,
            };

            let error = match outcome {
                Ok(Ok(result)) => {
                    info!(provider = name, attempt, "Translation succeeded");
                    return Ok(result);
                }
                Ok(Err(error)) => error,
                Err(_) => ProviderError::Transient(format!(
                    "no response within {}s",
                    timeout.as_secs_f32()
                )),
            };

            attempts.push(AttemptFailure {
                provider: name.to_string(),
                attempt,
                error: error.clone(),
            });

            if !error.is_retryable() {
                warn!(provider = name, attempt, error = %error, "Provider failed");
                return Err(ProviderFailure::Fatal(error));
            }
            if !policy.should_retry(attempt, &error) {
                warn!(provider = name, attempt, error = %error, "Giving up on provider");
                return Err(ProviderFailure::Exhausted);
            }

            let delay = policy.delay_for(attempt, &error);
            warn!(
                provider = name,
                attempt,
                error = %error,
                delay_ms = delay.as_millis() as u64,
                "Retrying after failure"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ProviderFailure::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn cache_result(&self, cache_key: &str, result: &TranslatedText) {
        if let Some(cache) = &self.cache {
            cache.put(cache_key.to_string(), result.clone(), self.settings.cache_ttl);
        }
    }

    /// Appends `entry` and prunes to the history limit. Failures are logged.
    fn record_history(&self, entry: &HistoryEntry) {
        let Some(history) = &self.history else {
            return;
        };
        let recorded = history
            .append(entry)
            .and_then(|_| history.prune(self.settings.history_limit));
        if let Err(e) = recorded {
            warn!(error = %e, "Failed to record translation history");
        }
    }
}

/// Fills in the fields the orchestrator owns regardless of what the
/// provider reported.
fn finish_result(
    mut result: TranslatedText,
    request: &TranslationRequest,
    provider_name: &str,
    plan: &SourcePlan,
) -> TranslatedText {
    result.original_text.clone_from(&request.text);
    result.target_lang.clone_from(&request.target_lang);
    result.provider_used = provider_name.to_string();

    if let Some(code) = normalize_language(&result.source_lang_resolved) {
        result.source_lang_resolved = code.to_string();
    }

    if let Some(detection) = &plan.detection {
        result.detected_confidence = Some(detection.confidence);
        if result.source_lang_resolved == AUTO || result.source_lang_resolved.is_empty() {
            result.source_lang_resolved.clone_from(&detection.language);
        }
    }
    result
}
