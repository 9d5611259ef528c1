//! Error taxonomy shared by the orchestrator, providers and the CLI.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Exit code used when the user aborts a running translation.
pub const EXIT_CANCELLED: i32 = 130;

/// Failure reported by a single translation backend.
///
/// Every backend maps its own status codes onto these four kinds so the
/// retry policy does not need to know which service it is talking to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("unsupported request: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// Returns `true` for failures that may resolve on a later attempt.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit { .. } | Self::Transient(_))
    }

    /// Server-requested delay before the next attempt, if any.
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Short lowercase label for logs and summaries.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::RateLimit { .. } => "rate-limit",
            Self::Transient(_) => "transient",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::Unsupported(format!("could not build request: {err}"));
        }
        if err.is_timeout() {
            return Self::Transient(format!("request timed out: {err}"));
        }
        if err.is_connect() {
            return Self::Transient(format!("connection failed: {err}"));
        }
        if err.is_decode() {
            return Self::Transient(format!("unexpected response body: {err}"));
        }
        Self::Transient(err.to_string())
    }
}

/// One failed call against one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub provider: String,
    /// 1-based attempt number within this provider's retry budget.
    pub attempt: u32,
    pub error: ProviderError,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (attempt {}): {}",
            self.provider, self.attempt, self.error
        )
    }
}

/// Problems with the configuration file. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration file found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("Failed to parse configuration file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to access configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Every failure that can leave the orchestrator.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("{message}")]
    InvalidRequest {
        message: String,
        hint: Option<String>,
    },

    #[error("provider '{provider}' failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("all providers failed: {}", summarize_attempts(.attempts))]
    AllProvidersFailed { attempts: Vec<AttemptFailure> },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("translation cancelled")]
    Cancelled,
}

impl TranslationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            hint: None,
        }
    }

    pub fn invalid_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Remediation text shown under the error message, if any.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidRequest { hint, .. } => hint.clone(),
            Self::Provider {
                source: ProviderError::Auth(_),
                provider,
            } => Some(format!(
                "Check the API key configured for '{provider}' (run 'lingo --config')."
            )),
            Self::Provider {
                source: ProviderError::Unsupported(_),
                ..
            } => Some("Run 'lingo --list-languages' to see supported codes.".to_string()),
            Self::AllProvidersFailed { .. } => {
                Some("Check your network connection or try again later.".to_string())
            }
            Self::Config(ConfigError::Missing { .. }) => {
                Some("Run 'lingo --config' to create one.".to_string())
            }
            Self::Config(_) => Some("Fix the file or run 'lingo --config'.".to_string()),
            _ => None,
        }
    }

    /// Process exit code for this error kind.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidRequest { .. }
            | Self::Provider {
                source: ProviderError::Unsupported(_),
                ..
            } => exitcode::DATAERR,
            Self::Provider {
                source: ProviderError::Auth(_),
                ..
            } => exitcode::NOPERM,
            Self::Provider { .. } | Self::AllProvidersFailed { .. } => exitcode::UNAVAILABLE,
            Self::Config(_) => exitcode::CONFIG,
            Self::Cancelled => EXIT_CANCELLED,
        }
    }
}

fn summarize_attempts(attempts: &[AttemptFailure]) -> String {
    if attempts.is_empty() {
        return "no provider was attempted".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(ProviderError::Transient("503".into()).is_retryable());
        assert!(
            ProviderError::RateLimit {
                message: "429".into(),
                retry_after: None
            }
            .is_retryable()
        );
        assert!(!ProviderError::Auth("403".into()).is_retryable());
        assert!(!ProviderError::Unsupported("xx".into()).is_retryable());
    }

    #[test]
    fn test_retry_after_only_for_rate_limit() {
        let limited = ProviderError::RateLimit {
            message: "slow down".into(),
            retry_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(2)));
        assert_eq!(ProviderError::Transient("x".into()).retry_after(), None);
    }

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        let invalid = TranslationError::invalid("empty");
        let config = TranslationError::Config(ConfigError::Invalid("x".into()));
        let network = TranslationError::AllProvidersFailed { attempts: vec![] };
        let auth = TranslationError::Provider {
            provider: "deepl".into(),
            source: ProviderError::Auth("bad key".into()),
        };

        assert_eq!(invalid.exit_code(), exitcode::DATAERR);
        assert_eq!(config.exit_code(), exitcode::CONFIG);
        assert_eq!(network.exit_code(), exitcode::UNAVAILABLE);
        assert_eq!(auth.exit_code(), exitcode::NOPERM);
        assert_eq!(TranslationError::Cancelled.exit_code(), EXIT_CANCELLED);
    }

    #[test]
    fn test_all_providers_failed_lists_attempts() {
        let err = TranslationError::AllProvidersFailed {
            attempts: vec![
                AttemptFailure {
                    provider: "a".into(),
                    attempt: 1,
                    error: ProviderError::Transient("503".into()),
                },
                AttemptFailure {
                    provider: "b".into(),
                    attempt: 1,
                    error: ProviderError::Transient("timeout".into()),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("a (attempt 1)"));
        assert!(message.contains("b (attempt 1)"));
    }

    #[test]
    fn test_invalid_request_keeps_hint() {
        let err = TranslationError::invalid_with_hint("Text is empty", "Pass some text");
        assert_eq!(err.to_string(), "Text is empty");
        assert_eq!(err.hint().as_deref(), Some("Pass some text"));
    }
}
