use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::language::{AUTO, is_auto, normalize_language};
use crate::error::TranslationError;

/// Longest text accepted by a single request, in characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// A single translation to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    /// Source language code; `None` or `"auto"` asks for detection.
    pub source_lang: Option<String>,
    pub target_lang: String,
    /// Pins the request to one configured provider.
    pub provider: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: None,
            target_lang: target_lang.into(),
            provider: None,
        }
    }

    #[must_use]
    pub fn from_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = Some(source_lang.into());
        self
    }

    #[must_use]
    pub fn via(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Checks the request and returns a copy with canonical language codes.
    pub fn validated(self) -> Result<Self, TranslationError> {
        if self.text.trim().is_empty() {
            return Err(TranslationError::invalid_with_hint(
                "Text to translate is empty",
                "Pass the text as an argument, pipe it on stdin, or use --file.",
            ));
        }

        let chars = self.text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(TranslationError::invalid_with_hint(
                format!("Text is too long ({chars} characters, maximum {MAX_TEXT_CHARS})"),
                "Use --file to translate long documents in chunks.",
            ));
        }

        let target_lang = normalize_language(&self.target_lang).ok_or_else(|| {
            TranslationError::invalid_with_hint(
                format!("Invalid target language code: '{}'", self.target_lang),
                "Run 'lingo --list-languages' to see all supported codes.",
            )
        })?;

        let source_lang = match self.source_lang.as_deref() {
            None => None,
            Some(code) if is_auto(code) => Some(AUTO.to_string()),
            Some(code) => Some(
                normalize_language(code)
                    .ok_or_else(|| {
                        TranslationError::invalid_with_hint(
                            format!("Invalid source language code: '{code}'"),
                            "Use a supported code or 'auto' to detect the language.",
                        )
                    })?
                    .to_string(),
            ),
        };

        let provider = self
            .provider
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Self {
            text: self.text,
            source_lang,
            target_lang: target_lang.to_string(),
            provider,
        })
    }

    /// Returns `true` when the source language must be detected.
    pub fn needs_detection(&self) -> bool {
        self.source_lang.as_deref().is_none_or(is_auto)
    }

    /// Compute cache key for this request.
    ///
    /// Text is lowercased and trimmed so trivially different inputs share
    /// an entry.
    pub fn cache_key(&self) -> String {
        let cache_input = serde_json::json!({
            "text": self.text.trim().to_lowercase(),
            "source": self.source_lang.as_deref().unwrap_or(AUTO),
            "target": self.target_lang,
            "provider": self.provider.as_deref().unwrap_or("any"),
        });

        let mut hasher = Sha256::new();
        hasher.update(cache_input.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// The result of a successful translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedText {
    pub original_text: String,
    pub source_lang_resolved: String,
    pub target_lang: String,
    pub translated_text: String,
    pub provider_used: String,
    /// Confidence of local language detection, when it was used.
    pub detected_confidence: Option<f32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_normalizes_codes() {
        let request = TranslationRequest::new("Hello", "ES")
            .from_lang("EN")
            .validated()
            .unwrap();
        assert_eq!(request.target_lang, "es");
        assert_eq!(request.source_lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_validated_rejects_whitespace_text() {
        let err = TranslationRequest::new("  \n\t ", "es")
            .validated()
            .unwrap_err();
        assert!(matches!(err, TranslationError::InvalidRequest { .. }));
    }

    #[test]
    fn test_validated_rejects_unknown_target() {
        let err = TranslationRequest::new("Hello", "xx").validated().unwrap_err();
        assert!(err.to_string().contains("target language"));
    }

    #[test]
    fn test_validated_accepts_auto_source() {
        let request = TranslationRequest::new("Hello", "es")
            .from_lang("Auto")
            .validated()
            .unwrap();
        assert_eq!(request.source_lang.as_deref(), Some("auto"));
        assert!(request.needs_detection());
    }

    #[test]
    fn test_validated_rejects_too_long_text() {
        let text = "a".repeat(MAX_TEXT_CHARS + 1);
        let err = TranslationRequest::new(text, "es").validated().unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn test_cache_key_normalizes_text() {
        let a = TranslationRequest::new("Hello, World!", "es");
        let b = TranslationRequest::new("  hello, world!\n", "es");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_includes_provider_and_languages() {
        let base = TranslationRequest::new("Hello", "es");
        assert_ne!(base.cache_key(), base.clone().via("deepl").cache_key());
        assert_ne!(
            base.cache_key(),
            TranslationRequest::new("Hello", "fr").cache_key()
        );
        assert_ne!(base.cache_key(), base.clone().from_lang("en").cache_key());
    }

    #[test]
    fn test_cache_key_treats_missing_source_as_auto() {
        let implicit = TranslationRequest::new("Hello", "es");
        let explicit = TranslationRequest::new("Hello", "es").from_lang("auto");
        assert_eq!(implicit.cache_key(), explicit.cache_key());
    }
}
