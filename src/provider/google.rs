//! Google Cloud Translation (v2 REST API).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{check_status, endpoint_url, read_json};
use super::{ProviderClient, ProviderKind};
use crate::error::ProviderError;
use crate::translation::{AUTO, Detection, TranslatedText};

pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

pub struct GoogleClient {
    client: Client,
    name: String,
    endpoint: String,
    api_key: String,
}

impl GoogleClient {
    pub const fn new(client: Client, name: String, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            name,
            endpoint,
            api_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    format: &'static str,
}

#[derive(Debug, Serialize)]
struct DetectBody<'a> {
    q: &'a str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationsData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTranslation {
    translated_text: String,
    detected_source_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetectionsData {
    detections: Vec<Vec<GoogleDetection>>,
}

#[derive(Debug, Deserialize)]
struct GoogleDetection {
    language: String,
    #[serde(default)]
    confidence: Option<f32>,
}

#[async_trait]
impl ProviderClient for GoogleClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<TranslatedText, ProviderError> {
        let mut url = endpoint_url(&self.endpoint, "")?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let body = TranslateBody {
            q: text,
            target,
            source: (source != AUTO).then_some(source),
            format: "text",
        };

        debug!(provider = %self.name, target, "Calling Google Translate");
        let response = self.client.post(url).json(&body).send().await?;
        let envelope: Envelope<TranslationsData> = read_json(check_status(response).await?).await?;

        let translation = envelope
            .data
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Transient("response contained no translations".into()))?;

        let source_lang_resolved = if source == AUTO {
            translation
                .detected_source_language
                .unwrap_or_else(|| AUTO.to_string())
        } else {
            source.to_string()
        };

        Ok(TranslatedText {
            original_text: text.to_string(),
            source_lang_resolved,
            target_lang: target.to_string(),
            translated_text: translation.translated_text,
            provider_used: self.name.clone(),
            detected_confidence: None,
        })
    }

    async fn detect(&self, text: &str) -> Result<Detection, ProviderError> {
        let mut url = endpoint_url(&self.endpoint, "detect")?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let response = self
            .client
            .post(url)
            .json(&DetectBody { q: text })
            .send()
            .await?;
        let envelope: Envelope<DetectionsData> = read_json(check_status(response).await?).await?;

        envelope
            .data
            .detections
            .into_iter()
            .flatten()
            .next()
            .map(|d| Detection {
                language: d.language,
                confidence: d.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
            })
            .ok_or_else(|| ProviderError::Transient("response contained no detections".into()))
    }
}
