//! LibreTranslate, hosted or self-hosted.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{check_status, endpoint_url, read_json};
use super::{ProviderClient, ProviderKind};
use crate::error::ProviderError;
use crate::translation::{AUTO, Detection, TranslatedText};

pub const DEFAULT_ENDPOINT: &str = "https://libretranslate.com";

pub struct LibreTranslateClient {
    client: Client,
    name: String,
    endpoint: String,
    api_key: Option<String>,
}

impl LibreTranslateClient {
    pub const fn new(
        client: Client,
        name: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Self {
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
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DetectBody<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
    detected_language: Option<LibreDetection>,
}

/// LibreTranslate reports confidence on a 0-100 scale.
#[derive(Debug, Deserialize)]
struct LibreDetection {
    language: String,
    #[serde(default)]
    confidence: f32,
}

#[async_trait]
impl ProviderClient for LibreTranslateClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::LibreTranslate
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<TranslatedText, ProviderError> {
        let url = endpoint_url(&self.endpoint, "translate")?;
        let body = TranslateBody {
            q: text,
            source,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        debug!(provider = %self.name, target, "Calling LibreTranslate");
        let response = self.client.post(url).json(&body).send().await?;
        let parsed: TranslateResponse = read_json(check_status(response).await?).await?;

        let source_lang_resolved = if source == AUTO {
            parsed
                .detected_language
                .map_or_else(|| AUTO.to_string(), |d| d.language)
        } else {
            source.to_string()
        };

        Ok(TranslatedText {
            original_text: text.to_string(),
            source_lang_resolved,
            target_lang: target.to_string(),
            translated_text: parsed.translated_text,
            provider_used: self.name.clone(),
            detected_confidence: None,
        })
    }

    async fn detect(&self, text: &str) -> Result<Detection, ProviderError> {
        let url = endpoint_url(&self.endpoint, "detect")?;
        let body = DetectBody {
            q: text,
            api_key: self.api_key.as_deref(),
        };

        let response = self.client.post(url).json(&body).send().await?;
        let detections: Vec<LibreDetection> = read_json(check_status(response).await?).await?;

        detections
            .into_iter()
            .next()
            .map(|d| Detection {
                language: d.language,
                confidence: (d.confidence / 100.0).clamp(0.0, 1.0),
            })
            .ok_or_else(|| ProviderError::Transient("response contained no detections".into()))
    }
}
