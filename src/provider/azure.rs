//! Azure AI Translator (v3 REST API).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{check_status, endpoint_url, read_json};
use super::{ProviderClient, ProviderKind};
use crate::error::ProviderError;
use crate::translation::{AUTO, Detection, TranslatedText};

pub const DEFAULT_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";

const API_VERSION: &str = "3.0";

pub struct AzureClient {
    client: Client,
    name: String,
    endpoint: String,
    api_key: String,
    region: Option<String>,
}

impl AzureClient {
    pub const fn new(
        client: Client,
        name: String,
        endpoint: String,
        api_key: String,
        region: Option<String>,
    ) -> Self {
        Self {
            client,
            name,
            endpoint,
            api_key,
            region,
        }
    }

    fn request(&self, url: reqwest::Url, text: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&[TextItem { text }]);
        if let Some(region) = &self.region {
            builder = builder.header("Ocp-Apim-Subscription-Region", region);
        }
        builder
    }
}

/// Azure uses script subtags for Chinese.
fn to_azure_code(code: &str) -> &str {
    match code {
        "zh" => "zh-Hans",
        "zh-TW" => "zh-Hant",
        "no" => "nb",
        "pt-BR" => "pt",
        other => other,
    }
}

fn from_azure_code(code: &str) -> String {
    match code {
        "zh-Hans" => "zh".to_string(),
        "zh-Hant" => "zh-TW".to_string(),
        "nb" => "no".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct TextItem<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateItem {
    detected_language: Option<AzureDetection>,
    translations: Vec<AzureTranslation>,
}

#[derive(Debug, Deserialize)]
struct AzureTranslation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AzureDetection {
    language: String,
    #[serde(default)]
    score: f32,
}

#[async_trait]
impl ProviderClient for AzureClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<TranslatedText, ProviderError> {
        let mut url = endpoint_url(&self.endpoint, "translate")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api-version", API_VERSION);
            query.append_pair("to", to_azure_code(target));
            if source != AUTO {
                query.append_pair("from", to_azure_code(source));
            }
        }

        debug!(provider = %self.name, target, "Calling Azure Translator");
        let response = self.request(url, text).send().await?;
        let items: Vec<TranslateItem> = read_json(check_status(response).await?).await?;

        let item = items
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Transient("response contained no items".into()))?;
        let translated_text = item
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| ProviderError::Transient("response contained no translations".into()))?;

        let source_lang_resolved = if source == AUTO {
            item.detected_language
                .map_or_else(|| AUTO.to_string(), |d| from_azure_code(&d.language))
        } else {
            source.to_string()
        };

        Ok(TranslatedText {
            original_text: text.to_string(),
            source_lang_resolved,
            target_lang: target.to_string(),
            translated_text,
            provider_used: self.name.clone(),
            detected_confidence: None,
        })
    }

    async fn detect(&self, text: &str) -> Result<Detection, ProviderError> {
        let mut url = endpoint_url(&self.endpoint, "detect")?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);

        let response = self.request(url, text).send().await?;
        let detections: Vec<AzureDetection> = read_json(check_status(response).await?).await?;

        detections
            .into_iter()
            .next()
            .map(|d| Detection {
                language: from_azure_code(&d.language),
                confidence: d.score.clamp(0.0, 1.0),
            })
            .ok_or_else(|| ProviderError::Transient("response contained no detections".into()))
    }
}
