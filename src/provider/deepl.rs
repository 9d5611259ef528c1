//! DeepL API (v2).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{check_status, endpoint_url, read_json};
use super::{ProviderClient, ProviderKind};
use crate::error::ProviderError;
use crate::translation::{AUTO, TranslatedText};

pub const DEFAULT_ENDPOINT: &str = "https://api-free.deepl.com/v2";

/// DeepL answers 456 when the account's character quota is used up.
const QUOTA_EXCEEDED: u16 = 456;

const SOURCE_LANGUAGES: &[&str] = &[
    "ar", "bg", "cs", "da", "de", "el", "en", "es", "et", "fi", "fr", "hu", "id", "it", "ja",
    "ko", "lt", "lv", "no", "nl", "pl", "pt", "ro", "ru", "sk", "sl", "sv", "tr", "uk", "zh",
];

pub struct DeepLClient {
    client: Client,
    name: String,
    endpoint: String,
    api_key: String,
}

impl DeepLClient {
    pub const fn new(client: Client, name: String, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            name,
            endpoint,
            api_key,
        }
    }
}

/// Maps a canonical code to a DeepL source code.
fn source_code(code: &str) -> Option<String> {
    let base = code.split('-').next().unwrap_or(code);
    if !SOURCE_LANGUAGES.contains(&base) {
        return None;
    }
    let base = if base == "no" { "nb" } else { base };
    Some(base.to_uppercase())
}

/// Maps a canonical code to a DeepL target code, which needs regional
/// variants for English, Portuguese and Chinese.
fn target_code(code: &str) -> Option<String> {
    match code {
        "en" => Some("EN-US".to_string()),
        "pt" => Some("PT-PT".to_string()),
        "pt-BR" => Some("PT-BR".to_string()),
        "zh" => Some("ZH-HANS".to_string()),
        "zh-TW" => Some("ZH-HANT".to_string()),
        other => source_code(other),
    }
}

fn from_deepl_code(code: &str) -> String {
    match code.to_ascii_uppercase().as_str() {
        "NB" => "no".to_string(),
        "ZH-HANT" => "zh-TW".to_string(),
        "PT-BR" => "pt-BR".to_string(),
        other => other
            .split('-')
            .next()
            .unwrap_or(other)
            .to_ascii_lowercase(),
    }
}

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    text: [&'a str; 1],
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
    detected_source_language: Option<String>,
}

#[async_trait]
impl ProviderClient for DeepLClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::DeepL
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<TranslatedText, ProviderError> {
        let target_lang = target_code(target).ok_or_else(|| {
            ProviderError::Unsupported(format!("DeepL cannot translate into '{target}'"))
        })?;
        let source_lang = if source == AUTO {
            None
        } else {
            Some(source_code(source).ok_or_else(|| {
                ProviderError::Unsupported(format!("DeepL cannot translate from '{source}'"))
            })?)
        };

        let url = endpoint_url(&self.endpoint, "translate")?;
        let body = TranslateBody {
            text: [text],
            target_lang,
            source_lang,
        };

        debug!(provider = %self.name, target, "Calling DeepL");
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if response.status().as_u16() == QUOTA_EXCEEDED {
            return Err(ProviderError::Auth(
                "DeepL character quota exceeded".to_string(),
            ));
        }

        let parsed: TranslateResponse = read_json(check_status(response).await?).await?;
        let translation = parsed
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Transient("response contained no translations".into()))?;

        let source_lang_resolved = if source == AUTO {
            translation
                .detected_source_language
                .map_or_else(|| AUTO.to_string(), |c| from_deepl_code(&c))
        } else {
            source.to_string()
        };

        Ok(TranslatedText {
            original_text: text.to_string(),
            source_lang_resolved,
            target_lang: target.to_string(),
            translated_text: translation.text,
            provider_used: self.name.clone(),
            detected_confidence: None,
        })
    }
}
