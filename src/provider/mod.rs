//! Translation backends.
//!
//! Each backend implements [`ProviderClient`] and maps its own failures onto
//! [`ProviderError`] so retry and failover stay backend-agnostic.

mod azure;
mod deepl;
mod google;
mod http;
mod libretranslate;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ResolvedProvider;
use crate::error::{ConfigError, ProviderError};
use crate::translation::{Detection, TranslatedText};

pub use azure::AzureClient;
pub use deepl::DeepLClient;
pub use google::GoogleClient;
pub use libretranslate::LibreTranslateClient;

/// Supported backend families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Azure,
    #[serde(rename = "deepl")]
    DeepL,
    #[serde(alias = "libre")]
    LibreTranslate,
}

impl ProviderKind {
    pub const ALL: [Self; 4] = [Self::Google, Self::Azure, Self::DeepL, Self::LibreTranslate];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Azure => "azure",
            Self::DeepL => "deepl",
            Self::LibreTranslate => "libretranslate",
        }
    }

    pub const fn default_endpoint(self) -> &'static str {
        match self {
            Self::Google => google::DEFAULT_ENDPOINT,
            Self::Azure => azure::DEFAULT_ENDPOINT,
            Self::DeepL => deepl::DEFAULT_ENDPOINT,
            Self::LibreTranslate => libretranslate::DEFAULT_ENDPOINT,
        }
    }

    /// LibreTranslate can be self-hosted without a key; the others cannot.
    pub const fn requires_api_key(self) -> bool {
        !matches!(self, Self::LibreTranslate)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "azure" => Ok(Self::Azure),
            "deepl" => Ok(Self::DeepL),
            "libretranslate" | "libre" => Ok(Self::LibreTranslate),
            _ => Err(format!(
                "Unknown provider kind: '{s}'. Use one of: google, azure, deepl, libretranslate"
            )),
        }
    }
}

#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Configured name, used for selection, logs and history.
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Translates `text`. `source` is a canonical code or `"auto"`.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<TranslatedText, ProviderError>;

    async fn detect(&self, _text: &str) -> Result<Detection, ProviderError> {
        Err(ProviderError::Unsupported(format!(
            "{} does not offer language detection",
            self.kind()
        )))
    }
}

/// Builds the shared HTTP client used by every backend.
pub fn http_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("lingo/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::Invalid(format!("Failed to build HTTP client: {e}")))
}

/// Instantiates one client per resolved provider, preserving priority order.
pub fn build_providers(
    providers: &[ResolvedProvider],
    client: &Client,
) -> Vec<Arc<dyn ProviderClient>> {
    providers
        .iter()
        .map(|p| build_provider(p, client.clone()))
        .collect()
}

pub fn build_provider(provider: &ResolvedProvider, client: Client) -> Arc<dyn ProviderClient> {
    let name = provider.name.clone();
    let endpoint = provider.endpoint.clone();
    let api_key = provider.api_key.clone();

    match provider.kind {
        ProviderKind::Google => Arc::new(GoogleClient::new(
            client,
            name,
            endpoint,
            api_key.unwrap_or_default(),
        )),
        ProviderKind::Azure => Arc::new(AzureClient::new(
            client,
            name,
            endpoint,
            api_key.unwrap_or_default(),
            provider.region.clone(),
        )),
        ProviderKind::DeepL => Arc::new(DeepLClient::new(
            client,
            name,
            endpoint,
            api_key.unwrap_or_default(),
        )),
        ProviderKind::LibreTranslate => {
            Arc::new(LibreTranslateClient::new(client, name, endpoint, api_key))
        }
    }
}
