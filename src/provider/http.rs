//! Status-code mapping shared by the REST backends.

use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ProviderError;

/// Longest error body echoed back into an error message.
const MAX_BODY_IN_ERROR: usize = 200;

/// Joins `path` onto a base endpoint, tolerating trailing slashes.
pub fn endpoint_url(base: &str, path: &str) -> Result<Url, ProviderError> {
    let joined = if path.is_empty() {
        base.trim_end_matches('/').to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    };
    Url::parse(&joined)
        .map_err(|e| ProviderError::Unsupported(format!("invalid endpoint '{joined}': {e}")))
}

/// Passes successful responses through and classifies the rest.
pub async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = parse_retry_after(&response);
    let body = response.text().await.unwrap_or_default();
    Err(classify(status, retry_after, &body))
}

/// Reads a JSON body, treating shape mismatches as transient.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        ProviderError::Transient(format!(
            "unexpected response ({e}): {}",
            truncate(&body)
        ))
    })
}

pub fn classify(status: StatusCode, retry_after: Option<Duration>, body: &str) -> ProviderError {
    let message = format!("HTTP {status}: {}", truncate(body));
    match status.as_u16() {
        401 | 403 => ProviderError::Auth(message),
        429 => ProviderError::RateLimit {
            message,
            retry_after,
        },
        408 | 500..=599 => ProviderError::Transient(message),
        _ => ProviderError::Unsupported(message),
    }
}

fn parse_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_BODY_IN_ERROR {
        return body.to_string();
    }
    let cut: String = body.chars().take(MAX_BODY_IN_ERROR).collect();
    format!("{cut}...")
}
