//! Append-only translation history.

mod sqlite;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use sqlite::HistoryStore;

use crate::translation::{TranslatedText, TranslationRequest};

/// A translation about to be recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    /// Source language as requested; `None` when it was detected.
    pub source_lang: Option<String>,
    pub source_lang_resolved: String,
    pub target_lang: String,
    /// Provider override, if the caller pinned one.
    pub provider: Option<String>,
    pub translated_text: String,
    pub provider_used: String,
}

impl HistoryEntry {
    pub fn from_translation(
        request: &TranslationRequest,
        result: &TranslatedText,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            text: request.text.clone(),
            source_lang: request.source_lang.clone(),
            source_lang_resolved: result.source_lang_resolved.clone(),
            target_lang: result.target_lang.clone(),
            provider: request.provider.clone(),
            translated_text: result.translated_text.clone(),
            provider_used: result.provider_used.clone(),
        }
    }
}

/// A stored history entry. `id` grows monotonically with insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub id: i64,
    #[serde(flatten)]
    pub entry: HistoryEntry,
}

/// Human-friendly age of `at` relative to `now`.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if hours < 1 {
        plural(minutes, "minute")
    } else if days < 1 {
        plural(hours, "hour")
    } else if days < 2 {
        "yesterday".to_string()
    } else if days < 7 {
        plural(days, "day")
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_relative_time() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let ago = |d: Duration| relative_time(now - d, now);

        assert_eq!(ago(Duration::seconds(5)), "just now");
        assert_eq!(ago(Duration::minutes(1)), "1 minute ago");
        assert_eq!(ago(Duration::minutes(5)), "5 minutes ago");
        assert_eq!(ago(Duration::hours(3)), "3 hours ago");
        assert_eq!(ago(Duration::hours(30)), "yesterday");
        assert_eq!(ago(Duration::days(4)), "4 days ago");
        assert_eq!(ago(Duration::days(10)), "2024-03-05");
    }

    #[test]
    fn test_clock_skew_reads_as_just_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now + Duration::minutes(2), now), "just now");
    }
}
