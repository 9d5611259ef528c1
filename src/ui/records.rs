use chrono::{DateTime, Utc};

use super::Style;
use crate::history::{HistoryRecord, relative_time};

/// Longest excerpt of source or translated text shown per entry.
const EXCERPT_CHARS: usize = 60;

/// Prints history records as a numbered list, newest first.
pub fn print_history(records: &[HistoryRecord], now: DateTime<Utc>) {
    if records.is_empty() {
        println!("{}", Style::secondary("No translation history yet."));
        return;
    }

    println!("{}", Style::header("Translation history"));
    for (index, record) in records.iter().enumerate() {
        let entry = &record.entry;
        println!(
            "{:>3}. {}  {} {} {}  {}",
            index + 1,
            Style::secondary(relative_time(entry.timestamp, now)),
            Style::code(&entry.source_lang_resolved),
            Style::secondary("→"),
            Style::code(&entry.target_lang),
            Style::value(&entry.provider_used),
        );
        println!("     {}", excerpt(&entry.text));
        println!("     {}", Style::translation(excerpt(&entry.translated_text)));
    }
}

/// First line of `text`, cut to a readable length.
pub fn excerpt(text: &str) -> String {
    let mut lines = text.trim().lines();
    let first_line = lines.next().unwrap_or_default();
    let truncated = first_line.chars().count() > EXCERPT_CHARS || lines.next().is_some();
    let cut: String = first_line.chars().take(EXCERPT_CHARS).collect();
    if truncated {
        format!("{}…", cut.trim_end())
    } else {
        cut
    }
}
