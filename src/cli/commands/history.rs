//! History listing and clearing.

use anyhow::Result;
use chrono::Utc;
use inquire::Confirm;
use std::io::{self, IsTerminal};

use crate::history::HistoryStore;
use crate::paths;
use crate::translation::validate_language;
use crate::ui::{Style, print_history, prompt_or_cancel};

pub fn run_history(limit: usize, lang: Option<&str>) -> Result<()> {
    let store = HistoryStore::open(&paths::history_db()?)?;

    let records = match lang {
        Some(code) => store.list_for_language(validate_language(code, false)?, limit)?,
        None => store.list(limit, 0)?,
    };

    print_history(&records, Utc::now());
    Ok(())
}

/// Deletes every history entry. Asks first when attached to a terminal.
pub fn run_clear_history() -> Result<()> {
    prompt_or_cancel(|| {
        let store = HistoryStore::open(&paths::history_db()?)?;

        if io::stdin().is_terminal()
            && !Confirm::new("Delete all translation history?")
                .with_default(false)
                .prompt()?
        {
            return Ok(());
        }

        let removed = store.clear()?;
        println!(
            "{} Removed {removed} history {}",
            Style::success("✓"),
            if removed == 1 { "entry" } else { "entries" }
        );
        Ok(())
    })
    .map(drop)
}
