use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use std::path::Path;
use tracing::debug;

use super::{HistoryEntry, HistoryRecord};

const COLUMNS: &str = "id, timestamp, text, source_lang, source_lang_resolved, target_lang, \
                       provider, translated_text, provider_used";

/// SQLite-backed history log.
///
/// Rows are only ever appended, pruned from the oldest end, or cleared.
/// The database file can be read by other processes while lingo runs.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl HistoryStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create history directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(db_path).with_context(|| {
            format!("Failed to open history database: {}", db_path.display())
        })?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                text TEXT NOT NULL,
                source_lang TEXT,
                source_lang_resolved TEXT NOT NULL,
                target_lang TEXT NOT NULL,
                provider TEXT,
                translated_text TEXT NOT NULL,
                provider_used TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create history table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_langs
             ON history(source_lang_resolved, target_lang)",
            [],
        )
        .context("Failed to create index")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<HistoryRecord> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO history
             (timestamp, text, source_lang, source_lang_resolved, target_lang,
              provider, translated_text, provider_used)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.timestamp.to_rfc3339(),
                entry.text,
                entry.source_lang,
                entry.source_lang_resolved,
                entry.target_lang,
                entry.provider,
                entry.translated_text,
                entry.provider_used,
            ],
        )
        .context("Failed to insert history entry")?;

        Ok(HistoryRecord {
            id: conn.last_insert_rowid(),
            entry: entry.clone(),
        })
    }

    /// Newest first. `limit` of zero returns nothing.
    pub fn list(&self, limit: usize, offset: usize) -> Result<Vec<HistoryRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM history ORDER BY id DESC LIMIT ?1 OFFSET ?2"
        ))?;

        let records = stmt
            .query_map(params![to_sql_int(limit), to_sql_int(offset)], read_record)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read history")?;
        Ok(records)
    }

    /// Newest first, matching either side of the language pair.
    pub fn list_for_language(&self, lang: &str, limit: usize) -> Result<Vec<HistoryRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM history
             WHERE source_lang_resolved = ?1 OR target_lang = ?1
             ORDER BY id DESC LIMIT ?2"
        ))?;

        let records = stmt
            .query_map(params![lang, to_sql_int(limit)], read_record)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read history")?;
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
            .context("Failed to count history entries")?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Deletes the oldest entries beyond `max_count` and returns how many
    /// were removed.
    pub fn prune(&self, max_count: usize) -> Result<usize> {
        let removed = self
            .conn
            .lock()
            .execute(
                "DELETE FROM history WHERE id NOT IN
                 (SELECT id FROM history ORDER BY id DESC LIMIT ?1)",
                params![to_sql_int(max_count)],
            )
            .context("Failed to prune history")?;

        if removed > 0 {
            debug!(removed, max_count, "Pruned history");
        }
        Ok(removed)
    }

    /// Removes every entry and returns how many there were.
    pub fn clear(&self) -> Result<usize> {
        self.conn
            .lock()
            .execute("DELETE FROM history", [])
            .context("Failed to clear history")
    }
}

fn to_sql_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
    let raw_timestamp: String = row.get(1)?;
    let timestamp = DateTime::parse_from_rfc3339(&raw_timestamp)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(HistoryRecord {
        id: row.get(0)?,
        entry: HistoryEntry {
            timestamp,
            text: row.get(2)?,
            source_lang: row.get(3)?,
            source_lang_resolved: row.get(4)?,
            target_lang: row.get(5)?,
            provider: row.get(6)?,
            translated_text: row.get(7)?,
            provider_used: row.get(8)?,
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn entry(text: &str, source: &str, target: &str) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            text: text.to_string(),
            source_lang: None,
            source_lang_resolved: source.to_string(),
            target_lang: target.to_string(),
            provider: None,
            translated_text: format!("[{target}] {text}"),
            provider_used: "deepl".to_string(),
        }
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let store = HistoryStore::open_in_memory().unwrap();
        let first = store.append(&entry("one", "en", "es")).unwrap();
        let second = store.append(&entry("two", "en", "es")).unwrap();

        assert!(second.id > first.id);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_list_newest_first_with_offset() {
        let store = HistoryStore::open_in_memory().unwrap();
        for text in ["one", "two", "three"] {
            store.append(&entry(text, "en", "es")).unwrap();
        }

        let texts: Vec<String> = store
            .list(10, 0)
            .unwrap()
            .into_iter()
            .map(|r| r.entry.text)
            .collect();
        assert_eq!(texts, ["three", "two", "one"]);

        let page = store.list(1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].entry.text, "two");
    }

    #[test]
    fn test_round_trips_every_field() {
        let store = HistoryStore::open_in_memory().unwrap();
        let mut original = entry("Bonjour", "fr", "en");
        original.source_lang = Some("fr".to_string());
        original.provider = Some("deepl".to_string());

        store.append(&original).unwrap();
        let loaded = store.list(1, 0).unwrap().remove(0);

        assert_eq!(loaded.entry, original);
    }

    #[test]
    fn test_list_for_language_matches_either_side() {
        let store = HistoryStore::open_in_memory().unwrap();
        store.append(&entry("a", "en", "es")).unwrap();
        store.append(&entry("b", "fr", "en")).unwrap();
        store.append(&entry("c", "de", "it")).unwrap();

        let texts: Vec<String> = store
            .list_for_language("en", 10)
            .unwrap()
            .into_iter()
            .map(|r| r.entry.text)
            .collect();
        assert_eq!(texts, ["b", "a"]);
    }

    #[test]
    fn test_prune_keeps_newest() {
        let store = HistoryStore::open_in_memory().unwrap();
        for i in 0..5 {
            store.append(&entry(&format!("t{i}"), "en", "es")).unwrap();
        }

        assert_eq!(store.prune(2).unwrap(), 3);
        let texts: Vec<String> = store
            .list(10, 0)
            .unwrap()
            .into_iter()
            .map(|r| r.entry.text)
            .collect();
        assert_eq!(texts, ["t4", "t3"]);
        assert_eq!(store.prune(2).unwrap(), 0);
    }

    #[test]
    fn test_clear() {
        let store = HistoryStore::open_in_memory().unwrap();
        store.append(&entry("a", "en", "es")).unwrap();
        store.append(&entry("b", "en", "es")).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_persists_across_opens() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data/history.db");

        {
            let store = HistoryStore::open(&db_path).unwrap();
            store.append(&entry("kept", "en", "ja")).unwrap();
        }

        let reopened = HistoryStore::open(&db_path).unwrap();
        let records = reopened.list(10, 0).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entry.text, "kept");
    }
}
