//! Global settings: a flat key → JSON-value mapping in the same database.
//!
//! Last-write-wins, no versioning. Startup seeding inserts defaults only
//! where a key is absent, so customized values survive restarts.

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::info;

use crate::defaults;
use crate::store::StoryStore;
use storyloom_core::{Error, Result};

/// Read and decode a setting through an existing connection (or open
/// transaction). Used by story creation to resolve the bible schema inside
/// its own transaction.
pub(crate) fn read_setting(conn: &Connection, key: &str) -> Result<Option<Value>> {
    let raw: Option<String> = conn
        .prepare_cached("SELECT value FROM settings WHERE key = ?1")
        .map_err(|e| Error::Database(e.to_string()))?
        .query_row(params![key], |row| row.get(0))
        .optional()
        .map_err(|e| Error::Database(e.to_string()))?;
    match raw {
        None => Ok(None),
        Some(s) => serde_json::from_str(&s)
            .map(Some)
            .map_err(|e| Error::Database(format!("setting {} holds invalid JSON: {}", key, e))),
    }
}

impl StoryStore {
    /// Get the decoded value for a key, or None when absent.
    pub fn get_setting(&self, key: &str) -> Result<Option<Value>> {
        let conn = self.conn.lock();
        read_setting(&conn, key)
    }

    /// Upsert a setting. Last write wins; no concurrency check.
    pub fn set_setting(&self, key: &str, value: &Value) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, encoded],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Every key with its best-effort decoded value. A stored value that is
    /// not valid JSON is returned as a plain string rather than an error.
    pub fn list_settings(&self) -> Result<Vec<(String, Value)>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT key, value FROM settings ORDER BY key")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                let raw: String = row.get(1)?;
                Ok((key, raw))
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows
            .filter_map(|r| r.ok())
            .map(|(key, raw)| {
                let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
                (key, value)
            })
            .collect())
    }

    /// Populate default settings, inserting each key only if absent.
    /// Safe to run on every boot.
    pub fn seed_defaults(&self) -> Result<()> {
        let mut seeded = 0usize;

        seeded += self.seed_if_absent("genres", &defaults::default_genres())? as usize;
        seeded += self.seed_if_absent("tones", &defaults::default_tones())? as usize;
        seeded += self.seed_if_absent(
            "llm_url",
            &Value::String(defaults::DEFAULT_CHAT_URL.to_string()),
        )? as usize;
        seeded += self.seed_if_absent(
            "llm_model",
            &Value::String(defaults::DEFAULT_CHAT_MODEL.to_string()),
        )? as usize;
        seeded += self.seed_if_absent(
            "system_prompt",
            &Value::String(defaults::DEFAULT_SYSTEM_PROMPT.to_string()),
        )? as usize;

        // The schema's genre field picks up the (possibly customized)
        // genres list seeded or configured above.
        let genres = self.get_setting("genres").unwrap_or_default();
        seeded += self.seed_if_absent(
            "bible_schema",
            &defaults::default_bible_schema(genres.as_ref()),
        )? as usize;

        if seeded > 0 {
            info!("Seeded {} default settings", seeded);
        }
        Ok(())
    }

    fn seed_if_absent(&self, key: &str, value: &Value) -> Result<bool> {
        let encoded = serde_json::to_string(value)?;
        let conn = self.conn.lock();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, encoded],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(inserted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (StoryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = StoryStore::open(dir.path().join("storyloom.db")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let (store, _dir) = test_store();
        store
            .set_setting("llm_url", &serde_json::json!("http://localhost:9999/v1/chat"))
            .unwrap();
        let value = store.get_setting("llm_url").unwrap().unwrap();
        assert_eq!(value, "http://localhost:9999/v1/chat");
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (store, _dir) = test_store();
        assert!(store.get_setting("nope").unwrap().is_none());
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let (store, _dir) = test_store();
        store.seed_defaults().unwrap();

        let custom = serde_json::json!(["Slipstream", "Weird West"]);
        store.set_setting("genres", &custom).unwrap();

        store.seed_defaults().unwrap();
        assert_eq!(store.get_setting("genres").unwrap().unwrap(), custom);

        // Untouched defaults stay present.
        assert!(store.get_setting("tones").unwrap().is_some());
        assert!(store.get_setting("bible_schema").unwrap().is_some());
    }

    #[test]
    fn test_schema_genre_field_carries_configured_genres() {
        let (store, _dir) = test_store();
        let custom = serde_json::json!(["Solarpunk"]);
        store.set_setting("genres", &custom).unwrap();
        store.seed_defaults().unwrap();

        let schema = store.get_setting("bible_schema").unwrap().unwrap();
        let fields = schema["story_settings"]["fields"].as_array().unwrap();
        let genre = fields
            .iter()
            .find(|f| f["key"] == "genre")
            .expect("genre field");
        assert_eq!(genre["options"], custom);
    }

    #[test]
    fn test_list_settings_tolerates_undecodable_values() {
        let (store, _dir) = test_store();
        store.set_setting("good", &serde_json::json!({"a": 1})).unwrap();
        {
            let conn = store.conn.lock();
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES ('broken', 'not json {')",
                [],
            )
            .unwrap();
        }

        let all = store.list_settings().unwrap();
        let broken = all.iter().find(|(k, _)| k == "broken").unwrap();
        assert_eq!(broken.1, Value::String("not json {".into()));
        let good = all.iter().find(|(k, _)| k == "good").unwrap();
        assert_eq!(good.1["a"], 1);
    }
}
