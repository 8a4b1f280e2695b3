//! SQLite-backed store for versioned story artifacts.
//!
//! Every create and update of a bible element or chapter appends an
//! immutable history row in the same transaction, so readers never observe
//! a parent version without its snapshot or vice versa.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::schema::SCHEMA_SQL;
use crate::settings;
use crate::types::*;
use storyloom_core::{Error, Result};

pub struct StoryStore {
    pub(crate) conn: Mutex<Connection>,
    db_path: PathBuf,
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl StoryStore {
    /// Open or create the store at the given database file.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Database(e.to_string()))?;
        }

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        let story_count = store.count_stories()?;
        info!(
            "StoryStore initialized: {} stories, path={}",
            story_count,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Stories
    // ---------------------------------------------------------------

    /// Create a story and its mandatory `story_settings` bible element in a
    /// single transaction. The settings content is derived from the current
    /// `bible_schema` setting: each declared field gets a type-appropriate
    /// empty default.
    pub fn create_story(&self, title: &str, description: Option<&str>) -> Result<Story> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        let created_at = now();
        tx.execute(
            "INSERT INTO stories (title, description, created_at, lifecycle) \
             VALUES (?1, ?2, ?3, 'active')",
            params![title, description, created_at],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        let story_id = tx.last_insert_rowid();

        let schema = settings::read_setting(&tx, "bible_schema").unwrap_or_default();
        let content = settings_content_from_schema(schema.as_ref());

        tx.execute(
            "INSERT INTO bible_elements (story_id, type, name, content, version, lifecycle) \
             VALUES (?1, ?2, 'Story Settings', ?3, 1, 'active')",
            params![story_id, STORY_SETTINGS_TYPE, content],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        let element_id = tx.last_insert_rowid();

        insert_history(&tx, ParentRef::BibleElement(element_id), 1, &content)?;

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        Ok(Story {
            id: story_id,
            title: title.to_string(),
            description: description.map(|d| d.to_string()),
            created_at,
            lifecycle: Lifecycle::Active,
        })
    }

    /// List non-deleted stories.
    pub fn list_stories(&self) -> Result<Vec<Story>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM stories WHERE lifecycle = 'active' ORDER BY id")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok(Self::row_to_story(row)))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Get a non-deleted story by id.
    pub fn get_story(&self, id: i64) -> Result<Option<Story>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM stories WHERE id = ?1 AND lifecycle = 'active'")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| Ok(Self::row_to_story(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// Soft-delete a story. Children keep their lifecycle.
    pub fn delete_story(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE stories SET lifecycle = 'deleted' WHERE id = ?1",
                params![id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if count == 0 {
            return Err(Error::NotFound(format!("story {}", id)));
        }
        Ok(())
    }

    fn count_stories(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM stories", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Bible elements
    // ---------------------------------------------------------------

    /// Insert a bible element and its initial history snapshot atomically.
    pub fn create_bible_element(&self, new: NewBibleElement) -> Result<BibleElement> {
        let version = new.version.unwrap_or(1);
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO bible_elements (story_id, type, name, content, version, lifecycle) \
             VALUES (?1, ?2, ?3, ?4, ?5, 'active')",
            params![new.story_id, new.element_type, new.name, new.content, version],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        let id = tx.last_insert_rowid();

        insert_history(&tx, ParentRef::BibleElement(id), version, &new.content)?;

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        Ok(BibleElement {
            id,
            story_id: new.story_id,
            element_type: new.element_type,
            name: new.name,
            content: new.content,
            version,
            lifecycle: Lifecycle::Active,
        })
    }

    /// Replace name and content, bump the version by exactly one, and append
    /// the matching history row. Fails with NotFound when no active element
    /// exists at `id`.
    pub fn update_bible_element(&self, id: i64, name: &str, content: &str) -> Result<BibleElement> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        let existing = tx
            .prepare_cached("SELECT * FROM bible_elements WHERE id = ?1 AND lifecycle = 'active'")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| Ok(Self::row_to_element(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        let Some(element) = existing else {
            return Err(Error::NotFound(format!("bible element {}", id)));
        };

        let version = element.version + 1;
        tx.execute(
            "UPDATE bible_elements SET name = ?1, content = ?2, version = ?3 WHERE id = ?4",
            params![name, content, version, id],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        insert_history(&tx, ParentRef::BibleElement(id), version, content)?;

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        Ok(BibleElement {
            name: name.to_string(),
            content: content.to_string(),
            version,
            ..element
        })
    }

    /// Soft-delete a bible element. The `story_settings` element is
    /// protected and reports `DeleteOutcome::Protected` instead.
    pub fn delete_bible_element(&self, id: i64) -> Result<DeleteOutcome> {
        let conn = self.conn.lock();
        let element_type: Option<String> = conn
            .prepare_cached("SELECT type FROM bible_elements WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        match element_type {
            None => Err(Error::NotFound(format!("bible element {}", id))),
            Some(t) if t == STORY_SETTINGS_TYPE => Ok(DeleteOutcome::Protected),
            Some(_) => {
                conn.execute(
                    "UPDATE bible_elements SET lifecycle = 'deleted' WHERE id = ?1",
                    params![id],
                )
                .map_err(|e| Error::Database(e.to_string()))?;
                Ok(DeleteOutcome::Deleted)
            }
        }
    }

    /// List non-deleted bible elements for a story.
    pub fn list_bible_elements(&self, story_id: i64) -> Result<Vec<BibleElement>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM bible_elements \
                 WHERE story_id = ?1 AND lifecycle = 'active' ORDER BY id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![story_id], |row| Ok(Self::row_to_element(row)))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Get a non-deleted bible element by id.
    pub fn get_bible_element(&self, id: i64) -> Result<Option<BibleElement>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM bible_elements WHERE id = ?1 AND lifecycle = 'active'")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| Ok(Self::row_to_element(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    // ---------------------------------------------------------------
    // Chapters
    // ---------------------------------------------------------------

    /// Insert a chapter and its initial history snapshot atomically.
    pub fn create_chapter(&self, new: NewChapter) -> Result<Chapter> {
        let version = new.version.unwrap_or(1);
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO chapters (story_id, ord, title, content, version, lifecycle) \
             VALUES (?1, ?2, ?3, ?4, ?5, 'active')",
            params![new.story_id, new.order, new.title, new.content, version],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        let id = tx.last_insert_rowid();

        insert_history(&tx, ParentRef::Chapter(id), version, &new.content)?;

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        Ok(Chapter {
            id,
            story_id: new.story_id,
            order: new.order,
            title: new.title,
            content: new.content,
            version,
            lifecycle: Lifecycle::Active,
        })
    }

    /// Replace title and content, bump the version by exactly one, and
    /// append the matching history row.
    pub fn update_chapter(&self, id: i64, title: &str, content: &str) -> Result<Chapter> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        let existing = tx
            .prepare_cached("SELECT * FROM chapters WHERE id = ?1 AND lifecycle = 'active'")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| Ok(Self::row_to_chapter(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        let Some(chapter) = existing else {
            return Err(Error::NotFound(format!("chapter {}", id)));
        };

        let version = chapter.version + 1;
        tx.execute(
            "UPDATE chapters SET title = ?1, content = ?2, version = ?3 WHERE id = ?4",
            params![title, content, version, id],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        insert_history(&tx, ParentRef::Chapter(id), version, content)?;

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        Ok(Chapter {
            title: title.to_string(),
            content: content.to_string(),
            version,
            ..chapter
        })
    }

    /// Soft-delete a chapter.
    pub fn delete_chapter(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock();
        let count = conn
            .execute(
                "UPDATE chapters SET lifecycle = 'deleted' WHERE id = ?1",
                params![id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if count == 0 {
            return Err(Error::NotFound(format!("chapter {}", id)));
        }
        Ok(())
    }

    /// List non-deleted chapters for a story, ordered by the caller-assigned
    /// position.
    pub fn list_chapters(&self, story_id: i64) -> Result<Vec<Chapter>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM chapters \
                 WHERE story_id = ?1 AND lifecycle = 'active' ORDER BY ord",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![story_id], |row| Ok(Self::row_to_chapter(row)))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Get a non-deleted chapter by id.
    pub fn get_chapter(&self, id: i64) -> Result<Option<Chapter>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM chapters WHERE id = ?1 AND lifecycle = 'active'")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| Ok(Self::row_to_chapter(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    // ---------------------------------------------------------------
    // Version history
    // ---------------------------------------------------------------

    /// All history rows for a parent, most recent version first. Rows
    /// survive soft deletion of the parent.
    pub fn list_history(&self, parent: ParentRef) -> Result<Vec<VersionRecord>> {
        let (column, id) = match parent {
            ParentRef::BibleElement(id) => ("bible_element_id", id),
            ParentRef::Chapter(id) => ("chapter_id", id),
        };
        let sql = format!(
            "SELECT * FROM version_history WHERE {} = ?1 ORDER BY version DESC",
            column
        );

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(&sql)
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![id], Self::row_to_history)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ---------------------------------------------------------------
    // Row mapping helpers
    // ---------------------------------------------------------------

    fn row_to_story(row: &rusqlite::Row<'_>) -> Story {
        Story {
            id: row.get("id").unwrap_or(0),
            title: row.get("title").unwrap_or_default(),
            description: row.get("description").ok().flatten(),
            created_at: row.get("created_at").unwrap_or_default(),
            lifecycle: Lifecycle::from_column(
                &row.get::<_, String>("lifecycle").unwrap_or_default(),
            ),
        }
    }

    fn row_to_element(row: &rusqlite::Row<'_>) -> BibleElement {
        BibleElement {
            id: row.get("id").unwrap_or(0),
            story_id: row.get("story_id").unwrap_or(0),
            element_type: row.get("type").unwrap_or_default(),
            name: row.get("name").unwrap_or_default(),
            content: row.get("content").unwrap_or_default(),
            version: row.get("version").unwrap_or(1),
            lifecycle: Lifecycle::from_column(
                &row.get::<_, String>("lifecycle").unwrap_or_default(),
            ),
        }
    }

    fn row_to_chapter(row: &rusqlite::Row<'_>) -> Chapter {
        Chapter {
            id: row.get("id").unwrap_or(0),
            story_id: row.get("story_id").unwrap_or(0),
            order: row.get("ord").unwrap_or(0),
            title: row.get("title").unwrap_or_default(),
            content: row.get("content").unwrap_or_default(),
            version: row.get("version").unwrap_or(1),
            lifecycle: Lifecycle::from_column(
                &row.get::<_, String>("lifecycle").unwrap_or_default(),
            ),
        }
    }

    fn row_to_history(row: &rusqlite::Row<'_>) -> rusqlite::Result<VersionRecord> {
        let bible_element_id: Option<i64> = row.get("bible_element_id")?;
        let chapter_id: Option<i64> = row.get("chapter_id")?;
        // The CHECK constraint guarantees exactly one parent column is set.
        let parent = match (bible_element_id, chapter_id) {
            (Some(id), None) => ParentRef::BibleElement(id),
            (None, Some(id)) => ParentRef::Chapter(id),
            _ => {
                return Err(rusqlite::Error::IntegralValueOutOfRange(0, 0));
            }
        };
        Ok(VersionRecord {
            id: row.get("id")?,
            parent,
            version: row.get("version")?,
            content: row.get("content")?,
            timestamp: row.get("timestamp")?,
        })
    }
}

/// Write one history snapshot. Runs inside the caller's transaction.
fn insert_history(
    conn: &Connection,
    parent: ParentRef,
    version: i64,
    content: &str,
) -> Result<()> {
    let (bible_element_id, chapter_id) = match parent {
        ParentRef::BibleElement(id) => (Some(id), None),
        ParentRef::Chapter(id) => (None, Some(id)),
    };
    conn.execute(
        "INSERT INTO version_history (bible_element_id, chapter_id, version, content, timestamp) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![bible_element_id, chapter_id, version, content, now()],
    )
    .map_err(|e| Error::Database(e.to_string()))?;
    Ok(())
}

/// Build the initial `story_settings` content from the configured bible
/// schema: declared field keys mapped to type-appropriate empty values.
/// Without a usable schema the content is an empty object.
fn settings_content_from_schema(schema: Option<&serde_json::Value>) -> String {
    let mut content = serde_json::Map::new();
    if let Some(fields) = schema
        .and_then(|s| s.get("story_settings"))
        .and_then(|s| s.get("fields"))
        .and_then(|f| f.as_array())
    {
        for field in fields {
            let Some(key) = field.get("key").and_then(|k| k.as_str()) else {
                continue;
            };
            let value = match field.get("type").and_then(|t| t.as_str()) {
                Some("array") => serde_json::Value::Array(Vec::new()),
                Some("object") => serde_json::Value::Object(Default::default()),
                _ => serde_json::Value::String(String::new()),
            };
            content.insert(key.to_string(), value);
        }
    }
    serde_json::Value::Object(content).to_string()
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

    fn new_element(story_id: i64, name: &str) -> NewBibleElement {
        NewBibleElement {
            story_id,
            element_type: "character".into(),
            name: name.into(),
            content: "{\"role\": \"protagonist\"}".into(),
            version: None,
        }
    }

    #[test]
    fn test_create_story_seeds_settings_element() {
        let (store, _dir) = test_store();
        store.seed_defaults().unwrap();

        let story = store.create_story("The Hollow Crown", None).unwrap();
        let elements = store.list_bible_elements(story.id).unwrap();

        assert_eq!(elements.len(), 1);
        let settings = &elements[0];
        assert_eq!(settings.element_type, STORY_SETTINGS_TYPE);
        assert_eq!(settings.version, 1);

        let content: serde_json::Value = serde_json::from_str(&settings.content).unwrap();
        assert_eq!(content["title_working"], "");
        assert_eq!(content["genre"], serde_json::json!([]));
        assert_eq!(content["narrative"], serde_json::json!({}));

        let history = store
            .list_history(ParentRef::BibleElement(settings.id))
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].version, 1);
        assert_eq!(history[0].content, settings.content);
    }

    #[test]
    fn test_create_story_without_schema_defaults_to_empty_object() {
        let (store, _dir) = test_store();

        let story = store.create_story("Untitled", Some("draft")).unwrap();
        let elements = store.list_bible_elements(story.id).unwrap();
        assert_eq!(elements[0].content, "{}");
    }

    #[test]
    fn test_version_chain_matches_updates() {
        let (store, _dir) = test_store();
        let story = store.create_story("S", None).unwrap();
        let element = store
            .create_bible_element(new_element(story.id, "Eldra"))
            .unwrap();
        assert_eq!(element.version, 1);

        let v2 = store
            .update_bible_element(element.id, "Eldra", "{\"role\": \"mentor\"}")
            .unwrap();
        assert_eq!(v2.version, 2);
        let v3 = store
            .update_bible_element(element.id, "Eldra the Grey", "{\"role\": \"villain\"}")
            .unwrap();
        assert_eq!(v3.version, 3);

        let history = store
            .list_history(ParentRef::BibleElement(element.id))
            .unwrap();
        let versions: Vec<i64> = history.iter().map(|h| h.version).collect();
        assert_eq!(versions, vec![3, 2, 1]);
        assert_eq!(history[0].content, "{\"role\": \"villain\"}");
        assert_eq!(history[1].content, "{\"role\": \"mentor\"}");
        assert_eq!(history[2].content, "{\"role\": \"protagonist\"}");
    }

    #[test]
    fn test_update_missing_element_is_not_found() {
        let (store, _dir) = test_store();
        let result = store.update_bible_element(999, "x", "y");
        assert!(matches!(result, Err(storyloom_core::Error::NotFound(_))));
    }

    #[test]
    fn test_update_deleted_element_is_not_found() {
        let (store, _dir) = test_store();
        let story = store.create_story("S", None).unwrap();
        let element = store
            .create_bible_element(new_element(story.id, "Ghost"))
            .unwrap();
        store.delete_bible_element(element.id).unwrap();

        let result = store.update_bible_element(element.id, "Ghost", "{}");
        assert!(matches!(result, Err(storyloom_core::Error::NotFound(_))));
    }

    #[test]
    fn test_story_settings_is_protected_from_deletion() {
        let (store, _dir) = test_store();
        let story = store.create_story("S", None).unwrap();
        let settings = &store.list_bible_elements(story.id).unwrap()[0];

        let outcome = store.delete_bible_element(settings.id).unwrap();
        assert_eq!(outcome, DeleteOutcome::Protected);

        // Still active and listed.
        let elements = store.list_bible_elements(story.id).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].lifecycle, Lifecycle::Active);
    }

    #[test]
    fn test_soft_delete_hides_element_but_keeps_history() {
        let (store, _dir) = test_store();
        let story = store.create_story("S", None).unwrap();
        let element = store
            .create_bible_element(new_element(story.id, "Doomed"))
            .unwrap();
        store
            .update_bible_element(element.id, "Doomed", "{\"fate\": \"sealed\"}")
            .unwrap();

        let outcome = store.delete_bible_element(element.id).unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);

        let listed = store.list_bible_elements(story.id).unwrap();
        assert!(listed.iter().all(|e| e.id != element.id));
        assert!(store.get_bible_element(element.id).unwrap().is_none());

        let history = store
            .list_history(ParentRef::BibleElement(element.id))
            .unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let (store, _dir) = test_store();
        assert!(matches!(
            store.delete_bible_element(42),
            Err(storyloom_core::Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete_chapter(42),
            Err(storyloom_core::Error::NotFound(_))
        ));
        assert!(matches!(
            store.delete_story(42),
            Err(storyloom_core::Error::NotFound(_))
        ));
    }

    #[test]
    fn test_deleted_story_excluded_from_list() {
        let (store, _dir) = test_store();
        let story = store.create_story("Gone", None).unwrap();
        store.create_story("Kept", None).unwrap();
        store.delete_story(story.id).unwrap();

        let stories = store.list_stories().unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].title, "Kept");
    }

    #[test]
    fn test_chapter_versioning_and_ordering() {
        let (store, _dir) = test_store();
        let story = store.create_story("S", None).unwrap();

        let ch2 = store
            .create_chapter(NewChapter {
                story_id: story.id,
                order: 2,
                title: "The Middle".into(),
                content: "midpoint".into(),
                version: None,
            })
            .unwrap();
        let ch1 = store
            .create_chapter(NewChapter {
                story_id: story.id,
                order: 1,
                title: "The Beginning".into(),
                content: "opening".into(),
                version: None,
            })
            .unwrap();

        let chapters = store.list_chapters(story.id).unwrap();
        assert_eq!(chapters[0].id, ch1.id);
        assert_eq!(chapters[1].id, ch2.id);

        let updated = store
            .update_chapter(ch1.id, "The Beginning", "opening, revised")
            .unwrap();
        assert_eq!(updated.version, 2);

        let history = store.list_history(ParentRef::Chapter(ch1.id)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].version, 2);
        assert_eq!(history[0].content, "opening, revised");
        assert!(matches!(history[0].parent, ParentRef::Chapter(id) if id == ch1.id));
    }

    #[test]
    fn test_create_honors_supplied_initial_version() {
        let (store, _dir) = test_store();
        let story = store.create_story("S", None).unwrap();
        let element = store
            .create_bible_element(NewBibleElement {
                version: Some(4),
                ..new_element(story.id, "Imported")
            })
            .unwrap();
        assert_eq!(element.version, 4);

        let history = store
            .list_history(ParentRef::BibleElement(element.id))
            .unwrap();
        assert_eq!(history[0].version, 4);
    }
}
