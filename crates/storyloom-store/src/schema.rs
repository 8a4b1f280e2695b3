//! Database schema SQL.

/// Core tables: stories, bible_elements, chapters, version_history, settings.
///
/// `version_history` references exactly one parent: the CHECK constraint
/// rules out "both set" and "neither set" rows at the storage layer, matching
/// the `ParentRef` union on the Rust side. History rows are append-only and
/// are never touched by soft deletion of their parent.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS stories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL,
    lifecycle TEXT NOT NULL DEFAULT 'active'
);

CREATE TABLE IF NOT EXISTS bible_elements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    story_id INTEGER NOT NULL REFERENCES stories(id),
    type TEXT NOT NULL,
    name TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    version INTEGER NOT NULL DEFAULT 1,
    lifecycle TEXT NOT NULL DEFAULT 'active'
);

CREATE TABLE IF NOT EXISTS chapters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    story_id INTEGER NOT NULL REFERENCES stories(id),
    ord INTEGER NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    version INTEGER NOT NULL DEFAULT 1,
    lifecycle TEXT NOT NULL DEFAULT 'active'
);

CREATE TABLE IF NOT EXISTS version_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bible_element_id INTEGER REFERENCES bible_elements(id),
    chapter_id INTEGER REFERENCES chapters(id),
    version INTEGER NOT NULL,
    content TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    CHECK ((bible_element_id IS NULL) <> (chapter_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_bible_elements_story ON bible_elements(story_id);
CREATE INDEX IF NOT EXISTS idx_chapters_story ON chapters(story_id);
CREATE INDEX IF NOT EXISTS idx_history_bible_element ON version_history(bible_element_id);
CREATE INDEX IF NOT EXISTS idx_history_chapter ON version_history(chapter_id);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
