//! Data types for stories, bible elements, chapters, and version history.

use serde::{Deserialize, Serialize};

/// The element type that is created with every story and may never be
/// deleted.
pub const STORY_SETTINGS_TYPE: &str = "story_settings";

/// Entity lifecycle state. All read paths filter on `Active`; soft deletion
/// flips a row to `Deleted` without removing it or its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Active,
    Deleted,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Active => "active",
            Lifecycle::Deleted => "deleted",
        }
    }

    pub fn from_column(s: &str) -> Self {
        if s == "deleted" {
            Lifecycle::Deleted
        } else {
            Lifecycle::Active
        }
    }
}

/// A story row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub lifecycle: Lifecycle,
}

/// A bible element row (character, location, arc, story_settings, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BibleElement {
    pub id: i64,
    pub story_id: i64,
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    pub content: String,
    pub version: i64,
    pub lifecycle: Lifecycle,
}

/// A chapter row. `order` is caller-assigned and not validated for
/// uniqueness or contiguity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub story_id: i64,
    pub order: i64,
    pub title: String,
    pub content: String,
    pub version: i64,
    pub lifecycle: Lifecycle,
}

/// The parent of a version history row: a bible element or a chapter,
/// never both, never neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "parent_kind", content = "parent_id")]
pub enum ParentRef {
    BibleElement(i64),
    Chapter(i64),
}

/// An immutable content snapshot written alongside every create and update
/// of its parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: i64,
    #[serde(flatten)]
    pub parent: ParentRef,
    pub version: i64,
    pub content: String,
    pub timestamp: String,
}

/// Result of a soft-delete request on a bible element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The `story_settings` element refused deletion.
    Protected,
}

/// Fields for creating a bible element.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBibleElement {
    pub story_id: i64,
    #[serde(rename = "type")]
    pub element_type: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    /// Initial version; defaults to 1.
    pub version: Option<i64>,
}

/// Fields for creating a chapter.
#[derive(Debug, Clone, Deserialize)]
pub struct NewChapter {
    pub story_id: i64,
    pub order: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub version: Option<i64>,
}
