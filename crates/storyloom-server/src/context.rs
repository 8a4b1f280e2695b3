//! Context assembly for LLM prompts.
//!
//! Gathers a story's bible catalog, chapter list, and most recent chapter
//! text into prompt sections. No truncation or token budgeting is applied;
//! oversized context is the upstream's problem.

use storyloom_core::Result;
use storyloom_store::{StoryStore, STORY_SETTINGS_TYPE};

/// Sentinel used when a story has no chapters yet.
pub const NO_PRIOR_CHAPTERS: &str = "(no prior chapters)";

/// Prompt sections assembled from a story's current state.
pub struct AssembledContext {
    /// One line per active bible element: `name (type)`.
    pub catalog: String,
    /// Ordered chapter list with titles.
    pub chapter_list: String,
    /// Content of the most recent chapter, or [`NO_PRIOR_CHAPTERS`].
    pub previous_chapter: String,
    /// Full content of relevance-selected elements. Empty unless a
    /// relevance list was supplied.
    pub relevant_content: String,
}

/// Assemble prompt context for a story. When `relevance` is given, elements
/// whose name matches it case-insensitively are included with their full
/// content; the `story_settings` element is always included regardless.
pub fn assemble(
    store: &StoryStore,
    story_id: i64,
    relevance: Option<&[String]>,
) -> Result<AssembledContext> {
    let elements = store.list_bible_elements(story_id)?;
    let chapters = store.list_chapters(story_id)?;

    let catalog = elements
        .iter()
        .map(|e| format!("{} ({})", e.name, e.element_type))
        .collect::<Vec<_>>()
        .join("\n");

    let chapter_list = chapters
        .iter()
        .map(|c| format!("{}. {}", c.order, c.title))
        .collect::<Vec<_>>()
        .join("\n");

    let previous_chapter = chapters
        .last()
        .map(|c| c.content.clone())
        .unwrap_or_else(|| NO_PRIOR_CHAPTERS.to_string());

    let relevant_content = match relevance {
        None => String::new(),
        Some(names) => {
            let wanted: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
            elements
                .iter()
                .filter(|e| {
                    e.element_type == STORY_SETTINGS_TYPE
                        || wanted.contains(&e.name.to_lowercase())
                })
                .map(|e| format!("## {} ({})\n{}", e.name, e.element_type, e.content))
                .collect::<Vec<_>>()
                .join("\n\n")
        }
    };

    Ok(AssembledContext {
        catalog,
        chapter_list,
        previous_chapter,
        relevant_content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyloom_store::{NewBibleElement, NewChapter};
    use tempfile::TempDir;

    fn seeded_story(store: &StoryStore) -> i64 {
        let story = store.create_story("Test", None).unwrap();
        store
            .create_bible_element(NewBibleElement {
                story_id: story.id,
                element_type: "character".into(),
                name: "Eldra".into(),
                content: "{\"role\": \"mentor\"}".into(),
                version: None,
            })
            .unwrap();
        store
            .create_bible_element(NewBibleElement {
                story_id: story.id,
                element_type: "location".into(),
                name: "The Sunken Court".into(),
                content: "{\"description\": \"drowned\"}".into(),
                version: None,
            })
            .unwrap();
        story.id
    }

    fn test_store() -> (StoryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = StoryStore::open(dir.path().join("storyloom.db")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_catalog_and_chapter_sentinel() {
        let (store, _dir) = test_store();
        let story_id = seeded_story(&store);

        let ctx = assemble(&store, story_id, None).unwrap();
        assert!(ctx.catalog.contains("Eldra (character)"));
        assert!(ctx.catalog.contains("The Sunken Court (location)"));
        assert_eq!(ctx.previous_chapter, NO_PRIOR_CHAPTERS);
        assert!(ctx.relevant_content.is_empty());
    }

    #[test]
    fn test_previous_chapter_is_highest_order() {
        let (store, _dir) = test_store();
        let story_id = seeded_story(&store);
        for (order, content) in [(1, "first"), (3, "latest"), (2, "middle")] {
            store
                .create_chapter(NewChapter {
                    story_id,
                    order,
                    title: format!("Chapter {}", order),
                    content: content.into(),
                    version: None,
                })
                .unwrap();
        }

        let ctx = assemble(&store, story_id, None).unwrap();
        assert_eq!(ctx.previous_chapter, "latest");
        assert_eq!(ctx.chapter_list, "1. Chapter 1\n2. Chapter 2\n3. Chapter 3");
    }

    #[test]
    fn test_relevance_filter_is_case_insensitive_and_keeps_settings() {
        let (store, _dir) = test_store();
        let story_id = seeded_story(&store);

        let relevance = vec!["eldra".to_string()];
        let ctx = assemble(&store, story_id, Some(&relevance)).unwrap();

        assert!(ctx.relevant_content.contains("## Eldra (character)"));
        assert!(ctx.relevant_content.contains("## Story Settings (story_settings)"));
        assert!(!ctx.relevant_content.contains("Sunken Court"));
    }
}
