//! Seed values for the settings store.

use serde_json::{json, Value};

/// Fallback chat-completion endpoint when `llm_url` is unset or unparsable.
pub const DEFAULT_CHAT_URL: &str = "http://localhost:1234/v1/chat/completions";

/// Model identifier sent in request bodies when `llm_model` is unset.
pub const DEFAULT_CHAT_MODEL: &str = "local-model";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a creative writing assistant \
for long-form fiction. Stay faithful to the story bible, keep continuity with \
prior chapters, and match the story's established tone.";

/// Genre pick-list.
pub fn default_genres() -> Value {
    json!([
        "Action",
        "Adventure",
        "Comedy",
        "Crime",
        "Drama",
        "Fantasy",
        "Historical",
        "Horror",
        "Mystery",
        "Romance",
        "Sci-Fi",
        "Thriller",
        "Western"
    ])
}

/// Tone pick-list.
pub fn default_tones() -> Value {
    json!([
        "Dark",
        "Lighthearted",
        "Serious",
        "Humorous",
        "Optimistic",
        "Pessimistic",
        "Suspenseful",
        "Romantic"
    ])
}

/// Per-type bible schema: field templates the UI renders and the
/// story_settings seeding reads. When a `genres` pick-list is already
/// configured, the genre field carries it as `options`.
pub fn default_bible_schema(genres: Option<&Value>) -> Value {
    let mut genre_field = json!({"key": "genre", "label": "Genre", "type": "array"});
    if let Some(genres) = genres {
        genre_field["options"] = genres.clone();
    }

    json!({
        "story_settings": {
            "name": "Story Settings",
            "fields": [
                {"key": "title_working", "label": "Working Title", "type": "string"},
                {"key": "logline", "label": "Logline", "type": "text"},
                genre_field,
                {"key": "setting_one_liner", "label": "Setting One-liner", "type": "text"},
                {"key": "tone", "label": "Tone", "type": "array"},
                {"key": "themes", "label": "Themes", "type": "array"},
                {"key": "narrative", "label": "Narrative Details", "type": "object", "fields": [
                    {"key": "format", "label": "Format", "type": "string"},
                    {"key": "target_length_words", "label": "Target Length (Words)", "type": "number"},
                    {"key": "pov", "label": "POV", "type": "string"}
                ]}
            ]
        },
        "character": {
            "name": "Character",
            "fields": [
                {"key": "role", "label": "Role", "type": "string"},
                {"key": "goal", "label": "Primary Goal", "type": "text"},
                {"key": "flaws", "label": "Flaws", "type": "array"}
            ]
        },
        "location": {
            "name": "Location",
            "fields": [
                {"key": "description", "label": "Description", "type": "text"},
                {"key": "sights", "label": "Sights", "type": "array"},
                {"key": "smells", "label": "Smells", "type": "array"}
            ]
        }
    })
}
