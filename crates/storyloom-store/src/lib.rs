//! Storyloom Store — SQLite persistence for stories, bible elements,
//! chapters, append-only version history, and global settings.

pub mod defaults;
pub mod schema;
pub mod settings;
pub mod store;
pub mod types;

pub use store::StoryStore;
pub use types::*;
