//! Gateway request and stream types.

use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

/// One message in a chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// A normalized stream item. A consumer always sees zero or more `Token`s
/// followed by exactly one `Done` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Token(String),
    Done,
    Error(String),
}

/// Boxed stream type for returning the gateway's token stream.
pub type TokenStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;
