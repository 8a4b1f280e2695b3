//! Shared application state.

use storyloom_core::StoryloomConfig;
use storyloom_llm::ChatGateway;
use storyloom_store::{defaults, StoryStore};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: StoryloomConfig,
    pub store: StoryStore,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: StoryloomConfig, store: StoryStore) -> Self {
        Self {
            config,
            store,
            client: reqwest::Client::new(),
        }
    }

    /// Build a gateway against the currently configured endpoint. Settings
    /// are re-read per call so a `POST /settings/llm_url` takes effect
    /// immediately; absent or unparsable values fall back to the defaults.
    pub fn gateway(&self) -> ChatGateway {
        let url = self
            .setting_string("llm_url")
            .filter(|u| reqwest::Url::parse(u).is_ok())
            .unwrap_or_else(|| defaults::DEFAULT_CHAT_URL.to_string());
        let model = self
            .setting_string("llm_model")
            .unwrap_or_else(|| defaults::DEFAULT_CHAT_MODEL.to_string());
        ChatGateway::new(self.client.clone(), url, model)
    }

    /// The system prompt sent with every gateway request.
    pub fn system_prompt(&self) -> String {
        self.setting_string("system_prompt")
            .unwrap_or_else(|| defaults::DEFAULT_SYSTEM_PROMPT.to_string())
    }

    fn setting_string(&self, key: &str) -> Option<String> {
        self.store
            .get_setting(key)
            .ok()
            .flatten()
            .and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}
