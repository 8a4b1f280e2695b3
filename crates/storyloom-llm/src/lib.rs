//! Storyloom LLM — chat-completion transport and response recovery.
//!
//! The gateway talks to one OpenAI-compatible endpoint in two modes:
//! a blocking completion and an incremental token stream normalized from
//! upstream SSE lines. The extractor recovers structured JSON from
//! free-form model output with layered fallbacks and never errors on
//! malformed text.

pub mod extract;
pub mod gateway;
pub mod prompts;
pub mod types;

pub use gateway::ChatGateway;
pub use types::*;
