//! AI routes — context assembly, LLM generation, response recovery.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use futures::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::StreamExt;

use super::error_response;
use crate::context;
use crate::state::AppState;
use storyloom_llm::extract::{self, Expectation};
use storyloom_llm::{prompts, StreamChunk, TokenStream};

type SseStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

const SMART_CONTEXT_TIMEOUT: Duration = Duration::from_secs(60);
const ANALYZE_TIMEOUT: Duration = Duration::from_secs(60);
const OUTLINE_TIMEOUT: Duration = Duration::from_secs(120);
const PROPOSE_TIMEOUT: Duration = Duration::from_secs(180);

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai/generate-chapter", post(generate_chapter))
        .route("/ai/smart-context", post(smart_context))
        .route("/ai/generate-outline", post(generate_outline))
        .route("/ai/write-chapter-v2", post(write_chapter_v2))
        .route("/ai/analyze-bible-brief", post(analyze_bible_brief))
        .route("/ai/propose-bible-element", post(propose_bible_element))
}

// ---------------------------------------------------------------
// Streaming bridge
// ---------------------------------------------------------------

/// Relay gateway chunks as SSE lines: `data: {"content": …}` per fragment,
/// `data: {"error": …}` once on failure, then close. Dropping the response
/// mid-stream drops the upstream connection with it.
fn relay_stream(llm_stream: TokenStream) -> Sse<SseStream> {
    let sse_stream: SseStream = Box::pin(async_stream::stream! {
        let mut llm_stream = llm_stream;
        while let Some(chunk) = llm_stream.next().await {
            match chunk {
                StreamChunk::Token(text) => {
                    yield Ok(Event::default().data(json!({ "content": text }).to_string()));
                }
                StreamChunk::Done => return,
                StreamChunk::Error(e) => {
                    yield Ok(Event::default().data(json!({ "error": e }).to_string()));
                    return;
                }
            }
        }
    });
    Sse::new(sse_stream)
}

/// A stream that emits a single error event and closes.
fn error_stream(message: String) -> Sse<SseStream> {
    let sse_stream: SseStream = Box::pin(async_stream::stream! {
        yield Ok(Event::default().data(json!({ "error": message }).to_string()));
    });
    Sse::new(sse_stream)
}

// ---------------------------------------------------------------
// Legacy single-shot generation
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct GenerateChapterRequest {
    story_id: i64,
    brief: String,
}

async fn generate_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateChapterRequest>,
) -> Sse<SseStream> {
    let ctx = match context::assemble(&state.store, req.story_id, None) {
        Ok(c) => c,
        Err(e) => return error_stream(e.to_string()),
    };

    let prompt = prompts::generate_chapter(
        &ctx.catalog,
        &ctx.chapter_list,
        &ctx.previous_chapter,
        &req.brief,
    );
    relay_stream(state.gateway().stream(&state.system_prompt(), &prompt))
}

// ---------------------------------------------------------------
// Smart context
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct SmartContextRequest {
    story_id: i64,
    chapter_brief: String,
}

async fn smart_context(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SmartContextRequest>,
) -> impl IntoResponse {
    let ctx = match context::assemble(&state.store, req.story_id, None) {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };

    let prompt = prompts::smart_context(
        &ctx.catalog,
        &ctx.chapter_list,
        &ctx.previous_chapter,
        &req.chapter_brief,
    );

    let raw = match state
        .gateway()
        .complete(&state.system_prompt(), &prompt, SMART_CONTEXT_TIMEOUT)
        .await
    {
        Ok(raw) => raw,
        Err(e) => return error_response(e),
    };

    let extracted = extract::extract(&raw, Expectation::List { field: "relevant_elements" });
    let mut payload = extracted.value;
    if !payload["story_so_far"].is_string() {
        payload["story_so_far"] = json!("");
    }
    if !payload["relevant_elements"].is_array() {
        payload["relevant_elements"] = json!([]);
    }
    if !payload["suggested_new_elements"].is_array() {
        payload["suggested_new_elements"] = json!([]);
    }
    if let Some(note) = extracted.degraded {
        payload["extraction_note"] = json!(note);
    }

    (StatusCode::OK, Json(payload))
}

// ---------------------------------------------------------------
// Outline
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct GenerateOutlineRequest {
    story_id: i64,
    smart_context: Option<Value>,
    chapter_brief: String,
    current_outline: Option<String>,
    comments: Option<String>,
}

async fn generate_outline(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateOutlineRequest>,
) -> impl IntoResponse {
    let prompt = prompts::outline(
        &smart_context_text(req.smart_context.as_ref()),
        &req.chapter_brief,
        req.current_outline.as_deref(),
        req.comments.as_deref(),
    );

    match state
        .gateway()
        .complete(&state.system_prompt(), &prompt, OUTLINE_TIMEOUT)
        .await
    {
        Ok(outline) => (StatusCode::OK, Json(json!({ "outline": outline }))),
        Err(e) => error_response(e),
    }
}

// ---------------------------------------------------------------
// Chapter writing (streaming)
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct WriteChapterRequest {
    story_id: i64,
    smart_context: Option<Value>,
    outline: String,
    current_content: Option<String>,
    comments: Option<String>,
}

async fn write_chapter_v2(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WriteChapterRequest>,
) -> Sse<SseStream> {
    let relevance = relevant_element_names(req.smart_context.as_ref());
    let ctx = match context::assemble(&state.store, req.story_id, Some(&relevance)) {
        Ok(c) => c,
        Err(e) => return error_stream(e.to_string()),
    };

    let prompt = prompts::write_chapter(
        &smart_context_text(req.smart_context.as_ref()),
        &ctx.relevant_content,
        &ctx.previous_chapter,
        &req.outline,
        req.current_content.as_deref(),
        req.comments.as_deref(),
    );
    relay_stream(state.gateway().stream(&state.system_prompt(), &prompt))
}

// ---------------------------------------------------------------
// Bible element assist
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct AnalyzeBriefRequest {
    story_id: i64,
    user_brief: String,
    element_type: String,
}

async fn analyze_bible_brief(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeBriefRequest>,
) -> impl IntoResponse {
    let ctx = match context::assemble(&state.store, req.story_id, None) {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };

    let prompt = prompts::analyze_brief(&ctx.catalog, &req.element_type, &req.user_brief);

    let raw = match state
        .gateway()
        .complete(&state.system_prompt(), &prompt, ANALYZE_TIMEOUT)
        .await
    {
        Ok(raw) => raw,
        Err(e) => return error_response(e),
    };

    let extracted = extract::extract(&raw, Expectation::List { field: "relevant_elements" });
    let mut payload = extracted.value;
    if !payload["relevant_elements"].is_array() {
        payload["relevant_elements"] = json!([]);
    }
    if !payload["reasoning"].is_string() {
        payload["reasoning"] = json!("");
    }
    if let Some(note) = extracted.degraded {
        payload["extraction_note"] = json!(note);
    }

    (StatusCode::OK, Json(payload))
}

#[derive(Deserialize)]
struct ProposeElementRequest {
    story_id: i64,
    user_brief: String,
    element_type: String,
    #[serde(default)]
    relevant_elements: Vec<String>,
}

async fn propose_bible_element(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProposeElementRequest>,
) -> impl IntoResponse {
    let ctx = match context::assemble(&state.store, req.story_id, Some(&req.relevant_elements)) {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };

    let schema_fields = state
        .store
        .get_setting("bible_schema")
        .ok()
        .flatten()
        .and_then(|schema| schema.get(&req.element_type).cloned())
        .map(|section| serde_json::to_string_pretty(&section).unwrap_or_default())
        .unwrap_or_else(|| "(no schema declared for this type)".to_string());

    let prompt = prompts::propose_element(
        &req.element_type,
        &req.user_brief,
        &ctx.relevant_content,
        &schema_fields,
    );

    let raw = match state
        .gateway()
        .complete(&state.system_prompt(), &prompt, PROPOSE_TIMEOUT)
        .await
    {
        Ok(raw) => raw,
        Err(e) => return error_response(e),
    };

    let extracted = extract::extract(&raw, Expectation::Object);
    let payload = shape_proposal(extracted, &req.element_type, &raw);

    (StatusCode::OK, Json(payload))
}

/// Normalize an extracted proposal into the `{name, type, content}` shape
/// the caller expects, degrading field by field.
fn shape_proposal(extracted: extract::Extracted, element_type: &str, raw: &str) -> Value {
    let mut payload = extracted.value;

    if !payload["name"].is_string() {
        payload["name"] = json!(format!("Unnamed {}", element_type));
    }
    if !payload["type"].is_string() {
        payload["type"] = json!(element_type);
    }
    if !payload["content"].is_object() {
        payload["content"] = json!({
            "description": format!(
                "The model response could not be parsed.\n\nRaw response:\n{}",
                raw
            ),
        });
    }

    // Callers render `description` as plain text only.
    extract::flatten_description(&mut payload["content"]);

    if let Some(note) = extracted.degraded {
        payload["extraction_note"] = json!(note);
    }
    payload
}

// ---------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------

/// Render a smart-context object into a prompt section.
fn smart_context_text(value: Option<&Value>) -> String {
    let Some(v) = value else {
        return String::new();
    };
    let mut out = String::new();
    if let Some(summary) = v["story_so_far"].as_str() {
        out.push_str(summary);
        out.push('\n');
    }
    let names = relevant_element_names(Some(v));
    if !names.is_empty() {
        out.push_str(&format!("Relevant elements: {}\n", names.join(", ")));
    }
    if out.is_empty() {
        serde_json::to_string(v).unwrap_or_default()
    } else {
        out
    }
}

fn relevant_element_names(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v["relevant_elements"].as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_proposal_flattens_structured_description() {
        let extracted = extract::extract(
            r#"{"name": "Vex", "type": "character", "content": {"description": {"looks": "wiry", "habits": ["smokes", "lies"]}}}"#,
            Expectation::Object,
        );
        let payload = shape_proposal(extracted, "character", "unused");

        assert_eq!(payload["name"], "Vex");
        let description = payload["content"]["description"].as_str().unwrap();
        assert!(description.contains("### looks"));
        assert!(description.contains("- smokes"));
    }

    #[test]
    fn test_shape_proposal_degrades_to_placeholder() {
        let raw = "no structure here";
        let extracted = extract::extract(raw, Expectation::Object);
        let payload = shape_proposal(extracted, "location", raw);

        assert_eq!(payload["name"], "Unnamed location");
        assert_eq!(payload["type"], "location");
        assert!(payload["content"]["description"]
            .as_str()
            .unwrap()
            .contains(raw));
        assert!(payload["extraction_note"].is_string());
    }

    #[test]
    fn test_smart_context_text_prefers_summary_fields() {
        let v = json!({
            "story_so_far": "The crown is lost.",
            "relevant_elements": ["Eldra", "The Sunken Court"],
        });
        let text = smart_context_text(Some(&v));
        assert!(text.contains("The crown is lost."));
        assert!(text.contains("Relevant elements: Eldra, The Sunken Court"));
    }

    #[test]
    fn test_smart_context_text_falls_back_to_json() {
        let v = json!({"unexpected": true});
        let text = smart_context_text(Some(&v));
        assert!(text.contains("unexpected"));
    }
}
