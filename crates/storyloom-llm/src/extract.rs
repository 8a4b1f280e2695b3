//! Recovery of structured JSON from free-form model output.
//!
//! Model responses are supposed to contain one JSON object but arrive
//! wrapped in prose, fenced code blocks, with sloppy quoting, or with raw
//! control characters inside string values. Extraction runs an ordered
//! fallback chain and always produces a value; it never errors on
//! malformed output. Degraded results carry an operator-facing note.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::warn;

/// The response shape an endpoint expects, selecting the recovery strategy
/// when structural parsing fails.
#[derive(Debug, Clone, Copy)]
pub enum Expectation<'a> {
    /// One JSON object; recovery salvages a `"name"` field.
    Object,
    /// An object holding a string list under `field`; recovery salvages the
    /// quoted items.
    List { field: &'a str },
}

/// Extraction output: the best value obtainable, plus a note when it was
/// recovered rather than parsed.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub value: Value,
    pub degraded: Option<String>,
}

static NAME_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""name"\s*:\s*"([^"]*)""#).unwrap());
static QUOTED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).unwrap());

/// Run the full fallback chain over raw model output.
pub fn extract(raw: &str, expectation: Expectation<'_>) -> Extracted {
    let stripped = strip_code_fence(raw);
    let candidate = brace_slice(stripped).unwrap_or(stripped);

    match lenient_json(candidate) {
        // The contract is one JSON object; anything else goes through
        // recovery so callers always receive an object.
        Ok(value) if value.is_object() => Extracted {
            value,
            degraded: None,
        },
        Ok(other) => {
            warn!("Model output parsed as non-object ({}), recovering", kind_of(&other));
            recover(raw, expectation)
        }
        Err(e) => {
            warn!("Structural parse of model output failed ({}), recovering", e);
            recover(raw, expectation)
        }
    }
}

/// Shape-specific regex recovery, then the terminal failure payload.
fn recover(raw: &str, expectation: Expectation<'_>) -> Extracted {
    match expectation {
        Expectation::List { field } => {
            let items = recover_string_list(raw, field);
            if !items.is_empty() {
                let count = items.len();
                return Extracted {
                    value: json!({ field: items }),
                    degraded: Some(format!(
                        "recovered {} `{}` items by pattern match",
                        count, field
                    )),
                };
            }
        }
        Expectation::Object => {
            if let Some(name) = recover_name(raw) {
                return Extracted {
                    value: json!({ "name": name }),
                    degraded: Some("recovered only a name field".into()),
                };
            }
        }
    }

    Extracted {
        value: json!({
            "error": "model output could not be parsed",
            "raw": raw,
        }),
        degraded: Some("unparsable model output".into()),
    }
}

/// Return the content of the first fenced code block, tolerating an
/// optional language tag after the opening fence. Text without a complete
/// fence passes through unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after_open = &text[open + 3..];
    // The rest of the fence line is a language tag ("json", possibly empty).
    let Some(tag_end) = after_open.find('\n') else {
        return text;
    };
    let inner = &after_open[tag_end + 1..];
    match inner.find("```") {
        Some(close) => &inner[..close],
        None => text,
    }
}

/// Slice from the first `{` to the last `}`, inclusive.
pub fn brace_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse JSON, tolerating raw control characters inside string literals
/// (models routinely emit literal newlines in multi-paragraph values).
pub fn lenient_json(text: &str) -> serde_json::Result<Value> {
    match serde_json::from_str(text) {
        Ok(v) => Ok(v),
        Err(first_err) => {
            let escaped = escape_control_chars_in_strings(text);
            serde_json::from_str(&escaped).map_err(|_| first_err)
        }
    }
}

fn escape_control_chars_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                out.push(c);
                escaped = true;
            }
            '"' => {
                out.push(c);
                in_string = false;
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Pull quoted string items out of the bracketed list following
/// `"field":`, for list-shaped responses that failed to parse.
pub fn recover_string_list(raw: &str, field: &str) -> Vec<String> {
    let list_re = match Regex::new(&format!(
        r#""{}"\s*:\s*\[([^\]]*)\]"#,
        regex::escape(field)
    )) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    let Some(captures) = list_re.captures(raw) else {
        return Vec::new();
    };
    let inner = captures.get(1).map(|m| m.as_str()).unwrap_or("");
    QUOTED_ITEM
        .captures_iter(inner)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Best-effort `"name"` value for object-shaped responses that failed to
/// parse.
pub fn recover_name(raw: &str) -> Option<String> {
    NAME_FIELD
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// When a `description` field decoded as an object or array, render it to
/// one markdown string: keys become headings (deeper nesting, deeper
/// heading level), arrays become bullet lines. Callers only accept scalar
/// text there.
pub fn flatten_description(object: &mut Value) {
    let needs_flattening = object
        .get("description")
        .map(|d| d.is_object() || d.is_array())
        .unwrap_or(false);
    if !needs_flattening {
        return;
    }
    let rendered = render_markdown(&object["description"], 0);
    object["description"] = Value::String(rendered.trim_end().to_string());
}

fn render_markdown(value: &Value, depth: usize) -> String {
    match value {
        Value::Object(map) => {
            let mut out = String::new();
            for (key, val) in map {
                out.push_str(&format!("{} {}\n\n", "#".repeat(depth + 3), key));
                out.push_str(&render_markdown(val, depth + 1));
            }
            out
        }
        Value::Array(items) => {
            let mut out = String::new();
            for item in items {
                out.push_str(&format!("- {}\n", scalar_text(item)));
            }
            out.push('\n');
            out
        }
        scalar => format!("{}\n\n", scalar_text(scalar)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_block_with_trailing_prose() {
        let raw = "Here is the element you asked for:\n```json\n{\"name\": \"Eldra\"}\n```\nLet me know if you want changes.";
        let result = extract(raw, Expectation::Object);
        assert!(result.degraded.is_none());
        assert_eq!(result.value, json!({"name": "Eldra"}));
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n{\"a\": 1}\n```";
        let result = extract(raw, Expectation::Object);
        assert_eq!(result.value, json!({"a": 1}));
    }

    #[test]
    fn test_unterminated_fence_passes_through_to_brace_slice() {
        let raw = "```json\n{\"a\": 2}";
        let result = extract(raw, Expectation::Object);
        assert_eq!(result.value, json!({"a": 2}));
    }

    #[test]
    fn test_brace_slice_through_surrounding_prose() {
        let raw = "Sure! {\"name\": \"Vex\", \"role\": \"smuggler\"} Hope that helps.";
        let result = extract(raw, Expectation::Object);
        assert!(result.degraded.is_none());
        assert_eq!(result.value["role"], "smuggler");
    }

    #[test]
    fn test_literal_newline_inside_string_value() {
        let raw = "{\"description\": \"First paragraph.\nSecond paragraph.\"}";
        let result = extract(raw, Expectation::Object);
        assert!(result.degraded.is_none());
        assert_eq!(
            result.value["description"],
            "First paragraph.\nSecond paragraph."
        );
    }

    #[test]
    fn test_list_fallback_recovers_items() {
        let raw = "The context is {{ broken \"relevant_elements\": [\"A\", \"B\"] and more garbage";
        let result = extract(raw, Expectation::List { field: "relevant_elements" });
        assert!(result.degraded.is_some());
        assert_eq!(result.value["relevant_elements"], json!(["A", "B"]));
    }

    #[test]
    fn test_object_fallback_recovers_name() {
        let raw = "not json at all, but \"name\": \"Mirelle\" appears";
        let result = extract(raw, Expectation::Object);
        assert!(result.degraded.is_some());
        assert_eq!(result.value["name"], "Mirelle");
    }

    #[test]
    fn test_total_garbage_yields_failure_payload() {
        let raw = "the model rambled with no structure whatsoever";
        let result = extract(raw, Expectation::List { field: "relevant_elements" });
        assert!(result.degraded.is_some());
        assert_eq!(result.value["raw"], raw);
        assert!(result.value["error"].is_string());
    }

    #[test]
    fn test_non_object_parse_goes_through_recovery() {
        // Valid JSON, wrong shape: callers must still get an object back.
        let result = extract("\"just a quoted string\"", Expectation::Object);
        assert!(result.degraded.is_some());
        assert!(result.value.is_object());
    }

    #[test]
    fn test_recover_string_list_handles_escaped_quotes() {
        let raw = r#"junk "items": ["plain", "with \"quotes\""] junk"#;
        let items = recover_string_list(raw, "items");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], r#"with \"quotes\""#);
    }

    #[test]
    fn test_flatten_structured_description() {
        let mut object = json!({
            "name": "The Sunken Court",
            "description": {
                "overview": "A drowned throne room.",
                "features": ["coral pillars", "silt banners"],
                "history": {"founding": "Built before the flood."}
            }
        });
        flatten_description(&mut object);

        let text = object["description"].as_str().unwrap();
        assert!(text.contains("### overview"));
        assert!(text.contains("A drowned throne room."));
        assert!(text.contains("- coral pillars"));
        assert!(text.contains("#### founding"));
    }

    #[test]
    fn test_flatten_leaves_plain_text_alone() {
        let mut object = json!({"description": "already a string"});
        flatten_description(&mut object);
        assert_eq!(object["description"], "already a string");
    }

    #[test]
    fn test_flatten_array_description() {
        let mut object = json!({"description": ["one", "two"]});
        flatten_description(&mut object);
        let text = object["description"].as_str().unwrap();
        assert_eq!(text, "- one\n- two");
    }
}
