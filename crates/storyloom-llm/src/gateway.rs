//! Chat-completion transport against a configurable upstream endpoint.
//!
//! Blocking mode returns the full completion text; streaming mode decodes
//! the upstream SSE line protocol into [`StreamChunk`]s. Every failure in
//! streaming mode is converted into a single terminal `Error` chunk so the
//! consumer never sees an unhandled fault.

use std::time::Duration;

use serde_json::json;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::types::{ChatMessage, StreamChunk, TokenStream};
use storyloom_core::{Error, Result};

pub struct ChatGateway {
    client: reqwest::Client,
    url: String,
    model: String,
}

/// What a single upstream SSE line contributes to the output stream.
#[derive(Debug, PartialEq, Eq)]
enum LineEvent {
    Skip,
    Done,
    Fragment(String),
}

impl ChatGateway {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            model: model.into(),
        }
    }

    fn request_body(&self, system: &str, user: &str, stream: bool) -> serde_json::Value {
        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0.7,
            "stream": stream,
        })
    }

    /// Send a blocking (`stream=false`) request and return the first
    /// choice's message text. Non-200 surfaces as `Error::Upstream` with
    /// the status and body; there is no retry.
    pub async fn complete(&self, system: &str, user: &str, timeout: Duration) -> Result<String> {
        let body = self.request_body(system, user, false);

        let response = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Upstream { status, detail });
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("invalid completion response: {}", e)))?;

        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Http("completion response carried no content".into()))
    }

    /// Send a streaming (`stream=true`) request and emit one `Token` per
    /// upstream delta fragment, in upstream order. The stream always ends
    /// with exactly one `Done` or `Error`; dropping it releases the
    /// upstream connection.
    pub fn stream(&self, system: &str, user: &str) -> TokenStream {
        let client = self.client.clone();
        let url = self.url.clone();
        let body = self.request_body(system, user, true);

        Box::pin(async_stream::stream! {
            let response = match client.post(&url).json(&body).send().await {
                Ok(r) => r,
                Err(e) => {
                    yield StreamChunk::Error(format!("request failed: {}", e));
                    return;
                }
            };

            if !response.status().is_success() {
                // Status only; the body of a failed stream is not read.
                yield StreamChunk::Error(format!(
                    "upstream returned status {}",
                    response.status().as_u16()
                ));
                return;
            }

            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let bytes = match chunk {
                    Ok(b) => b,
                    Err(e) => {
                        yield StreamChunk::Error(format!("stream read error: {}", e));
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                // Process complete SSE lines
                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    match decode_stream_line(&line) {
                        LineEvent::Skip => {}
                        LineEvent::Done => {
                            yield StreamChunk::Done;
                            return;
                        }
                        LineEvent::Fragment(text) => {
                            yield StreamChunk::Token(text);
                        }
                    }
                }
            }

            // Upstream closed without [DONE]: still a clean termination.
            yield StreamChunk::Done;
        })
    }
}

/// Decode one upstream SSE line. Blank lines, comments, and malformed
/// payloads are skipped without affecting the stream.
fn decode_stream_line(line: &str) -> LineEvent {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return LineEvent::Skip;
    }

    let Some(data) = line.strip_prefix("data: ") else {
        return LineEvent::Skip;
    };

    if data.trim() == "[DONE]" {
        return LineEvent::Done;
    }

    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(parsed) => {
            if let Some(content) = parsed["choices"][0]["delta"]["content"].as_str() {
                if !content.is_empty() {
                    return LineEvent::Fragment(content.to_string());
                }
            }
            LineEvent::Skip
        }
        Err(e) => {
            debug!("Skipping malformed stream line: {}", e);
            LineEvent::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_fragment_is_emitted() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#;
        assert_eq!(
            decode_stream_line(line),
            LineEvent::Fragment("Hi".to_string())
        );
    }

    #[test]
    fn test_done_marker_terminates() {
        assert_eq!(decode_stream_line("data: [DONE]"), LineEvent::Done);
    }

    #[test]
    fn test_malformed_payload_is_skipped() {
        assert_eq!(decode_stream_line("data: not-json"), LineEvent::Skip);
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert_eq!(decode_stream_line(""), LineEvent::Skip);
        assert_eq!(decode_stream_line("   "), LineEvent::Skip);
        assert_eq!(decode_stream_line(": keep-alive"), LineEvent::Skip);
        assert_eq!(decode_stream_line("event: ping"), LineEvent::Skip);
    }

    #[test]
    fn test_delta_without_content_is_skipped() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(decode_stream_line(line), LineEvent::Skip);
        let empty = r#"data: {"choices":[{"delta":{"content":""}}]}"#;
        assert_eq!(decode_stream_line(empty), LineEvent::Skip);
    }
}
