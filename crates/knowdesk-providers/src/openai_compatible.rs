//! Unified OpenAI-compatible streaming provider.
//!
//! A single struct that handles streamed chat completions for all
//! OpenAI-compatible APIs. The upstream SSE byte stream is parsed
//! incrementally; one malformed line never aborts the stream, while a
//! connection-level failure is terminal for the turn.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::json;

use knowdesk_core::config::LlmConfig;
use knowdesk_core::error::{KnowDeskError, Result};
use knowdesk_core::traits::{Provider, UpstreamStream};
use knowdesk_core::types::{GenerateParams, Message, UpstreamEvent};

/// A unified provider that works with any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    /// Provider name for logging (derived from the endpoint host).
    name: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Base URL for the API (e.g. "https://open.bigmodel.cn/api/paas/v4").
    base_url: String,
    /// Path for chat completions.
    chat_path: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from the `[llm]` config section. The API key resolves from
    /// config first, then environment.
    pub fn from_config(cfg: &LlmConfig) -> Self {
        let base_url = cfg.endpoint.trim_end_matches('/').to_string();
        let name = base_url
            .split("//")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .unwrap_or("upstream")
            .to_string();
        Self {
            name,
            api_key: cfg.resolve_api_key(),
            base_url,
            chat_path: "/chat/completions".to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat_stream(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> Result<UpstreamStream> {
        if self.api_key.is_empty() {
            return Err(KnowDeskError::ApiKeyMissing(self.name.clone()));
        }

        let body = json!({
            "model": params.model,
            "messages": messages,
            "stream": true,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let url = format!("{}{}", self.base_url, self.chat_path);
        let request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body);
        let name = self.name.clone();

        let stream = async_stream::stream! {
            let resp = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!("{name} connection failed ({url}): {e}");
                    yield UpstreamEvent::Error(format!("{name} connection failed: {e}"));
                    return;
                }
            };

            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                tracing::error!("{name} API error {status}: {text}");
                yield UpstreamEvent::Error(format!("{name} API error {status}"));
                return;
            }

            let mut bytes = resp.bytes_stream();
            // byte buffer: SSE lines can split anywhere, including inside a
            // multi-byte UTF-8 sequence
            let mut buf: Vec<u8> = Vec::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::error!("{name} stream error: {e}");
                        yield UpstreamEvent::Error(format!("{name} stream error: {e}"));
                        return;
                    }
                };
                buf.extend_from_slice(&chunk);
                for line in drain_lines(&mut buf) {
                    match parse_sse_line(&line) {
                        Some(SseLine::Delta(d)) if !d.is_empty() => {
                            yield UpstreamEvent::Delta(d);
                        }
                        Some(SseLine::Done) => {
                            yield UpstreamEvent::Done;
                            return;
                        }
                        // malformed or contentless lines are skipped
                        _ => {}
                    }
                }
            }

            // trailing line without a newline, then normal completion
            if let Some(SseLine::Delta(d)) =
                parse_sse_line(&String::from_utf8_lossy(&buf))
            {
                if !d.is_empty() {
                    yield UpstreamEvent::Delta(d);
                }
            }
            yield UpstreamEvent::Done;
        };

        Ok(Box::pin(stream))
    }
}

/// One recognized SSE payload line.
#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    Delta(String),
    Done,
}

/// Drain complete lines out of the byte buffer, leaving any partial tail.
fn drain_lines(buf: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buf.drain(..=pos).collect();
        lines.push(String::from_utf8_lossy(&line).trim_end().to_string());
    }
    lines
}

/// Parse one SSE line. `None` means the line carries nothing usable —
/// comments, blank keep-alives, and malformed JSON are all skipped.
fn parse_sse_line(line: &str) -> Option<SseLine> {
    let data = line.trim().strip_prefix("data: ")?;
    if data == "[DONE]" {
        return Some(SseLine::Done);
    }
    let json: serde_json::Value = serde_json::from_str(data).ok()?;
    let delta = json["choices"][0]["delta"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string();
    Some(SseLine::Delta(delta))
}
