//! Hosted provider — Together-style streaming chat completions.
//!
//! Fragments arrive as SSE `data:` lines; the adapter concatenates them in
//! arrival order into one final string. A stream that ends without yielding
//! any fragment is an empty completion, not a failure.

use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendError, HostedBackendConfig};

/// Upper bound on generated tokens per letter.
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Outcome of parsing one SSE line.
#[derive(Debug, PartialEq)]
enum SseLine {
    /// A content fragment. Empty for role-only and usage chunks.
    Fragment(String),
    /// The `data: [DONE]` terminator.
    Done,
    /// Blank lines, comments, and non-data fields.
    Ignored,
}

fn parse_sse_line(line: &str) -> Result<SseLine, BackendError> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Ignored);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }
    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| BackendError::Malformed(format!("stream chunk: {e}")))?;
    let fragment = chunk
        .choices
        .first()
        .and_then(|c| c.delta.content.clone())
        .unwrap_or_default();
    Ok(SseLine::Fragment(fragment))
}

/// Streams one chat completion and returns the concatenated fragments.
pub(super) async fn generate_streaming(
    http: &Client,
    config: &HostedBackendConfig,
    model: &str,
    prompt: &str,
) -> Result<String, BackendError> {
    let body = ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        stream: true,
        max_tokens: MAX_TOKENS,
    };

    let response = http
        .post(format!("{}/chat/completions", config.endpoint))
        .bearer_auth(&config.api_key)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();
    let mut letter = String::new();

    'receive: while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.extend_from_slice(&chunk);

        // Lines can span transport chunks; only complete lines are parsed.
        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            let line = std::str::from_utf8(&line)
                .map_err(|e| BackendError::Malformed(format!("non-UTF-8 stream data: {e}")))?;
            match parse_sse_line(line)? {
                SseLine::Fragment(fragment) => letter.push_str(&fragment),
                SseLine::Done => break 'receive,
                SseLine::Ignored => {}
            }
        }
    }

    debug!("Hosted generation streamed {} chars", letter.len());
    Ok(letter)
}
