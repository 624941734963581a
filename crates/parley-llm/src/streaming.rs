use std::collections::VecDeque;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};
use crate::gemini::types::GenerateContentChunk;

/// A streaming sequence of text increments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A text increment (streamed token-by-token).
    Message { content: String },

    /// Streaming completed.
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

/// Parse a server-sent-event response body into stream events.
///
/// The service emits `data: {json}` lines, one generation chunk per line,
/// and signals completion with a `finishReason` on the final chunk rather
/// than a sentinel line.
pub fn parse_sse_stream(response: Response) -> TextStream {
    let stream = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = VecDeque::with_capacity(8192);
        let mut finished = false;

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes);

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        if let Ok(line_str) = std::str::from_utf8(&line_bytes) {
                            let line = line_str.trim();

                            if line.is_empty() {
                                continue;
                            }

                            if let Some(data) = line.strip_prefix("data: ") {
                                match serde_json::from_str::<GenerateContentChunk>(data) {
                                    Ok(chunk) => {
                                        for event in chunk.to_stream_events() {
                                            if matches!(event, StreamEvent::Done { .. }) {
                                                finished = true;
                                            }
                                            yield Ok(event);
                                        }
                                    }
                                    Err(e) => yield Err(LlmError::Stream(format!(
                                        "failed to parse stream chunk: {}",
                                        e
                                    ))),
                                }
                            }
                        }
                    }
                }
                Err(e) => yield Err(LlmError::Http(e)),
            }
        }

        if !finished {
            yield Ok(StreamEvent::Done { finish_reason: None });
        }
    })
}
