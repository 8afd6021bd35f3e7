//! Server-sent-event decoding for the status feed.
//!
//! Buffers incoming byte chunks, splits on newlines, and parses `data:` lines
//! as JSON [`StatusEvent`]s:
//!
//! ```text
//! data: {"step":"nsf","status":"Processing","details":"Checking for NSF incidents"}
//!
//! data: {"step":"nsf","status":"Complete","details":"NSF analysis complete"}
//! ```
//!
//! A line that fails to decode is logged and dropped; the stream stays open.
//! A transport-level read error ends the stream. Reconnecting is not this
//! layer's job.

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use tracing::warn;

use super::event::StatusEvent;

/// Internal state of the SSE byte-stream parser.
struct SseParserState {
    inner: Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>,
    buffer: String,
    pending: VecDeque<StatusEvent>,
}

/// Parses a raw byte stream (from a reqwest response) into status events.
pub(crate) fn event_stream<S>(byte_stream: S) -> impl Stream<Item = StatusEvent> + Send
where
    S: Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
{
    let state = SseParserState {
        inner: Box::pin(byte_stream),
        buffer: String::new(),
        pending: VecDeque::new(),
    };

    futures_util::stream::unfold(state, |mut state| async move {
        if let Some(event) = state.pending.pop_front() {
            return Some((event, state));
        }

        loop {
            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.push_str(&String::from_utf8_lossy(&chunk));

                    while let Some(pos) = state.buffer.find('\n') {
                        let line = state.buffer[..pos].to_string();
                        state.buffer = state.buffer[pos + 1..].to_string();

                        match parse_status_line(&line) {
                            Some(Ok(event)) => state.pending.push_back(event),
                            Some(Err(e)) => {
                                // Tolerated per-message error: drop and move on.
                                warn!("Dropping undecodable status event: {e} (line: {line})");
                            }
                            None => {}
                        }
                    }

                    if let Some(event) = state.pending.pop_front() {
                        return Some((event, state));
                    }
                }
                Some(Err(e)) => {
                    // Fatal to the stream only, never to the pipeline.
                    warn!("Status stream read error, closing feed: {e}");
                    return None;
                }
                None => {
                    if !state.buffer.is_empty() {
                        let remaining = std::mem::take(&mut state.buffer);
                        if let Some(Ok(event)) = parse_status_line(&remaining) {
                            return Some((event, state));
                        }
                    }
                    return None;
                }
            }
        }
    })
}

/// Parses a single SSE line.
///
/// Returns `None` for empty lines, comments, and non-`data:` fields;
/// `Some(Err(...))` for a `data:` payload with invalid JSON.
fn parse_status_line(line: &str) -> Option<Result<StatusEvent, serde_json::Error>> {
    let trimmed = line.trim();

    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }

    trimmed
        .strip_prefix("data:")
        .map(|data| serde_json::from_str::<StatusEvent>(data.trim_start()))
}
