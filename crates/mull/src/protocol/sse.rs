//! Server-Sent Events framing for fragments
//!
//! Every event is a single `data:` line followed by a blank line. The stream closes with
//! a literal `[DONE]` payload when the backend reported completion:
//!
//! ```text
//! data: {"thinking":"Let"}
//!
//! data: {"content":"Hi!"}
//!
//! data: [DONE]
//!
//! ```
//!
//! `[DONE]` is not JSON, so the decoder compares it as a string before decoding.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};

use super::json::parse_or_skip;
use crate::models::frame::Fragment;

pub const DONE_SENTINEL: &str = "[DONE]";
pub const DONE_EVENT: &str = "data: [DONE]\n\n";

/// Encode one fragment as an SSE event
pub fn encode(fragment: &Fragment) -> String {
    // Serializing a struct of optional strings cannot fail
    let json = serde_json::to_string(fragment).unwrap_or_else(|_| String::from("{}"));
    format!("data: {}\n\n", json)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Fragment(Fragment),
    Done,
}

/// Incremental SSE decoder
///
/// Once `Done` has been yielded the decoder ignores everything that follows.
#[derive(Debug, Default)]
pub struct SseDecoder {
    carry: BytesMut,
    data: Option<String>,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one chunk and decode every event it completes, in order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        if self.finished {
            return Vec::new();
        }

        let searched = self.carry.len();
        self.carry.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut from = searched;
        while let Some(offset) = self.carry[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset;
            let line = self.carry.split_to(end + 1);
            from = 0;

            let line = line[..end].strip_suffix(b"\r").unwrap_or(&line[..end]);
            if let Some(event) = self.process_line(line) {
                let done = event == SseEvent::Done;
                events.push(event);
                if done {
                    self.finished = true;
                    self.carry.clear();
                    break;
                }
            }
        }
        events
    }

    fn process_line(&mut self, line: &[u8]) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }

        // Comments and fields other than data carry nothing for us
        let value = line.strip_prefix(b"data:")?;
        let value = value.strip_prefix(b" ").unwrap_or(value);
        let value = String::from_utf8_lossy(value);

        match &mut self.data {
            Some(data) => {
                data.push('\n');
                data.push_str(&value);
            }
            None => self.data = Some(value.into_owned()),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let data = self.data.take()?;
        let payload = data.trim();
        if payload == DONE_SENTINEL {
            return Some(SseEvent::Done);
        }
        parse_or_skip::<Fragment>(payload.as_bytes()).map(SseEvent::Fragment)
    }
}

/// Decode a fallible byte stream into a stream of events.
///
/// The stream ends after `Done`, on a transport error (yielded as an item), or at EOF.
pub fn decode_stream<E, S>(bytes: S) -> impl Stream<Item = Result<SseEvent, E>> + Send
where
    E: Send + 'static,
    S: Stream<Item = Result<Bytes, E>> + Send,
{
    async_stream::stream! {
        let mut decoder = SseDecoder::new();
        let mut bytes = std::pin::pin!(bytes);

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for event in decoder.push(&chunk) {
                        yield Ok(event);
                    }
                    if decoder.is_finished() {
                        return;
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    }
}
