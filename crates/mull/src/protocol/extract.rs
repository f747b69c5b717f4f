//! Channel extraction from backend chat chunks
//!
//! Each NDJSON line from the backend looks like
//! `{"model":"qwen3","message":{"role":"assistant","thinking":"...","content":""},"done":false}`.
//! Only the two text channels and the completion flag matter to the relay; every other
//! field is ignored.

use serde::Deserialize;

use crate::models::frame::Frame;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendChunk {
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<BackendChunk> for Frame {
    fn from(chunk: BackendChunk) -> Self {
        let message = chunk.message.unwrap_or_default();
        Frame {
            thinking: non_empty(message.thinking),
            content: non_empty(message.content),
            done: chunk.done,
        }
    }
}

// The backend pads the idle channel with "" on every line
fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}
