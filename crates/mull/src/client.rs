//! The consuming side of the relay: read the SSE stream of a turn and keep the
//! conversation's transcript current while it arrives.
pub mod chat;
pub mod conversation;
pub mod transcript;

pub use chat::{ChatClient, ClientConfig};
pub use conversation::Conversation;
pub use tokio_util::sync::CancellationToken;
pub use transcript::{Snapshot, TranscriptReducer, TurnState, ERROR_MARKER};
