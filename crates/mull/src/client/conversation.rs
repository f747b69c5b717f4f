use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::chat::ChatClient;
use super::transcript::{Snapshot, TranscriptReducer, TurnState};
use crate::models::message::Message;

/// An ordered, append-only chat transcript with at most one turn in flight.
///
/// [`Conversation::submit`] borrows the conversation mutably for the whole turn, so a
/// second submission cannot start until the first reaches a terminal state.
pub struct Conversation {
    client: ChatClient,
    messages: Vec<Message>,
    snapshots: watch::Sender<Snapshot>,
}

impl Conversation {
    pub fn new(client: ChatClient) -> Self {
        let (snapshots, _) = watch::channel(Snapshot::default());
        Self {
            client,
            messages: Vec::new(),
            snapshots,
        }
    }

    /// Settled messages, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Receive a snapshot of the transcript after every change
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Send a user message and stream the assistant's reply into the transcript.
    ///
    /// Returns the terminal state of the turn. Failures are not returned: they are shown
    /// inline in the assistant message.
    pub async fn submit<S: Into<String>>(&mut self, text: S, cancel: CancellationToken) -> TurnState {
        self.messages.push(Message::user(text));
        let settled: Arc<[Message]> = self.messages.clone().into();

        let mut reducer = TranscriptReducer::new(settled, &self.snapshots);
        let state = self
            .client
            .stream_turn(&self.messages, &mut reducer, &cancel)
            .await;

        let (reply, _) = reducer.finish();
        if let Some(reply) = reply {
            self.messages.push(reply);
        }
        tracing::debug!(?state, messages = self.messages.len(), "Turn finished");
        state
    }
}
