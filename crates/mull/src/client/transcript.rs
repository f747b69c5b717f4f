use std::sync::Arc;

use tokio::sync::watch;

use crate::errors::ClientError;
use crate::models::message::Message;
use crate::protocol::sse::SseEvent;

pub use crate::models::message::ERROR_MARKER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    Streaming,
    Settled,
    Cancelled,
}

impl TurnState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TurnState::Settled | TurnState::Cancelled)
    }
}

/// An immutable view of the whole transcript, republished after every change
#[derive(Debug, Clone)]
pub struct Snapshot {
    settled: Arc<[Message]>,
    draft: Option<Message>,
    state: TurnState,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            settled: Arc::from(Vec::new()),
            draft: None,
            state: TurnState::Idle,
        }
    }
}

impl Snapshot {
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.settled.iter().chain(self.draft.iter())
    }

    pub fn len(&self) -> usize {
        self.settled.len() + usize::from(self.draft.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The assistant message being streamed, if a turn is underway or just ended
    pub fn draft(&self) -> Option<&Message> {
        self.draft.as_ref()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }
}

/// Folds decoded events of one turn into its draft message.
///
/// The draft is replaced with a new value for every fragment, so the text in each
/// channel only ever grows. Once the turn reaches a terminal state nothing more is applied.
pub struct TranscriptReducer<'a> {
    settled: Arc<[Message]>,
    draft: Message,
    state: TurnState,
    publisher: &'a watch::Sender<Snapshot>,
}

impl<'a> TranscriptReducer<'a> {
    pub fn new(settled: Arc<[Message]>, publisher: &'a watch::Sender<Snapshot>) -> Self {
        Self {
            settled,
            draft: Message::assistant(),
            state: TurnState::Idle,
            publisher,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn draft(&self) -> &Message {
        &self.draft
    }

    /// Open the draft slot and start accepting events
    pub fn begin(&mut self) {
        if self.state == TurnState::Idle {
            self.transition(TurnState::Streaming);
        }
    }

    pub fn apply(&mut self, event: SseEvent) {
        if self.state != TurnState::Streaming {
            return;
        }
        match event {
            SseEvent::Fragment(fragment) => {
                self.draft = self.draft.with_fragment(&fragment);
                self.publish();
            }
            SseEvent::Done => self.transition(TurnState::Settled),
        }
    }

    /// The relay closed the stream without a completion event; EOF ends the turn normally
    pub fn end_of_stream(&mut self) {
        if self.state == TurnState::Streaming {
            self.transition(TurnState::Settled);
        }
    }

    /// Stop consuming. Text already applied stays.
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            tracing::debug!("Turn cancelled");
            self.transition(TurnState::Cancelled);
        }
    }

    /// Record a failure inline in the draft and settle the turn
    pub fn fail(&mut self, error: &ClientError) {
        if self.state.is_terminal() {
            return;
        }
        tracing::error!("Chat turn failed: {}", error);
        self.draft = self.draft.clone().with_text(ERROR_MARKER);
        self.transition(TurnState::Settled);
    }

    /// Consume the reducer, returning the message to commit (if any) and the final state
    pub fn finish(self) -> (Option<Message>, TurnState) {
        let keep = match self.state {
            TurnState::Idle => false,
            TurnState::Cancelled => !self.draft.is_empty(),
            TurnState::Streaming | TurnState::Settled => true,
        };
        (keep.then_some(self.draft), self.state)
    }

    fn transition(&mut self, state: TurnState) {
        self.state = state;
        self.publish();
    }

    fn publish(&self) {
        let draft = match self.state {
            TurnState::Idle => None,
            TurnState::Cancelled if self.draft.is_empty() => None,
            _ => Some(self.draft.clone()),
        };
        self.publisher.send_replace(Snapshot {
            settled: self.settled.clone(),
            draft,
            state: self.state,
        });
    }
}
