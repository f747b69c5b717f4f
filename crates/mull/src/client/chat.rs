use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::{Client, Response};
use serde::Deserialize;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::transcript::{TranscriptReducer, TurnState};
use crate::errors::ClientError;
use crate::models::message::{ChatRequest, Message};
use crate::protocol::sse::{self, SseEvent};

pub const RELAY_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub relay_url: String,
    /// Sent with every request; the relay falls back to its own default when absent
    pub model: Option<String>,
    /// Treat a stream that delivers nothing for this long as broken
    pub idle_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: RELAY_URL.to_string(),
            model: None,
            idle_timeout: None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to the relay's `/chat` endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    config: ClientConfig,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Submit the conversation and wait for the relay to accept it.
    ///
    /// A non-success answer is a single JSON error body, never a stream.
    pub async fn open_stream(&self, messages: &[Message]) -> Result<Response, ClientError> {
        let url = format!("{}/chat", self.config.relay_url.trim_end_matches('/'));
        let request = ChatRequest::new(messages, self.config.model.clone());

        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&request)
            .send()
            .await
            .map_err(ClientError::Connect)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Run one turn: open the stream and fold every event into the reducer until the
    /// stream ends, fails, or `cancel` fires.
    ///
    /// Cancellation is observed at every await, so it takes effect before the next chunk is
    /// read. Dropping the response closes the connection to the relay.
    pub async fn stream_turn(
        &self,
        messages: &[Message],
        reducer: &mut TranscriptReducer<'_>,
        cancel: &CancellationToken,
    ) -> TurnState {
        reducer.begin();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                reducer.cancel();
                return reducer.state();
            }
            response = self.open_stream(messages) => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                reducer.fail(&e);
                return reducer.state();
            }
        };

        let events = sse::decode_stream(response.bytes_stream());
        let mut events = std::pin::pin!(events);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    reducer.cancel();
                    break;
                }
                next = self.next_event(&mut events) => next,
            };

            match next {
                Ok(Some(event)) => {
                    let done = event == SseEvent::Done;
                    reducer.apply(event);
                    if done {
                        break;
                    }
                }
                Ok(None) => {
                    reducer.end_of_stream();
                    break;
                }
                Err(e) => {
                    reducer.fail(&e);
                    break;
                }
            }
        }

        reducer.state()
    }

    async fn next_event<S>(&self, events: &mut S) -> Result<Option<SseEvent>, ClientError>
    where
        S: Stream<Item = Result<SseEvent, reqwest::Error>> + Unpin,
    {
        let next = match self.config.idle_timeout {
            Some(idle) => timeout(idle, events.next())
                .await
                .map_err(|_| ClientError::IdleTimeout(idle))?,
            None => events.next().await,
        };
        next.transpose().map_err(ClientError::Read)
    }
}
