use crate::error::RelayError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::{stream::StreamExt, Stream};
use mull::models::frame::Frame;
use mull::models::message::ChatRequest;
use mull::protocol::sse;
use mull::providers::ollama;
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

// Buffer between the relay task and the response body
const CHANNEL_CAPACITY: usize = 100;

type Chunk = Result<String, RelayError>;

// SSE response body fed by the relay task
pub struct SseResponse {
    rx: ReceiverStream<Chunk>,
}

impl SseResponse {
    fn new(rx: ReceiverStream<Chunk>) -> Self {
        Self { rx }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, RelayError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|chunk| chunk.map(Bytes::from)))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(self),
        )
            .into_response()
    }
}

/// Forward backend frames to the client as SSE events until the backend finishes,
/// fails, or the client goes away.
///
/// Dropping `frames` on return closes the backend connection; dropping `tx` ends the
/// response body.
async fn relay<S, E>(frames: S, tx: mpsc::Sender<Chunk>)
where
    S: Stream<Item = Result<Frame, E>>,
    E: std::fmt::Display,
{
    let mut frames = std::pin::pin!(frames);

    loop {
        let next = tokio::select! {
            _ = tx.closed() => {
                tracing::debug!("Client disconnected, closing backend stream");
                break;
            }
            next = frames.next() => next,
        };

        match next {
            Some(Ok(frame)) => {
                if let Some(fragment) = frame.fragment() {
                    if tx.send(Ok(sse::encode(&fragment))).await.is_err() {
                        tracing::debug!("Client disconnected, closing backend stream");
                        break;
                    }
                }
                if frame.done {
                    let _ = tx.send(Ok(sse::DONE_EVENT.to_string())).await;
                    break;
                }
            }
            Some(Err(e)) => {
                tracing::error!("Backend stream failed: {}", e);
                // Surface as a broken body rather than a clean end of stream
                let _ = tx.send(Err(RelayError::Upstream(e.to_string()))).await;
                break;
            }
            None => {
                // Backend ended without a done frame; EOF is the signal
                tracing::debug!("Backend stream ended without completion");
                break;
            }
        }
    }
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<SseResponse, RelayError> {
    let model = request
        .model
        .unwrap_or_else(|| state.backend.default_model().to_string());

    let response = state
        .backend
        .stream_chat(&model, &request.messages)
        .await
        .map_err(|e| {
            tracing::error!("Failed to start backend stream: {}", e);
            e
        })?;

    tracing::info!(model = %model, messages = request.messages.len(), "Relaying chat stream");

    // Create channel for streaming
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(relay(ollama::frames(response), tx));

    Ok(SseResponse::new(ReceiverStream::new(rx)))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handler))
        .with_state(state)
}
