use futures::{Stream, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use super::configs::OllamaProviderConfig;
use crate::errors::{BackendError, BackendResult};
use crate::models::frame::Frame;
use crate::models::message::ChatMessage;
use crate::protocol::extract::BackendChunk;
use crate::protocol::ndjson;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "qwen3";

#[derive(Serialize)]
struct ChatPayload<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> BackendResult<Self> {
        // Generations can run for minutes, so only the connect phase is bounded
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(BackendError::Connect)?;

        Ok(Self { client, config })
    }

    /// The model used when a request does not name one
    pub fn default_model(&self) -> &str {
        &self.config.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }

    /// Start a streaming chat completion.
    ///
    /// Returns once the backend has answered with a success status; the body has not been
    /// read yet. Connection failures and error statuses are reported here, before any
    /// streaming starts.
    pub async fn stream_chat(&self, model: &str, messages: &[ChatMessage]) -> BackendResult<Response> {
        let payload = ChatPayload {
            model,
            messages,
            stream: true,
        };

        let response = self
            .client
            .post(self.url("/api/chat"))
            .json(&payload)
            .send()
            .await
            .map_err(BackendError::Connect)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(model, messages = messages.len(), "Backend stream opened");
        Ok(response)
    }

    /// List the models installed on the backend
    pub async fn list_models(&self) -> BackendResult<Vec<String>> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(BackendError::Connect)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let tags: TagsResponse = response.json().await.map_err(BackendError::Decode)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// Decode a streaming chat response body into extracted frames, in arrival order
pub fn frames(response: Response) -> impl Stream<Item = Result<Frame, reqwest::Error>> + Send {
    ndjson::decode_stream::<BackendChunk, _, _>(response.bytes_stream()).map(|chunk| chunk.map(Frame::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Role;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(host: String) -> OllamaProvider {
        OllamaProvider::new(OllamaProviderConfig {
            host,
            model: OLLAMA_MODEL.to_string(),
            connect_timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    fn hello() -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: Role::User,
            content: "Hello?".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_stream_chat_sends_streaming_payload() {
        let mock_server = MockServer::start().await;
        let body = concat!(
            "{\"message\":{\"role\":\"assistant\",\"thinking\":\"Let\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Hi!\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_json(json!({
                "model": "llama3",
                "messages": [{"role": "user", "content": "Hello?"}],
                "stream": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
            .mount(&mock_server)
            .await;

        let provider = provider_for(mock_server.uri());
        let response = provider.stream_chat("llama3", &hello()).await.unwrap();
        let frames: Vec<Frame> = frames(response).map(|f| f.unwrap()).collect().await;

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].thinking.as_deref(), Some("Let"));
        assert_eq!(frames[1].content.as_deref(), Some("Hi!"));
        assert!(frames[2].done);
        assert_eq!(frames[2].fragment(), None);
    }

    #[tokio::test]
    async fn test_stream_chat_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("{\"error\":\"model not found\"}"),
            )
            .mount(&mock_server)
            .await;

        let provider = provider_for(mock_server.uri());
        let err = provider.stream_chat("missing", &hello()).await.unwrap_err();

        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("model not found"));
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stream_chat_connection_refused() {
        let provider = provider_for("http://127.0.0.1:1".to_string());
        let err = provider.stream_chat(OLLAMA_MODEL, &hello()).await.unwrap_err();
        assert!(matches!(err, BackendError::Connect(_)));
    }

    #[tokio::test]
    async fn test_list_models() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [
                    {"name": "qwen3:latest", "size": 1},
                    {"name": "llama3.2:latest", "size": 2}
                ]
            })))
            .mount(&mock_server)
            .await;

        let provider = provider_for(format!("{}/", mock_server.uri()));
        let models = provider.list_models().await.unwrap();
        assert_eq!(models, vec!["qwen3:latest", "llama3.2:latest"]);
    }
}
