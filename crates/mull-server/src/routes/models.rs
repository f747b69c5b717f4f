use crate::error::RelayError;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct ModelsResponse {
    default: String,
    models: Vec<String>,
}

async fn list_models(State(state): State<AppState>) -> Result<Json<ModelsResponse>, RelayError> {
    let models = state.backend.list_models().await.map_err(|e| {
        tracing::error!("Failed to list backend models: {}", e);
        e
    })?;

    Ok(Json(ModelsResponse {
        default: state.backend.default_model().to_string(),
        models,
    }))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/models", get(list_models))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use mull::providers::{configs::OllamaProviderConfig, ollama::OllamaProvider};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(host: String) -> AppState {
        AppState::new(
            OllamaProvider::new(OllamaProviderConfig {
                host,
                model: "qwen3".to_string(),
                ..Default::default()
            })
            .unwrap(),
        )
    }

    fn get_models() -> Request<Body> {
        Request::builder()
            .uri("/models")
            .method("GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_models() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "qwen3:latest"}, {"name": "deepseek-r1:8b"}]
            })))
            .mount(&backend)
            .await;

        let app = routes(state_for(backend.uri()));
        let response = app.oneshot(get_models()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let response: ModelsResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.default, "qwen3");
        assert_eq!(response.models, vec!["qwen3:latest", "deepseek-r1:8b"]);
    }

    #[tokio::test]
    async fn test_list_models_backend_down() {
        let app = routes(state_for("http://127.0.0.1:1".to_string()));
        let response = app.oneshot(get_models()).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(body["error"].as_str().unwrap().contains("model backend"));
    }
}
