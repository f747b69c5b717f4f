use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mull::errors::BackendError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Backend stream failed: {0}")]
    Upstream(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
