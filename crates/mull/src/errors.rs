use std::time::Duration;
use thiserror::Error;

/// Failures talking to the model backend before a stream is opened
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to reach model backend: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("Model backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from model backend: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Failures observed by the chat client while running a turn
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to reach relay: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("Relay returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Stream interrupted: {0}")]
    Read(#[source] reqwest::Error),

    #[error("No data received for {0:?}")]
    IdleTimeout(Duration),
}

pub type BackendResult<T> = Result<T, BackendError>;
