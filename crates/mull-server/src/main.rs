mod configuration;
mod error;
mod routes;
mod state;

use mull::providers::ollama::OllamaProvider;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = configuration::Settings::new()?;
    let addr = settings.server.socket_addr()?;

    let backend = OllamaProvider::new(settings.backend.into_config())?;
    info!(
        backend_model = backend.default_model(),
        "Relaying to model backend"
    );

    // Create app state and router
    let state = state::AppState::new(backend);
    let app = routes::configure(state);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
