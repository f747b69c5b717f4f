// Export route modules
pub mod chat;
pub mod models;

use crate::state::AppState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

// Function to configure all routes
pub fn configure(state: AppState) -> Router {
    // The chat page is served from elsewhere, so the relay accepts any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(chat::routes(state.clone()))
        .merge(models::routes(state))
        .layer(cors)
}
