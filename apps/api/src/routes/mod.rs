pub mod health;

use axum::{
    routing::{get, put},
    Router,
};

use crate::listings::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/listings", get(handlers::handle_get_listings))
        .route(
            "/api/v1/listings/preview",
            get(handlers::handle_get_listings_preview),
        )
        .route("/api/v1/preferences", put(handlers::handle_put_preference))
        .with_state(state)
}
