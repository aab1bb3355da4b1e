//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Checkout
        .route(
            "/checkout",
            post(handlers::create_checkout).get(handlers::checkout_method_not_allowed),
        )
        .route("/checkout-success", get(handlers::checkout_success))
        // Session
        .route("/session", get(handlers::get_session))
        // Chat
        .route("/chat", post(handlers::chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the router with a permissive CORS layer
pub fn create_router_with_cors(state: AppState) -> Router {
    create_router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
