use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::AppState;
use super::handlers;

/// Build the application router.
///
/// CORS is permissive: the web client is served from a different origin.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Public
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        // Bearer token required
        .route("/balance", get(handlers::balance))
        .route("/account-info", get(handlers::account_info))
        .route("/deposit", post(handlers::deposit))
        .route("/withdraw", post(handlers::withdraw))
        .route("/transactions", get(handlers::transactions));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health_check))
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
