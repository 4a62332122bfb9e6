use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::rest::{admin, detect, health, humanize, usage};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Any-origin service; auth rides in request bodies, never in cookies.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/detect-ai", post(detect::detect_ai))
        .route("/humanize", post(humanize::humanize_text))
        .route("/update-limit", post(admin::update_limit))
        .route("/user-usage/{user_id}", get(usage::user_usage))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
