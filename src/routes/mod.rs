//! Router assembly: admin HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::anthropic::TextGenerator;
use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - health + credential probe
/// - single and batch generation under `/api/v1/admin/challenges`
/// - read access to stored challenges
/// - CORS (allow any origin/method/headers); the admin surface is expected behind a gateway
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router<G: TextGenerator + 'static>(state: Arc<AppState<G>>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::http_health::<G>))
        .route("/api/v1/admin/credential", get(http::http_validate_credential::<G>))
        .route("/api/v1/admin/challenges", get(http::http_list_challenges::<G>))
        .route("/api/v1/admin/challenges/generate", post(http::http_generate_one::<G>))
        .route("/api/v1/admin/challenges/batch", post(http::http_generate_batch::<G>))
        .route("/api/v1/admin/challenges/:id", get(http::http_get_challenge::<G>))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
