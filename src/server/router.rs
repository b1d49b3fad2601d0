use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, config, employees, health};
use crate::state::AppState;

/// Creates the application router with CORS and request tracing.
///
/// Routes:
/// - `POST /chat` answers a free-text roster query
/// - `GET /employees/search?query=` returns ranked candidates only
/// - `GET /health` reports readiness
/// - `GET /api/config` returns the redacted configuration
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_allowed_origins);
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/employees/search", get(employees::search_employees))
        .route("/health", get(health::health))
        .route("/api/config", get(config::get_config))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(configured: &[String]) -> CorsLayer {
    let mut origins = header_values(configured);
    if origins.is_empty() {
        origins = header_values(&default_local_origins());
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn header_values(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect()
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost:8501".to_string(),
        "http://127.0.0.1:8501".to_string(),
    ]
}
