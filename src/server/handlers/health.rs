use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// Readiness plus generation-backend reachability. An unreachable backend
/// does not fail the check: answers degrade to the templated fallback.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pipeline = state.rag.get();
    let generator = state.rag.generator();
    let reachable = match generator.health_check().await {
        Ok(reachable) => reachable,
        Err(err) => {
            tracing::warn!("Generation health check failed: {}", err);
            false
        }
    };

    Json(json!({
        "status": "ok",
        "initialized": pipeline.is_some(),
        "employees": pipeline.map(|p| p.employee_count()).unwrap_or(0),
        "generation": {
            "provider": generator.name(),
            "reachable": reachable,
        },
    }))
}
