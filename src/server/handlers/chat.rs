use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::rag::QueryAnswer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub query: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatQuery>,
) -> Result<Json<QueryAnswer>, ApiError> {
    if payload.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".to_string()));
    }

    let pipeline = state.rag.pipeline().await.map_err(|err| {
        tracing::error!("RAG pipeline unavailable: {}", err);
        ApiError::ServiceUnavailable
    })?;

    Ok(Json(pipeline.answer(&payload.query).await))
}
