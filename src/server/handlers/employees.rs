use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::roster::Employee;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

/// Ranked candidates without an answer text.
pub async fn search_employees(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    if params.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".to_string()));
    }

    let pipeline = state.rag.pipeline().await.map_err(|err| {
        tracing::error!("RAG pipeline unavailable: {}", err);
        ApiError::ServiceUnavailable
    })?;

    let employees = pipeline.search(&params.query).await.map_err(|err| {
        tracing::error!("Error searching employees: {}", err);
        err
    })?;
    Ok(Json(employees))
}
