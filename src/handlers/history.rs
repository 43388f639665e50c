use axum::{extract::State, response::Json};
use common::ChatHistoryDto;
use tracing::instrument;

use crate::error::ApiError;
use crate::schemas::AppState;

/// Previously asked questions and their SQL, newest first
#[utoipa::path(
    get,
    path = "/api/history",
    tag = "chat",
    responses(
        (status = 200, description = "Chat history", body = Vec<ChatHistoryDto>),
        (status = 500, description = "Query failed", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatHistoryDto>>, ApiError> {
    let history = state
        .repo
        .chat_history()
        .await
        .map_err(ApiError::from_compute("Error fetching chat history"))?;
    Ok(Json(history))
}
