use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::error::ApiErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserUsageResponse {
    pub user_id: String,
    pub word_count: i64,
    pub token_usage: i64,
    pub usage_limit: i64,
    pub remaining_usage: i64,
    pub usage_percentage: f64,
}

/// Read-only usage lookup. Unknown users get a 404 rather than a
/// lazily created record.
pub async fn user_usage(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserUsageResponse>, ApiErrorResponse> {
    let record = state.usage.read(&user_id)?;

    Ok(Json(UserUsageResponse {
        usage_percentage: record.usage_percentage(),
        remaining_usage: record.remaining(),
        user_id: record.user_id,
        word_count: record.word_count,
        token_usage: record.consumed,
        usage_limit: record.limit,
    }))
}
