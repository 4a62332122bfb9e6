use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::error::{ApiError, ApiErrorResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateLimitRequest {
    pub user_id: String,
    pub credits_to_add: i64,
    pub admin_token: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateLimitResponse {
    pub user_id: String,
    pub old_limit: i64,
    pub credits_added: i64,
    pub new_limit: i64,
    pub current_usage: i64,
    pub message: String,
}

/// Grants (or with a negative delta, claws back) quota for an existing
/// user. Gated on the shared admin secret; never creates records.
pub async fn update_limit(
    State(state): State<AppState>,
    Json(body): Json<UpdateLimitRequest>,
) -> Result<Json<UpdateLimitResponse>, ApiErrorResponse> {
    if !auth::admin_token_matches(&body.admin_token, &state.config.admin_token) {
        return Err(ApiErrorResponse {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::unauthorized(),
        });
    }

    let change = state
        .usage
        .increase_limit(&body.user_id, body.credits_to_add)?;
    let record = change.record;

    tracing::info!(
        "Usage limit for {} adjusted from {} to {}",
        record.user_id,
        change.old_limit,
        record.limit
    );

    Ok(Json(UpdateLimitResponse {
        message: format!(
            "Added {} credits. Usage limit updated from {} to {}",
            body.credits_to_add, change.old_limit, record.limit
        ),
        user_id: record.user_id,
        old_limit: change.old_limit,
        credits_added: body.credits_to_add,
        new_limit: record.limit,
        current_usage: record.consumed,
    }))
}
