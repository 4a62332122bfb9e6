use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiErrorResponse};
use crate::metering::{self, UsageSnapshot};
use crate::state::AppState;
use rd_provider::DetectionReport;

#[derive(Debug, Deserialize)]
pub struct DetectAiRequest {
    pub text: String,
    pub user_id: String,
}

/// The detection service's report passed through verbatim, with this
/// service's usage figures nested alongside.
#[derive(Debug, Serialize)]
pub struct DetectAiResponse {
    #[serde(flatten)]
    pub report: DetectionReport,
    pub usage_info: UsageSnapshot,
}

pub async fn detect_ai(
    State(state): State<AppState>,
    Json(body): Json<DetectAiRequest>,
) -> Result<Json<DetectAiResponse>, ApiErrorResponse> {
    let cost = metering::admit(&state, &body.user_id, &body.text)?;

    let report = state.models.detect(&body.text).await.map_err(|e| {
        tracing::warn!("Detection call failed for {}: {e}", body.user_id);
        ApiErrorResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::provider(&e),
        }
    })?;

    let record = metering::settle(&state, &body.user_id, cost)?;

    Ok(Json(DetectAiResponse {
        report,
        usage_info: UsageSnapshot::for_charge(cost, &record),
    }))
}
