use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiErrorResponse};
use crate::metering;
use crate::state::AppState;
use rd_provider::polish;

#[derive(Debug, Deserialize)]
pub struct HumanizeRequest {
    pub text: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct HumanizeResponse {
    pub original_text: String,
    pub humanized_text: String,
    pub sentences: Vec<String>,
    pub humanized_sentences: Vec<String>,
    pub word_count: i64,
    pub total_usage: i64,
    pub usage_limit: i64,
    pub remaining_usage: i64,
}

pub async fn humanize_text(
    State(state): State<AppState>,
    Json(body): Json<HumanizeRequest>,
) -> Result<Json<HumanizeResponse>, ApiErrorResponse> {
    let cost = metering::admit(&state, &body.user_id, &body.text)?;

    let paraphrased = state.models.paraphrase(&body.text).await.map_err(|e| {
        tracing::warn!("Paraphrase call failed for {}: {e}", body.user_id);
        ApiErrorResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::provider(&e),
        }
    })?;

    let sentences: Vec<String> = paraphrased.iter().map(|p| p.sentence.clone()).collect();
    let humanized_sentences = polish::rewrite_sentences(&paraphrased);
    let humanized_text = humanized_sentences.join(" ");

    let record = metering::settle(&state, &body.user_id, cost)?;

    Ok(Json(HumanizeResponse {
        original_text: body.text,
        humanized_text,
        sentences,
        humanized_sentences,
        word_count: cost,
        total_usage: record.consumed,
        usage_limit: record.limit,
        remaining_usage: record.remaining(),
    }))
}
