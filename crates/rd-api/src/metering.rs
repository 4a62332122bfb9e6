use axum::http::StatusCode;
use serde::Serialize;

use crate::error::{ApiError, ApiErrorResponse};
use crate::state::AppState;
use rd_quota::guard::{self, Admission, DenyReason};
use rd_quota::{ChargeOutcome, UsageRecord};

/// Usage figures reported alongside every successful transform response.
#[derive(Debug, Serialize)]
pub struct UsageSnapshot {
    pub word_count: i64,
    pub total_usage: i64,
    pub usage_limit: i64,
    pub remaining_usage: i64,
}

impl UsageSnapshot {
    pub fn for_charge(cost: i64, record: &UsageRecord) -> Self {
        Self {
            word_count: cost,
            total_usage: record.consumed,
            usage_limit: record.limit,
            remaining_usage: record.remaining(),
        }
    }
}

pub fn quota_denied(reason: DenyReason, record: &UsageRecord) -> ApiErrorResponse {
    let message = match reason {
        DenyReason::AlreadyExhausted => format!(
            "Usage limit exceeded. Current usage: {}/{}",
            record.consumed, record.limit
        ),
        DenyReason::WouldExceed => format!(
            "Request would exceed usage limit. Current usage: {}/{}",
            record.consumed, record.limit
        ),
    };
    ApiErrorResponse {
        status: StatusCode::FORBIDDEN,
        error: ApiError::quota_exceeded(message, record.consumed, record.limit),
    }
}

/// First half of the metered flow: validates the caller identity, lazily
/// creates the usage record, and refuses the request before any provider
/// spend when quota clearly cannot cover it. Returns the request cost.
pub fn admit(state: &AppState, user_id: &str, text: &str) -> Result<i64, ApiErrorResponse> {
    if user_id.is_empty() {
        return Err(ApiErrorResponse {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::validation("user_id must not be empty"),
        });
    }

    let record = state
        .usage
        .get_or_create(user_id, state.config.default_usage_limit)?;
    let cost = guard::request_cost(text);

    match guard::check(record.consumed, record.limit, cost) {
        Admission::Allow => Ok(cost),
        Admission::Deny(reason) => {
            tracing::debug!(
                "Refusing {} ({:?}) at {}/{}",
                user_id,
                reason,
                record.consumed,
                record.limit
            );
            Err(quota_denied(reason, &record))
        }
    }
}

/// Second half: commits the charge after a provider success. The commit is
/// synchronous, with no await point between the provider call and the
/// ledger update, so a client disconnect cannot cancel a charge the
/// provider already earned. A refusal here means a concurrent request took
/// the headroom since `admit`; the caller discards the provider output.
pub fn settle(state: &AppState, user_id: &str, cost: i64) -> Result<UsageRecord, ApiErrorResponse> {
    match state.usage.try_charge(user_id, cost, cost)? {
        ChargeOutcome::Applied(record) => Ok(record),
        ChargeOutcome::Denied(record) => {
            // The conditional update already refused; a fresh read can only
            // confirm it.
            let reason = match guard::check(record.consumed, record.limit, cost) {
                Admission::Deny(reason) => reason,
                Admission::Allow => DenyReason::AlreadyExhausted,
            };
            tracing::warn!(
                "Post-transform charge refused for {} at {}/{}",
                user_id,
                record.consumed,
                record.limit
            );
            Err(quota_denied(reason, &record))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(consumed: i64, limit: i64) -> UsageRecord {
        UsageRecord {
            user_id: "u".to_string(),
            word_count: consumed,
            consumed,
            limit,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn snapshot_reports_post_charge_figures() {
        let snap = UsageSnapshot::for_charge(5, &record(5, 400));
        assert_eq!(snap.word_count, 5);
        assert_eq!(snap.total_usage, 5);
        assert_eq!(snap.usage_limit, 400);
        assert_eq!(snap.remaining_usage, 395);
    }

    #[test]
    fn denial_messages_match_the_reason() {
        let resp = quota_denied(DenyReason::AlreadyExhausted, &record(400, 400));
        assert_eq!(resp.status, StatusCode::FORBIDDEN);
        assert_eq!(
            resp.error.message,
            "Usage limit exceeded. Current usage: 400/400"
        );

        let resp = quota_denied(DenyReason::WouldExceed, &record(10, 400));
        assert_eq!(
            resp.error.message,
            "Request would exceed usage limit. Current usage: 10/400"
        );
        let details = resp.error.details.unwrap();
        assert_eq!(details["current_usage"], 10);
        assert_eq!(details["usage_limit"], 400);
    }
}
