use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rd_provider::ProviderError;
use rd_quota::StoreError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub retryable: bool,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "Invalid admin token")
    }

    pub fn user_not_found(user_id: &str) -> Self {
        Self::new("NOT_FOUND", format!("User {} not found", user_id))
    }

    /// Denials carry the current figures both in the message and as
    /// structured details, so clients can render either.
    pub fn quota_exceeded(message: impl Into<String>, consumed: i64, limit: i64) -> Self {
        Self::new("QUOTA_EXCEEDED", message).with_details(serde_json::json!({
            "current_usage": consumed,
            "usage_limit": limit,
        }))
    }

    /// Provider failures are retryable: nothing was charged.
    pub fn provider(err: &ProviderError) -> Self {
        Self::new("PROVIDER_ERROR", err.to_string()).retryable()
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message).retryable()
    }

    pub fn store_error(err: &StoreError) -> (StatusCode, Self) {
        match err {
            StoreError::UserNotFound(user_id) => {
                (StatusCode::NOT_FOUND, Self::user_not_found(user_id))
            }
            StoreError::Sqlite(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Self::internal(e.to_string()),
            ),
        }
    }
}

#[derive(Debug)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let body = serde_json::to_string(&self.error).unwrap_or_default();
        (self.status, [("content-type", "application/json")], body).into_response()
    }
}

impl From<(StatusCode, ApiError)> for ApiErrorResponse {
    fn from((status, error): (StatusCode, ApiError)) -> Self {
        Self { status, error }
    }
}

impl From<StoreError> for ApiErrorResponse {
    fn from(err: StoreError) -> Self {
        let (status, error) = ApiError::store_error(&err);
        Self { status, error }
    }
}
