use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

static START_TIME: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();

pub fn init_start_time() {
    START_TIME.get_or_init(std::time::Instant::now);
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.to_string(),
        uptime_secs: uptime,
    })
}

/// Service index so a bare GET tells callers what lives where.
pub async fn index(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Text Humanizer API",
        "version": state.version,
        "endpoints": {
            "/detect-ai": "POST - Detect AI-generated content",
            "/humanize": "POST - Humanize text with usage tracking",
            "/update-limit": "POST - Update user usage limits (admin only)",
            "/user-usage/{user_id}": "GET - Get user usage statistics",
            "/health": "GET - Health check"
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serialization() {
        let resp = HealthResponse {
            status: "healthy".to_string(),
            version: "1.0.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["uptime_secs"], 42);
    }

    #[test]
    fn init_start_time_is_idempotent() {
        init_start_time();
        let first = *START_TIME.get().unwrap();
        init_start_time();
        assert_eq!(first, *START_TIME.get().unwrap());
    }
}
