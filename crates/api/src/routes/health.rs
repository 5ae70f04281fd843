//! Health check endpoint handler.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::app::AppState;

pub const STATUS_OK: &str = "OK";
pub const STATUS_UNAVAILABLE: &str = "UNAVAILABLE";

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub overall_status: &'static str,
    pub detailed_status: DetailedStatus,
}

/// Status of each backing service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DetailedStatus {
    pub analytics_api: &'static str,
}

impl HealthResponse {
    fn from_analytics(analytics_ok: bool) -> Self {
        let status = if analytics_ok {
            STATUS_OK
        } else {
            STATUS_UNAVAILABLE
        };
        Self {
            overall_status: status,
            detailed_status: DetailedStatus {
                analytics_api: status,
            },
        }
    }
}

/// Health check endpoint.
///
/// GET /health
///
/// Answers 503 with the same body when the analytics API is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let analytics_ok = match state.analytics.status().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Analytics API health check failed");
            false
        }
    };

    let code = if analytics_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(HealthResponse::from_analytics(analytics_ok)))
}
