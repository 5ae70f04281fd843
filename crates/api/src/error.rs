use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::AnalyticsError;
use serde::Serialize;
use thiserror::Error;

use crate::services::permissions::PermissionsError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The permissions backend could not be reached or answered garbage.
    /// Distinct from `Forbidden`, which means the user simply lacks access.
    #[error("Permissions retrieval failed: {0}")]
    PermissionsRetrievalFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::PermissionsRetrievalFailed(msg) => {
                tracing::error!("Permissions retrieval failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "permissions_retrieval_failed",
                    "Course permissions could not be retrieved. Please try again later.".into(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    "Analytics data is temporarily unavailable. Please try again later.".into(),
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::ServiceUnavailable(format!("Analytics data unavailable: {}", other)),
        }
    }
}

impl From<PermissionsError> for ApiError {
    fn from(err: PermissionsError) -> Self {
        ApiError::PermissionsRetrievalFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_api_error_unauthorized() {
        let response = ApiError::Unauthorized("test message".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_api_error_forbidden() {
        let response = ApiError::Forbidden("access denied".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_api_error_not_found() {
        let response = ApiError::NotFound("course not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_permissions_retrieval_failed_is_recognizable() {
        let response =
            ApiError::PermissionsRetrievalFailed("backend down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "permissions_retrieval_failed");
        assert!(!body["message"].as_str().unwrap().contains("backend down"));
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::Internal("serializer exploded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_service_unavailable_hides_upstream_body() {
        let upstream = "<html>Traceback: psycopg2 at db-internal-10.0.0.5</html>";
        let response = ApiError::from(AnalyticsError::ServiceError {
            status: 500,
            message: upstream.to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["error"], "service_unavailable");
        let message = body["message"].as_str().unwrap();
        assert!(!message.contains("Traceback"));
        assert!(!message.contains("db-internal"));
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::Unauthorized("test".to_string()).to_string(),
            "Unauthorized: test"
        );
        assert_eq!(
            ApiError::PermissionsRetrievalFailed("test".to_string()).to_string(),
            "Permissions retrieval failed: test"
        );
        assert_eq!(
            ApiError::ServiceUnavailable("test".to_string()).to_string(),
            "Service unavailable: test"
        );
    }

    #[test]
    fn test_from_analytics_error() {
        let error: ApiError = AnalyticsError::Timeout(5000).into();
        assert!(matches!(error, ApiError::ServiceUnavailable(_)));

        let error: ApiError = AnalyticsError::NotFound("activity".to_string()).into();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn test_from_permissions_error() {
        let error: ApiError = PermissionsError::RetrievalFailed("timeout".to_string()).into();
        match error {
            ApiError::PermissionsRetrievalFailed(msg) => assert!(msg.contains("timeout")),
            _ => panic!("Expected PermissionsRetrievalFailed error"),
        }
    }
}
