//! Port for the external analytics data API.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{ActivityRecord, EnrollmentRecord, GeographyRecord};

/// Errors reported by an analytics client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// The API has no data for the requested course or metric.
    #[error("No analytics data found: {0}")]
    NotFound(String),

    #[error("Analytics API base URL not configured")]
    NotConfigured,

    #[error("Analytics API request timed out after {0}ms")]
    Timeout(u64),

    #[error("Analytics API transport error: {0}")]
    Transport(String),

    #[error("Analytics API returned HTTP {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response from analytics API: {0}")]
    InvalidResponse(String),
}

impl AnalyticsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Read access to course analytics.
///
/// Implementations return rows in the order the API emits them.
#[async_trait::async_trait]
pub trait AnalyticsClient: Send + Sync {
    /// Weekly engagement activity, optionally starting at `start_date`.
    async fn course_activity(
        &self,
        course_id: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<ActivityRecord>, AnalyticsError>;

    /// Daily enrollment snapshots, optionally starting at `start_date`.
    async fn course_enrollment(
        &self,
        course_id: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<EnrollmentRecord>, AnalyticsError>;

    /// Latest enrollment broken down by learner country.
    async fn course_enrollment_by_location(
        &self,
        course_id: &str,
    ) -> Result<Vec<GeographyRecord>, AnalyticsError>;

    /// Checks that the API is reachable and healthy.
    async fn status(&self) -> Result<(), AnalyticsError>;
}

/// Fixture-backed analytics client for development and testing.
///
/// Every endpoint answers `NotFound` until data is configured.
#[derive(Debug, Clone)]
pub struct MockAnalyticsClient {
    pub activity: Result<Vec<ActivityRecord>, AnalyticsError>,
    pub enrollment: Result<Vec<EnrollmentRecord>, AnalyticsError>,
    pub geography: Result<Vec<GeographyRecord>, AnalyticsError>,
    pub status: Result<(), AnalyticsError>,
}

impl Default for MockAnalyticsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnalyticsClient {
    /// Create a client with no data for any course.
    pub fn new() -> Self {
        let not_found = || AnalyticsError::NotFound("no fixture configured".to_string());
        Self {
            activity: Err(not_found()),
            enrollment: Err(not_found()),
            geography: Err(not_found()),
            status: Ok(()),
        }
    }

    /// Create a client where every call fails with `error`.
    pub fn failing(error: AnalyticsError) -> Self {
        Self {
            activity: Err(error.clone()),
            enrollment: Err(error.clone()),
            geography: Err(error.clone()),
            status: Err(error),
        }
    }

    pub fn with_activity(mut self, records: Vec<ActivityRecord>) -> Self {
        self.activity = Ok(records);
        self
    }

    pub fn with_enrollment(mut self, records: Vec<EnrollmentRecord>) -> Self {
        self.enrollment = Ok(records);
        self
    }

    pub fn with_geography(mut self, records: Vec<GeographyRecord>) -> Self {
        self.geography = Ok(records);
        self
    }
}

#[async_trait::async_trait]
impl AnalyticsClient for MockAnalyticsClient {
    async fn course_activity(
        &self,
        course_id: &str,
        _start_date: Option<NaiveDate>,
    ) -> Result<Vec<ActivityRecord>, AnalyticsError> {
        tracing::debug!(course_id = %course_id, "Mock: course activity");
        self.activity.clone()
    }

    async fn course_enrollment(
        &self,
        course_id: &str,
        _start_date: Option<NaiveDate>,
    ) -> Result<Vec<EnrollmentRecord>, AnalyticsError> {
        tracing::debug!(course_id = %course_id, "Mock: course enrollment");
        self.enrollment.clone()
    }

    async fn course_enrollment_by_location(
        &self,
        course_id: &str,
    ) -> Result<Vec<GeographyRecord>, AnalyticsError> {
        tracing::debug!(course_id = %course_id, "Mock: course enrollment by location");
        self.geography.clone()
    }

    async fn status(&self) -> Result<(), AnalyticsError> {
        self.status.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_defaults_to_not_found() {
        let client = MockAnalyticsClient::new();
        let err = client
            .course_activity("edX/DemoX/Demo_Course", None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(client.status().await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let client = MockAnalyticsClient::failing(AnalyticsError::Timeout(500));
        assert_eq!(
            client.course_enrollment_by_location("x/y/z").await,
            Err(AnalyticsError::Timeout(500))
        );
        assert_eq!(client.status().await, Err(AnalyticsError::Timeout(500)));
    }

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::ServiceError {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "Analytics API returned HTTP 502: bad gateway");
        assert!(!err.is_not_found());
    }
}
