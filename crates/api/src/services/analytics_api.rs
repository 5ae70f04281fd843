//! HTTP client for the analytics data API.
//!
//! Implements the domain `AnalyticsClient` port over the API's v0 REST
//! resources. Every call is authenticated with the configured token and
//! bounded by the configured timeout.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use domain::models::{ActivityRecord, EnrollmentRecord, GeographyRecord};
use domain::services::{AnalyticsClient, AnalyticsError};
use reqwest::{header, Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::AnalyticsApiConfig;
use crate::middleware::metrics::record_analytics_request;

const API_VERSION_PATH: [&str; 2] = ["api", "v0"];

/// Upstream error bodies are cut to this many characters.
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client for the analytics data API.
pub struct AnalyticsApiClient {
    client: Client,
    base_url: Url,
    auth_token: String,
    timeout_ms: u64,
}

impl std::fmt::Debug for AnalyticsApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("auth_token", &"[REDACTED]")
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl AnalyticsApiClient {
    /// Create a client from configuration.
    ///
    /// Fails with `NotConfigured` when the base URL is empty or cannot carry
    /// a path.
    pub fn new(config: &AnalyticsApiConfig) -> Result<Self, AnalyticsError> {
        if config.base_url.trim().is_empty() {
            return Err(AnalyticsError::NotConfigured);
        }

        let base_url =
            Url::parse(config.base_url.trim()).map_err(|_| AnalyticsError::NotConfigured)?;
        if base_url.cannot_be_a_base() {
            return Err(AnalyticsError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AnalyticsError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            auth_token: config.auth_token.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// Builds `{base}/api/v0/{segments...}/` with an optional `start_date`.
    fn endpoint(
        &self,
        segments: &[&str],
        start_date: Option<NaiveDate>,
    ) -> Result<Url, AnalyticsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AnalyticsError::NotConfigured)?
            .pop_if_empty()
            .extend(API_VERSION_PATH)
            .extend(segments)
            .push("");

        if let Some(date) = start_date {
            url.query_pairs_mut()
                .append_pair("start_date", &date.format("%Y-%m-%d").to_string());
        }

        Ok(url)
    }

    /// Course resource URL. Deprecated course keys keep their slashes.
    fn course_endpoint(
        &self,
        course_id: &str,
        resource: &[&str],
        start_date: Option<NaiveDate>,
    ) -> Result<Url, AnalyticsError> {
        let mut segments: Vec<&str> = vec!["courses"];
        segments.extend(course_id.split('/'));
        segments.extend_from_slice(resource);
        self.endpoint(&segments, start_date)
    }

    async fn send(&self, url: Url) -> Result<Response, AnalyticsError> {
        debug!(url = %url, "Calling analytics API");

        let mut request = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json");
        if !self.auth_token.is_empty() {
            request = request.header(header::AUTHORIZATION, format!("Token {}", self.auth_token));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AnalyticsError::Timeout(self.timeout_ms)
            } else {
                AnalyticsError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AnalyticsError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(AnalyticsError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        url: Url,
    ) -> Result<T, AnalyticsError> {
        let start = Instant::now();

        let result = match self.send(url).await {
            Ok(response) => response
                .json::<T>()
                .await
                .map_err(|e| AnalyticsError::InvalidResponse(e.to_string())),
            Err(e) => Err(e),
        };

        let duration = start.elapsed().as_secs_f64();
        record_analytics_request(resource, outcome_label(&result), duration);

        if let Err(e) = &result {
            if !e.is_not_found() {
                warn!(resource, error = %e, "Analytics API request failed");
            }
        }

        result
    }
}

fn outcome_label<T>(result: &Result<T, AnalyticsError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(AnalyticsError::NotFound(_)) => "not_found",
        Err(AnalyticsError::Timeout(_)) => "timeout",
        Err(_) => "error",
    }
}

#[async_trait::async_trait]
impl AnalyticsClient for AnalyticsApiClient {
    async fn course_activity(
        &self,
        course_id: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<ActivityRecord>, AnalyticsError> {
        let url = self.course_endpoint(course_id, &["activity"], start_date)?;
        self.get_json("activity", url).await
    }

    async fn course_enrollment(
        &self,
        course_id: &str,
        start_date: Option<NaiveDate>,
    ) -> Result<Vec<EnrollmentRecord>, AnalyticsError> {
        let url = self.course_endpoint(course_id, &["enrollment"], start_date)?;
        self.get_json("enrollment", url).await
    }

    async fn course_enrollment_by_location(
        &self,
        course_id: &str,
    ) -> Result<Vec<GeographyRecord>, AnalyticsError> {
        let url = self.course_endpoint(course_id, &["enrollment", "location"], None)?;
        self.get_json("enrollment_by_location", url).await
    }

    async fn status(&self) -> Result<(), AnalyticsError> {
        let url = self.endpoint(&["status"], None)?;
        let start = Instant::now();
        let result = self.send(url).await.map(|_| ());
        record_analytics_request("status", outcome_label(&result), start.elapsed().as_secs_f64());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> AnalyticsApiConfig {
        AnalyticsApiConfig {
            base_url: base_url.to_string(),
            auth_token: "secret-token".to_string(),
            timeout_ms: 5000,
            lookback_days: 90,
        }
    }

    fn client(base_url: &str) -> AnalyticsApiClient {
        AnalyticsApiClient::new(&config(base_url)).unwrap()
    }

    #[test]
    fn test_new_requires_base_url() {
        assert_eq!(
            AnalyticsApiClient::new(&config("")).unwrap_err(),
            AnalyticsError::NotConfigured
        );
        assert_eq!(
            AnalyticsApiClient::new(&config("not a url")).unwrap_err(),
            AnalyticsError::NotConfigured
        );
        assert_eq!(
            AnalyticsApiClient::new(&config("mailto:ops@example.com")).unwrap_err(),
            AnalyticsError::NotConfigured
        );
    }

    #[test]
    fn test_course_endpoint_current_key() {
        let url = client("http://analytics.test")
            .course_endpoint("course-v1:edX+DemoX+Demo_2014", &["activity"], None)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://analytics.test/api/v0/courses/course-v1:edX+DemoX+Demo_2014/activity/"
        );
    }

    #[test]
    fn test_course_endpoint_deprecated_key_keeps_slashes() {
        let url = client("http://analytics.test/")
            .course_endpoint("edX/DemoX/Demo_Course", &["enrollment", "location"], None)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://analytics.test/api/v0/courses/edX/DemoX/Demo_Course/enrollment/location/"
        );
    }

    #[test]
    fn test_endpoint_under_base_path_with_start_date() {
        let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let url = client("http://analytics.test/data")
            .course_endpoint("edX/DemoX/Demo_Course", &["enrollment"], Some(start))
            .unwrap();
        assert_eq!(
            url.as_str(),
            concat!(
                "http://analytics.test/data/api/v0/courses/",
                "edX/DemoX/Demo_Course/enrollment/?start_date=2014-01-01"
            )
        );
    }

    #[test]
    fn test_status_endpoint() {
        let url = client("https://analytics.test").endpoint(&["status"], None).unwrap();
        assert_eq!(url.as_str(), "https://analytics.test/api/v0/status/");
    }

    #[test]
    fn test_outcome_label() {
        assert_eq!(outcome_label::<()>(&Ok(())), "ok");
        assert_eq!(
            outcome_label::<()>(&Err(AnalyticsError::NotFound("x".into()))),
            "not_found"
        );
        assert_eq!(outcome_label::<()>(&Err(AnalyticsError::Timeout(10))), "timeout");
        assert_eq!(
            outcome_label::<()>(&Err(AnalyticsError::Transport("refused".into()))),
            "error"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", client("http://analytics.test"));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("REDACTED"));
    }
}
