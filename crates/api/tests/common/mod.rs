//! Common test utilities for integration tests.
//!
//! Builds the application router around fake analytics clients and
//! in-memory permission stores, so no network access is needed.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use course_insights_api::{
    app::{create_app, AppState},
    config::Config,
    services::{
        CourseValidator, FormatCourseValidator, InMemoryPermissionStore, PermissionService,
        PermissionsError,
    },
};
use domain::models::ActivityRecord;
use domain::services::{AnalyticsClient, MockAnalyticsClient};
use tower::ServiceExt;

pub const DEMO_COURSE_ID: &str = "course-v1:edX+DemoX+Demo_2014";
pub const DEPRECATED_DEMO_COURSE_ID: &str = "edX/DemoX/Demo_Course";
pub const TEST_USERNAME: &str = "staff";

/// Test configuration built from embedded defaults.
pub fn test_config() -> Config {
    Config::load_for_test(&[("analytics_api.base_url", "http://analytics.test")])
        .expect("Failed to load test config")
}

/// A router together with the handles tests manipulate.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub permissions: Arc<InMemoryPermissionStore>,
}

impl TestApp {
    /// App backed by `analytics`, accepting any well-formed course key.
    /// No user has any grant yet.
    pub fn new(analytics: MockAnalyticsClient) -> Self {
        let permissions = Arc::new(InMemoryPermissionStore::new());
        let state = build_state(
            Arc::new(analytics),
            permissions.clone(),
            Arc::new(FormatCourseValidator::new()),
        );

        Self {
            router: create_app(state.clone()),
            state,
            permissions,
        }
    }

    /// App where `TEST_USERNAME` may view both demo courses.
    pub async fn with_demo_grants(analytics: MockAnalyticsClient) -> Self {
        let app = Self::new(analytics);
        app.permissions.grant(TEST_USERNAME, DEMO_COURSE_ID).await;
        app.permissions
            .grant(TEST_USERNAME, DEPRECATED_DEMO_COURSE_ID)
            .await;
        app
    }

    pub fn token(&self) -> String {
        issue_token(&self.state, TEST_USERNAME)
    }

    pub async fn get(&self, uri: &str) -> Response {
        get(&self.router, uri, Some(&self.token())).await
    }
}

pub fn build_state(
    analytics: Arc<dyn AnalyticsClient>,
    permissions: Arc<dyn PermissionService>,
    courses: Arc<dyn CourseValidator>,
) -> AppState {
    AppState::new(test_config(), analytics, permissions, courses)
        .expect("Failed to build test state")
}

pub fn issue_token(state: &AppState, username: &str) -> String {
    let (token, _jti) = state
        .jwt
        .issue_token(username, 3600)
        .expect("Failed to issue token");
    token
}

/// Send a GET request, optionally with a Bearer token.
pub async fn get(router: &Router, uri: &str, token: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and decode the body.
pub async fn expect_json(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

/// Permission backend that is always down.
pub struct FailingPermissions;

#[async_trait::async_trait]
impl PermissionService for FailingPermissions {
    async fn accessible_courses(&self, _username: &str) -> Result<Vec<String>, PermissionsError> {
        Err(PermissionsError::RetrievalFailed(
            "permissions backend unreachable".to_string(),
        ))
    }
}

/// Course validator that knows no courses.
pub struct RejectingValidator;

#[async_trait::async_trait]
impl CourseValidator for RejectingValidator {
    async fn is_valid_course(&self, _course_id: &str) -> bool {
        false
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

/// Weekly activity row whose week ends on `week_ending`.
pub fn activity(
    week_ending: &str,
    counts: [Option<i64>; 4],
    created: Option<&str>,
) -> ActivityRecord {
    let interval_end = date(week_ending)
        .succ_opt()
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    ActivityRecord {
        interval_start: Some(interval_end - chrono::Duration::days(7)),
        interval_end,
        any: counts[0],
        attempted_problem: counts[1],
        played_video: counts[2],
        posted_forum: counts[3],
        created: created.map(timestamp),
    }
}
