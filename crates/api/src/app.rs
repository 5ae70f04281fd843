use anyhow::Context;
use axum::{middleware, routing::get, Router};
use domain::services::AnalyticsClient;
use shared::jwt::JwtConfig;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{courses, health};
use crate::services::{
    AnalyticsApiClient, CourseValidator, FormatCourseValidator, InMemoryPermissionStore,
    PermissionService,
};

/// Shared state handed to every handler.
///
/// The analytics client and both access checks are trait objects so tests
/// and alternative deployments can swap them.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analytics: Arc<dyn AnalyticsClient>,
    pub permissions: Arc<dyn PermissionService>,
    pub courses: Arc<dyn CourseValidator>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    pub fn new(
        config: Config,
        analytics: Arc<dyn AnalyticsClient>,
        permissions: Arc<dyn PermissionService>,
        courses: Arc<dyn CourseValidator>,
    ) -> anyhow::Result<Self> {
        let jwt = JwtConfig::with_leeway(&config.jwt.secret, config.jwt.leeway_secs)
            .context("Invalid JWT configuration")?;

        Ok(Self {
            config: Arc::new(config),
            analytics,
            permissions,
            courses,
            jwt: Arc::new(jwt),
        })
    }

    /// Wires the production services from configuration.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let analytics = AnalyticsApiClient::new(&config.analytics_api)
            .context("Failed to create analytics API client")?;
        let permissions = InMemoryPermissionStore::from_grants(&config.permissions.grants);
        let courses = FormatCourseValidator::with_allowed(config.courses.allowed.iter().cloned());

        Self::new(
            config,
            Arc::new(analytics),
            Arc::new(permissions),
            Arc::new(courses),
        )
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Resource not found".to_string())
}

pub fn create_app(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let course_routes = Router::new()
        .route("/courses", get(courses::index))
        .route("/courses/", get(courses::index))
        .route("/courses/*path", get(courses::course_page));

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(course_routes)
        .merge(public_routes)
        .fallback(not_found)
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(trace_id)) // Request ID and logging
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
