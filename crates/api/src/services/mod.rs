//! External service integrations and access checks.

pub mod analytics_api;
pub mod course_validation;
pub mod permissions;

pub use analytics_api::AnalyticsApiClient;
pub use course_validation::{CourseValidator, FormatCourseValidator};
pub use permissions::{InMemoryPermissionStore, PermissionService, PermissionsError};
