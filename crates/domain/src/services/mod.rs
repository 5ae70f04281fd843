//! Domain services for course analytics.

pub mod analytics_client;
pub mod presenters;

pub use analytics_client::{AnalyticsClient, AnalyticsError, MockAnalyticsClient};
pub use presenters::{CourseEngagementPresenter, CourseEnrollmentPresenter, Presented};
