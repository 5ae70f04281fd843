//! Domain models for course analytics.

pub mod activity;
pub mod api_datetime;
pub mod enrollment;
pub mod geography;

pub use activity::{ActivityRecord, ActivityType, EngagementSummary, TrendPoint};
pub use enrollment::{EnrollmentRecord, EnrollmentSummary};
pub use geography::{
    Country, GeographyEntry, GeographyRecord, GeographySummary, UNKNOWN_COUNTRY_CODE,
    UNKNOWN_COUNTRY_NAME,
};
