//! Course enrollment models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::api_datetime;

/// One daily row from `GET /api/v0/courses/{course_id}/enrollment/`.
///
/// Only `date`, `count` and `created` are interpreted; every other field the
/// API sends is kept in `extra` and written back out unchanged, so the page
/// receives the snapshot exactly as the API produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub date: NaiveDate,
    pub count: i64,
    #[serde(
        default,
        with = "api_datetime::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EnrollmentRecord {
    pub fn new(date: NaiveDate, count: i64) -> Self {
        Self {
            date,
            count,
            created: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Headline enrollment numbers for the most recent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EnrollmentSummary {
    pub date: NaiveDate,
    pub last_updated: Option<NaiveDateTime>,
    pub current_enrollment: i64,
    /// Difference to the snapshot seven days earlier, when the API has one.
    pub enrollment_change_last_7_days: Option<i64>,
}
