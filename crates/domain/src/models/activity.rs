//! Course engagement activity models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::api_datetime;

/// Kind of learner activity counted by the analytics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Any,
    AttemptedProblem,
    PlayedVideo,
    PostedForum,
}

impl ActivityType {
    /// All activity types, in display order.
    pub const ALL: [ActivityType; 4] = [
        ActivityType::Any,
        ActivityType::AttemptedProblem,
        ActivityType::PlayedVideo,
        ActivityType::PostedForum,
    ];

    /// Wire name used by the analytics API and the page payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::AttemptedProblem => "attempted_problem",
            Self::PlayedVideo => "played_video",
            Self::PostedForum => "posted_forum",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Analytics API records
// ============================================================================

/// One weekly row from `GET /api/v0/courses/{course_id}/activity/`.
///
/// `interval_end` is exclusive: a week ending on Tuesday is reported with an
/// `interval_end` of Wednesday 00:00.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(default, with = "api_datetime::option")]
    pub interval_start: Option<NaiveDateTime>,
    #[serde(with = "api_datetime")]
    pub interval_end: NaiveDateTime,
    #[serde(default)]
    pub any: Option<i64>,
    #[serde(default)]
    pub attempted_problem: Option<i64>,
    #[serde(default)]
    pub played_video: Option<i64>,
    #[serde(default)]
    pub posted_forum: Option<i64>,
    #[serde(default, with = "api_datetime::option")]
    pub created: Option<NaiveDateTime>,
}

impl ActivityRecord {
    /// Count for an activity type; the API omits types with no activity.
    pub fn count(&self, activity_type: ActivityType) -> i64 {
        let value = match activity_type {
            ActivityType::Any => self.any,
            ActivityType::AttemptedProblem => self.attempted_problem,
            ActivityType::PlayedVideo => self.played_video,
            ActivityType::PostedForum => self.posted_forum,
        };
        value.unwrap_or(0)
    }

    /// Last day covered by this row.
    pub fn week_ending(&self) -> NaiveDate {
        (self.interval_end - chrono::Duration::days(1)).date()
    }
}

// ============================================================================
// View models
// ============================================================================

/// A single week of engagement, as rendered by the engagement chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(rename = "weekEnding")]
    pub week_ending: NaiveDate,
    pub any: i64,
    pub attempted_problem: i64,
    pub played_video: i64,
    pub posted_forum: i64,
}

impl TrendPoint {
    pub fn count(&self, activity_type: ActivityType) -> i64 {
        match activity_type {
            ActivityType::Any => self.any,
            ActivityType::AttemptedProblem => self.attempted_problem,
            ActivityType::PlayedVideo => self.played_video,
            ActivityType::PostedForum => self.posted_forum,
        }
    }
}

impl From<&ActivityRecord> for TrendPoint {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            week_ending: record.week_ending(),
            any: record.count(ActivityType::Any),
            attempted_problem: record.count(ActivityType::AttemptedProblem),
            played_video: record.count(ActivityType::PlayedVideo),
            posted_forum: record.count(ActivityType::PostedForum),
        }
    }
}

/// Activity counts for the most recent week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngagementSummary {
    pub week_ending: NaiveDate,
    pub last_updated: Option<NaiveDateTime>,
    pub any: i64,
    pub attempted_problem: i64,
    pub played_video: i64,
    pub posted_forum: i64,
}

impl EngagementSummary {
    pub fn count(&self, activity_type: ActivityType) -> i64 {
        match activity_type {
            ActivityType::Any => self.any,
            ActivityType::AttemptedProblem => self.attempted_problem,
            ActivityType::PlayedVideo => self.played_video,
            ActivityType::PostedForum => self.posted_forum,
        }
    }
}
