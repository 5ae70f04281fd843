//! Presenters shaping analytics API data for the course pages.
//!
//! A presenter fetches one metric for one course and turns the raw rows into
//! a summary plus the series rendered by the page. When the API has nothing
//! for the course the presenter answers [`Presented::NotFound`] so the page
//! can show its empty state; every other failure is returned to the caller.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::{
    ActivityRecord, ActivityType, EngagementSummary, EnrollmentRecord, EnrollmentSummary,
    GeographyEntry, GeographyRecord, GeographySummary, TrendPoint,
};
use crate::services::analytics_client::{AnalyticsClient, AnalyticsError};

/// Number of entries reported in [`GeographySummary::top_countries`].
pub const TOP_COUNTRIES_COUNT: usize = 3;

/// Outcome of a presenter call.
#[derive(Debug, Clone, PartialEq)]
pub enum Presented<S, D> {
    Found { summary: S, data: D },
    NotFound,
}

impl<S, D> Presented<S, D> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Splits into optional parts, both `None` for [`Presented::NotFound`].
    pub fn into_parts(self) -> (Option<S>, Option<D>) {
        match self {
            Self::Found { summary, data } => (Some(summary), Some(data)),
            Self::NotFound => (None, None),
        }
    }
}

/// Maps an empty row set or a NotFound error to [`Presented::NotFound`].
fn recover_not_found<T, S, D>(
    course_id: &str,
    metric: &'static str,
    result: Result<Vec<T>, AnalyticsError>,
    shape: impl FnOnce(Vec<T>) -> Presented<S, D>,
) -> Result<Presented<S, D>, AnalyticsError> {
    match result {
        Ok(rows) if rows.is_empty() => {
            debug!(course_id = %course_id, metric, "Analytics API returned no rows");
            Ok(Presented::NotFound)
        }
        Ok(rows) => Ok(shape(rows)),
        Err(AnalyticsError::NotFound(reason)) => {
            debug!(
                course_id = %course_id,
                metric,
                reason = %reason,
                "No analytics data for course"
            );
            Ok(Presented::NotFound)
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// Engagement
// ============================================================================

/// Weekly engagement activity for a course.
pub struct CourseEngagementPresenter<'a> {
    client: &'a dyn AnalyticsClient,
    course_id: &'a str,
    start_date: Option<NaiveDate>,
}

impl<'a> CourseEngagementPresenter<'a> {
    pub fn new(client: &'a dyn AnalyticsClient, course_id: &'a str) -> Self {
        Self {
            client,
            course_id,
            start_date: None,
        }
    }

    pub fn with_start_date(mut self, start_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self
    }

    /// Returns the latest week's counts and the weekly trend, newest first.
    pub async fn get_summary_and_trend_data(
        &self,
    ) -> Result<Presented<EngagementSummary, Vec<TrendPoint>>, AnalyticsError> {
        let result = self
            .client
            .course_activity(self.course_id, self.start_date)
            .await;

        recover_not_found(self.course_id, "activity", result, |mut rows: Vec<ActivityRecord>| {
            rows.sort_by(|a, b| b.interval_end.cmp(&a.interval_end));
            let summary = build_engagement_summary(&rows[0]);
            let trend = rows.iter().map(TrendPoint::from).collect();
            Presented::Found {
                summary,
                data: trend,
            }
        })
    }
}

fn build_engagement_summary(latest: &ActivityRecord) -> EngagementSummary {
    EngagementSummary {
        week_ending: latest.week_ending(),
        last_updated: latest.created,
        any: latest.count(ActivityType::Any),
        attempted_problem: latest.count(ActivityType::AttemptedProblem),
        played_video: latest.count(ActivityType::PlayedVideo),
        posted_forum: latest.count(ActivityType::PostedForum),
    }
}

// ============================================================================
// Enrollment
// ============================================================================

/// Enrollment activity and geography for a course.
pub struct CourseEnrollmentPresenter<'a> {
    client: &'a dyn AnalyticsClient,
    course_id: &'a str,
    start_date: Option<NaiveDate>,
}

impl<'a> CourseEnrollmentPresenter<'a> {
    pub fn new(client: &'a dyn AnalyticsClient, course_id: &'a str) -> Self {
        Self {
            client,
            course_id,
            start_date: None,
        }
    }

    pub fn with_start_date(mut self, start_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self
    }

    /// Returns headline enrollment numbers and the daily snapshots.
    ///
    /// Snapshots are passed through in the order the API emitted them.
    pub async fn get_summary_and_trend_data(
        &self,
    ) -> Result<Presented<EnrollmentSummary, Vec<EnrollmentRecord>>, AnalyticsError> {
        let result = self
            .client
            .course_enrollment(self.course_id, self.start_date)
            .await;

        recover_not_found(self.course_id, "enrollment", result, |rows: Vec<EnrollmentRecord>| {
            Presented::Found {
                summary: build_enrollment_summary(&rows),
                data: rows,
            }
        })
    }

    /// Returns the country breakdown, largest enrollment first.
    pub async fn get_geography_data(
        &self,
    ) -> Result<Presented<GeographySummary, Vec<GeographyEntry>>, AnalyticsError> {
        let result = self
            .client
            .course_enrollment_by_location(self.course_id)
            .await;

        recover_not_found(
            self.course_id,
            "enrollment_by_location",
            result,
            |rows: Vec<GeographyRecord>| {
                let entries = build_geography_entries(&rows);
                let summary = build_geography_summary(&rows, &entries);
                Presented::Found {
                    summary,
                    data: entries,
                }
            },
        )
    }
}

/// Builds the summary from a non-empty set of snapshots.
fn build_enrollment_summary(rows: &[EnrollmentRecord]) -> EnrollmentSummary {
    let latest = rows
        .iter()
        .max_by_key(|r| r.date)
        .unwrap_or(&rows[0]);

    let week_before = latest.date - Duration::days(7);
    let enrollment_change_last_7_days = rows
        .iter()
        .find(|r| r.date == week_before)
        .map(|r| latest.count - r.count);

    EnrollmentSummary {
        date: latest.date,
        last_updated: latest.created,
        current_enrollment: latest.count,
        enrollment_change_last_7_days,
    }
}

fn build_geography_entries(rows: &[GeographyRecord]) -> Vec<GeographyEntry> {
    let total: i64 = rows.iter().map(|r| r.count).sum();

    let mut entries: Vec<GeographyEntry> = rows
        .iter()
        .map(|r| GeographyEntry {
            country_code: r.country_code().to_string(),
            country_name: r.country_name().to_string(),
            count: r.count,
            percent: if total > 0 {
                r.count as f64 / total as f64
            } else {
                0.0
            },
        })
        .collect();

    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

fn build_geography_summary(
    rows: &[GeographyRecord],
    entries: &[GeographyEntry],
) -> GeographySummary {
    let known: Vec<&GeographyEntry> = entries.iter().filter(|e| !e.is_unknown()).collect();

    GeographySummary {
        last_updated: rows.iter().filter_map(|r| r.created).max(),
        num_countries: known.len(),
        top_countries: known
            .into_iter()
            .take(TOP_COUNTRIES_COUNT)
            .cloned()
            .collect(),
    }
}
