//! Course index and course page handlers.
//!
//! Each course page answers with the context a front end needs to render it:
//! headline summary, the page data both as an object and as a serialized
//! string, and the navigation for the course.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use domain::services::{CourseEngagementPresenter, CourseEnrollmentPresenter, Presented};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_empty_state;
use crate::navigation::{
    primary_nav_item, secondary_nav_items, CoursePage, CourseRoute, PrimaryNavItem,
    SecondaryNavItem,
};

pub const INDEX_PAGE_TITLE: &str = "Courses";

/// Context for the course index page.
#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub page_title: &'static str,
    pub courses: Vec<String>,
}

/// Context for a course page.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub course_id: String,
    pub page_title: &'static str,
    pub summary: Option<Value>,
    pub update_message: Option<String>,
    pub js_data: Value,
    /// `js_data` serialized, ready to embed in a page.
    pub page_data: String,
    pub primary_nav_item: PrimaryNavItem,
    pub secondary_nav_items: Vec<SecondaryNavItem>,
}

/// List the courses the user may view.
///
/// GET /courses
pub async fn index(
    State(state): State<AppState>,
    user: UserAuth,
) -> Result<Json<IndexContext>, ApiError> {
    let mut courses = state.permissions.accessible_courses(&user.username).await?;
    courses.sort();
    courses.dedup();

    if courses.is_empty() {
        info!(username = %user.username, "User has no accessible courses");
        return Err(ApiError::Forbidden(
            "You do not have access to any courses".to_string(),
        ));
    }

    Ok(Json(IndexContext {
        page_title: INDEX_PAGE_TITLE,
        courses,
    }))
}

/// Render a course page.
///
/// GET /courses/{course_id}/[enrollment/activity|enrollment/geography|engagement/content]/
///
/// The course is validated before the caller is authenticated so unknown
/// courses answer 404 regardless of credentials.
pub async fn course_page(
    State(state): State<AppState>,
    Path(path): Path<String>,
    user: Result<UserAuth, ApiError>,
) -> Result<Response, ApiError> {
    let (course_id, route) = CourseRoute::parse(&path)
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    if !state.courses.is_valid_course(&course_id).await {
        debug!(course_id = %course_id, "Rejected unknown course");
        return Err(ApiError::NotFound(format!("Course {} not found", course_id)));
    }

    let user = user?;

    let page = match route {
        CourseRoute::Home => {
            let location = CoursePage::EnrollmentActivity.url(&course_id);
            return Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response());
        }
        CourseRoute::Page(page) => page,
    };

    if !state
        .permissions
        .has_permission(&user.username, &course_id)
        .await?
    {
        info!(
            username = %user.username,
            course_id = %course_id,
            "Course access denied"
        );
        return Err(ApiError::Forbidden(
            "You do not have permission to view this course".to_string(),
        ));
    }

    let start_date = lookback_start(
        state.config.analytics_api.lookback_days,
        Utc::now().date_naive(),
    );
    let (summary, last_updated, data) =
        load_page_data(&state, &course_id, page, start_date).await?;

    if data.is_none() {
        record_empty_state(page.name());
    }

    let context = build_page_context(&course_id, page, summary, last_updated, data)?;
    Ok(Json(context).into_response())
}

type PageData = (Option<Value>, Option<NaiveDateTime>, Option<Value>);

/// Runs the presenter for `page` and returns the JSON summary, its
/// `last_updated` timestamp and the JSON page data.
async fn load_page_data(
    state: &AppState,
    course_id: &str,
    page: CoursePage,
    start_date: Option<NaiveDate>,
) -> Result<PageData, ApiError> {
    let client = state.analytics.as_ref();

    match page {
        CoursePage::EnrollmentActivity => {
            let presented = CourseEnrollmentPresenter::new(client, course_id)
                .with_start_date(start_date)
                .get_summary_and_trend_data()
                .await?;
            let last_updated = found_summary(&presented).and_then(|s| s.last_updated);
            to_json_parts(presented, last_updated)
        }
        CoursePage::EnrollmentGeography => {
            let presented = CourseEnrollmentPresenter::new(client, course_id)
                .get_geography_data()
                .await?;
            let last_updated = found_summary(&presented).and_then(|s| s.last_updated);
            to_json_parts(presented, last_updated)
        }
        CoursePage::EngagementContent => {
            let presented = CourseEngagementPresenter::new(client, course_id)
                .with_start_date(start_date)
                .get_summary_and_trend_data()
                .await?;
            let last_updated = found_summary(&presented).and_then(|s| s.last_updated);
            to_json_parts(presented, last_updated)
        }
    }
}

fn found_summary<S, D>(presented: &Presented<S, D>) -> Option<&S> {
    match presented {
        Presented::Found { summary, .. } => Some(summary),
        Presented::NotFound => None,
    }
}

fn to_json_parts<S: Serialize, D: Serialize>(
    presented: Presented<S, D>,
    last_updated: Option<NaiveDateTime>,
) -> Result<PageData, ApiError> {
    let (summary, data) = presented.into_parts();
    let summary = summary.map(serde_json::to_value).transpose().map_err(internal)?;
    let data = data.map(serde_json::to_value).transpose().map_err(internal)?;
    Ok((summary, last_updated, data))
}

fn internal(err: serde_json::Error) -> ApiError {
    ApiError::Internal(format!("Failed to serialize page data: {}", err))
}

/// First day of data requested by trend pages; `None` requests everything.
fn lookback_start(lookback_days: u32, today: NaiveDate) -> Option<NaiveDate> {
    if lookback_days == 0 {
        return None;
    }
    today.checked_sub_signed(Duration::days(i64::from(lookback_days)))
}

/// "Geographic data was last updated January 02, 2014 at 03:15 UTC."
pub fn update_message(label: &str, last_updated: Option<NaiveDateTime>) -> Option<String> {
    last_updated.map(|ts| {
        format!(
            "{} data was last updated {} at {} UTC.",
            label,
            ts.format("%B %d, %Y"),
            ts.format("%H:%M")
        )
    })
}

pub fn build_page_context(
    course_id: &str,
    page: CoursePage,
    summary: Option<Value>,
    last_updated: Option<NaiveDateTime>,
    data: Option<Value>,
) -> Result<PageContext, ApiError> {
    let mut course = Map::new();
    course.insert("courseId".to_string(), Value::String(course_id.to_string()));
    course.insert(page.data_key().to_string(), data.unwrap_or(Value::Null));

    let mut js_data = Map::new();
    js_data.insert("course".to_string(), Value::Object(course));
    let js_data = Value::Object(js_data);

    let page_data = serde_json::to_string(&js_data).map_err(internal)?;

    Ok(PageContext {
        course_id: course_id.to_string(),
        page_title: page.page_title(),
        summary,
        update_message: update_message(page.update_label(), last_updated),
        js_data,
        page_data,
        primary_nav_item: primary_nav_item(course_id, page),
        secondary_nav_items: secondary_nav_items(course_id, page),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEMO_COURSE_ID: &str = "course-v1:edX+DemoX+Demo_2014";

    fn timestamp(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_update_message() {
        assert_eq!(
            update_message("Geographic", Some(timestamp("2014-01-02T03:15:00"))),
            Some("Geographic data was last updated January 02, 2014 at 03:15 UTC.".to_string())
        );
        assert_eq!(update_message("Course engagement", None), None);
    }

    #[test]
    fn test_lookback_start() {
        let today = NaiveDate::from_ymd_opt(2014, 4, 1).unwrap();
        assert_eq!(lookback_start(0, today), None);
        assert_eq!(
            lookback_start(90, today),
            NaiveDate::from_ymd_opt(2014, 1, 1)
        );
    }

    #[test]
    fn test_page_context_with_data() {
        let trend = json!([{"date": "2014-01-01", "count": 10}]);
        let context = build_page_context(
            DEMO_COURSE_ID,
            CoursePage::EnrollmentActivity,
            Some(json!({"current_enrollment": 10})),
            Some(timestamp("2014-01-02T03:15:00")),
            Some(trend.clone()),
        )
        .unwrap();

        assert_eq!(context.page_title, "Enrollment Activity");
        assert_eq!(context.js_data["course"]["courseId"], DEMO_COURSE_ID);
        assert_eq!(context.js_data["course"]["enrollmentTrends"], trend);
        assert_eq!(
            serde_json::from_str::<Value>(&context.page_data).unwrap(),
            context.js_data
        );
        assert_eq!(
            context.update_message.as_deref(),
            Some("Enrollment activity data was last updated January 02, 2014 at 03:15 UTC.")
        );
    }

    #[test]
    fn test_page_context_empty_state() {
        let context = build_page_context(
            DEMO_COURSE_ID,
            CoursePage::EnrollmentGeography,
            None,
            None,
            None,
        )
        .unwrap();

        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["summary"], Value::Null);
        assert_eq!(value["update_message"], Value::Null);
        assert!(value["js_data"]["course"]
            .as_object()
            .unwrap()
            .contains_key("enrollmentByCountry"));
        assert_eq!(value["js_data"]["course"]["enrollmentByCountry"], Value::Null);
        assert_eq!(value["primary_nav_item"]["name"], "enrollment");
    }
}
