//! Course page routing and navigation.
//!
//! Course keys in the deprecated `Org/Course/Run` format contain slashes, so
//! course routes are matched from the end of the path: whatever precedes a
//! known page suffix is the course key.

use serde::Serialize;

/// A page rendered for a single course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoursePage {
    EnrollmentActivity,
    EnrollmentGeography,
    EngagementContent,
}

impl CoursePage {
    pub const ALL: [CoursePage; 3] = [
        CoursePage::EnrollmentActivity,
        CoursePage::EnrollmentGeography,
        CoursePage::EngagementContent,
    ];

    /// Path below `/courses/{course_id}/`, without slashes at either end.
    pub fn path(&self) -> &'static str {
        match self {
            Self::EnrollmentActivity => "enrollment/activity",
            Self::EnrollmentGeography => "enrollment/geography",
            Self::EngagementContent => "engagement/content",
        }
    }

    pub fn page_title(&self) -> &'static str {
        match self {
            Self::EnrollmentActivity => "Enrollment Activity",
            Self::EnrollmentGeography => "Enrollment Geography",
            Self::EngagementContent => "Engagement Content",
        }
    }

    /// Key of the page data inside the `course` object handed to the front end.
    pub fn data_key(&self) -> &'static str {
        match self {
            Self::EnrollmentActivity => "enrollmentTrends",
            Self::EnrollmentGeography => "enrollmentByCountry",
            Self::EngagementContent => "engagementTrends",
        }
    }

    /// Label used in the "data was last updated" message.
    pub fn update_label(&self) -> &'static str {
        match self {
            Self::EnrollmentActivity => "Enrollment activity",
            Self::EnrollmentGeography => "Geographic",
            Self::EngagementContent => "Course engagement",
        }
    }

    /// Name used for metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnrollmentActivity => "enrollment_activity",
            Self::EnrollmentGeography => "enrollment_geography",
            Self::EngagementContent => "engagement_content",
        }
    }

    /// Absolute URL of this page. `%` in the course key is re-escaped,
    /// since route parameters arrive percent-decoded.
    pub fn url(&self, course_id: &str) -> String {
        format!("/courses/{}/{}/", course_id.replace('%', "%25"), self.path())
    }
}

/// A route below `/courses/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseRoute {
    /// `/courses/{course_id}/`, which redirects to enrollment activity.
    Home,
    Page(CoursePage),
}

impl CourseRoute {
    /// Splits the path below `/courses/` into a course key and a route.
    ///
    /// Returns `None` when no course key remains.
    pub fn parse(path: &str) -> Option<(String, CourseRoute)> {
        let path = path.trim_matches('/');

        for page in CoursePage::ALL {
            if let Some(course_id) = path.strip_suffix(page.path()) {
                if let Some(course_id) = course_id.strip_suffix('/') {
                    if !course_id.is_empty() {
                        return Some((course_id.to_string(), CourseRoute::Page(page)));
                    }
                }
            }
        }

        if path.is_empty() {
            None
        } else {
            Some((path.to_string(), CourseRoute::Home))
        }
    }
}

/// Top-level navigation entry for a course section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryNavItem {
    pub icon: &'static str,
    pub href: String,
    pub label: &'static str,
    pub name: &'static str,
}

/// Tab within a section. The current page's tab links to `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryNavItem {
    pub name: &'static str,
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

struct NavSection {
    name: &'static str,
    label: &'static str,
    icon: &'static str,
    landing: CoursePage,
    tabs: &'static [NavTab],
}

struct NavTab {
    name: &'static str,
    label: &'static str,
    page: CoursePage,
}

static NAV_SECTIONS: [NavSection; 2] = [
    NavSection {
        name: "enrollment",
        label: "Enrollment",
        icon: "fa-child",
        landing: CoursePage::EnrollmentActivity,
        tabs: &[
            NavTab {
                name: "activity",
                label: "Activity",
                page: CoursePage::EnrollmentActivity,
            },
            NavTab {
                name: "geography",
                label: "Geography",
                page: CoursePage::EnrollmentGeography,
            },
        ],
    },
    NavSection {
        name: "engagement",
        label: "Engagement",
        icon: "fa-bar-chart",
        landing: CoursePage::EngagementContent,
        tabs: &[NavTab {
            name: "content",
            label: "Content",
            page: CoursePage::EngagementContent,
        }],
    },
];

fn section_for(page: CoursePage) -> &'static NavSection {
    NAV_SECTIONS
        .iter()
        .find(|section| section.tabs.iter().any(|tab| tab.page == page))
        .unwrap_or(&NAV_SECTIONS[0])
}

pub fn primary_nav_item(course_id: &str, page: CoursePage) -> PrimaryNavItem {
    let section = section_for(page);
    PrimaryNavItem {
        icon: section.icon,
        href: section.landing.url(course_id),
        label: section.label,
        name: section.name,
    }
}

pub fn secondary_nav_items(course_id: &str, page: CoursePage) -> Vec<SecondaryNavItem> {
    section_for(page)
        .tabs
        .iter()
        .map(|tab| {
            let active = tab.page == page;
            SecondaryNavItem {
                name: tab.name,
                label: tab.label,
                href: if active {
                    "#".to_string()
                } else {
                    tab.page.url(course_id)
                },
                active,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO_COURSE_ID: &str = "course-v1:edX+DemoX+Demo_2014";
    const DEPRECATED_DEMO_COURSE_ID: &str = "edX/DemoX/Demo_Course";

    #[test]
    fn test_parse_pages() {
        for course_id in [DEMO_COURSE_ID, DEPRECATED_DEMO_COURSE_ID] {
            for page in CoursePage::ALL {
                let with_slash = format!("{}/{}/", course_id, page.path());
                let without_slash = format!("{}/{}", course_id, page.path());
                let expected = Some((course_id.to_string(), CourseRoute::Page(page)));

                assert_eq!(CourseRoute::parse(&with_slash), expected);
                assert_eq!(CourseRoute::parse(&without_slash), expected);
            }
        }
    }

    #[test]
    fn test_parse_home() {
        assert_eq!(
            CourseRoute::parse("edX/DemoX/Demo_Course/"),
            Some((DEPRECATED_DEMO_COURSE_ID.to_string(), CourseRoute::Home))
        );
        assert_eq!(
            CourseRoute::parse(DEMO_COURSE_ID),
            Some((DEMO_COURSE_ID.to_string(), CourseRoute::Home))
        );
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(CourseRoute::parse(""), None);
        assert_eq!(CourseRoute::parse("/"), None);
        // No course key in front of the page path; validation rejects it later.
        assert_eq!(
            CourseRoute::parse("enrollment/activity"),
            Some(("enrollment/activity".to_string(), CourseRoute::Home))
        );
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            CoursePage::EnrollmentActivity.url(DEPRECATED_DEMO_COURSE_ID),
            "/courses/edX/DemoX/Demo_Course/enrollment/activity/"
        );
        assert_eq!(
            CoursePage::EngagementContent.url(DEMO_COURSE_ID),
            "/courses/course-v1:edX+DemoX+Demo_2014/engagement/content/"
        );
        assert_eq!(
            CoursePage::EnrollmentGeography.url("edX/Demo%41/Run"),
            "/courses/edX/Demo%2541/Run/enrollment/geography/"
        );
    }

    #[test]
    fn test_engagement_navigation() {
        let primary = primary_nav_item(DEMO_COURSE_ID, CoursePage::EngagementContent);
        assert_eq!(
            primary,
            PrimaryNavItem {
                icon: "fa-bar-chart",
                href: CoursePage::EngagementContent.url(DEMO_COURSE_ID),
                label: "Engagement",
                name: "engagement",
            }
        );

        let secondary = secondary_nav_items(DEMO_COURSE_ID, CoursePage::EngagementContent);
        assert_eq!(
            secondary,
            vec![SecondaryNavItem {
                name: "content",
                label: "Content",
                href: "#".to_string(),
                active: true,
            }]
        );
    }

    #[test]
    fn test_enrollment_navigation() {
        let primary = primary_nav_item(DEPRECATED_DEMO_COURSE_ID, CoursePage::EnrollmentGeography);
        assert_eq!(primary.icon, "fa-child");
        assert_eq!(primary.name, "enrollment");
        assert_eq!(
            primary.href,
            "/courses/edX/DemoX/Demo_Course/enrollment/activity/"
        );

        let secondary =
            secondary_nav_items(DEPRECATED_DEMO_COURSE_ID, CoursePage::EnrollmentGeography);
        assert_eq!(secondary.len(), 2);
        assert_eq!(secondary[0].name, "activity");
        assert!(!secondary[0].active);
        assert_eq!(
            secondary[0].href,
            "/courses/edX/DemoX/Demo_Course/enrollment/activity/"
        );
        assert_eq!(secondary[1].name, "geography");
        assert!(secondary[1].active);
        assert_eq!(secondary[1].href, "#");
    }
}
