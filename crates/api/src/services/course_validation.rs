//! Course existence checks.

use std::collections::HashSet;

use shared::validation::is_valid_course_id;

/// Decides whether a course key refers to a course the dashboard serves.
#[async_trait::async_trait]
pub trait CourseValidator: Send + Sync {
    async fn is_valid_course(&self, course_id: &str) -> bool;
}

/// Accepts well-formed course keys, optionally restricted to an allow-list.
#[derive(Debug, Clone, Default)]
pub struct FormatCourseValidator {
    allowed: Option<HashSet<String>>,
}

impl FormatCourseValidator {
    /// Accept any well-formed course key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only the listed course keys. An empty list accepts everything.
    pub fn with_allowed<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: HashSet<String> = allowed.into_iter().map(Into::into).collect();
        Self {
            allowed: if allowed.is_empty() { None } else { Some(allowed) },
        }
    }
}

#[async_trait::async_trait]
impl CourseValidator for FormatCourseValidator {
    async fn is_valid_course(&self, course_id: &str) -> bool {
        if !is_valid_course_id(course_id) {
            return false;
        }
        match &self.allowed {
            Some(allowed) => allowed.contains(course_id),
            None => true,
        }
    }
}
