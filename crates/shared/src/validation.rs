//! Course key validation utilities.
//!
//! Two course key formats are in circulation:
//! - `course-v1:Org+Course+Run` (current)
//! - `Org/Course/Run` (deprecated, still served by the analytics API)

use validator::ValidationError;

/// Maximum accepted length of a course key.
pub const MAX_COURSE_ID_LENGTH: usize = 255;

lazy_static::lazy_static! {
    static ref COURSE_KEY_REGEX: regex::Regex =
        regex::Regex::new(r"^course-v1:[\w.\-~%]+\+[\w.\-~%]+\+[\w.\-~%:]+$").unwrap();
    static ref DEPRECATED_COURSE_KEY_REGEX: regex::Regex =
        regex::Regex::new(r"^[\w.\-~%]+/[\w.\-~%]+/[\w.\-~%:]+$").unwrap();
}

/// The format a course key was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseKeyFormat {
    Current,
    Deprecated,
}

/// Detects the format of a course key, or `None` if it is not a course key.
pub fn course_key_format(course_id: &str) -> Option<CourseKeyFormat> {
    if course_id.is_empty() || course_id.len() > MAX_COURSE_ID_LENGTH {
        return None;
    }

    if COURSE_KEY_REGEX.is_match(course_id) {
        Some(CourseKeyFormat::Current)
    } else if DEPRECATED_COURSE_KEY_REGEX.is_match(course_id) {
        Some(CourseKeyFormat::Deprecated)
    } else {
        None
    }
}

/// Returns true if the string is a syntactically valid course key.
pub fn is_valid_course_id(course_id: &str) -> bool {
    course_key_format(course_id).is_some()
}

/// Validates a course key for use with `#[validate(custom(...))]`.
pub fn validate_course_id(course_id: &str) -> Result<(), ValidationError> {
    if is_valid_course_id(course_id) {
        Ok(())
    } else {
        let mut err = ValidationError::new("course_id_format");
        err.message =
            Some("Course ID must look like course-v1:Org+Course+Run or Org/Course/Run".into());
        Err(err)
    }
}
