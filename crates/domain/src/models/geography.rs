//! Enrollment-by-country models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::api_datetime;

/// Country code used when the analytics pipeline could not geolocate learners.
pub const UNKNOWN_COUNTRY_CODE: &str = "UNKNOWN";

/// Display name for [`UNKNOWN_COUNTRY_CODE`].
pub const UNKNOWN_COUNTRY_NAME: &str = "Unknown Country";

/// Country descriptor as sent by the analytics API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    #[serde(default)]
    pub alpha2: Option<String>,
    #[serde(default)]
    pub alpha3: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One row from `GET /api/v0/courses/{course_id}/enrollment/location/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographyRecord {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub country: Option<Country>,
    pub count: i64,
    #[serde(default, with = "api_datetime::option")]
    pub created: Option<NaiveDateTime>,
}

impl GeographyRecord {
    /// ISO 3166-1 alpha-3 code, or [`UNKNOWN_COUNTRY_CODE`].
    pub fn country_code(&self) -> &str {
        self.country
            .as_ref()
            .and_then(|c| c.alpha3.as_deref())
            .filter(|code| !code.is_empty())
            .unwrap_or(UNKNOWN_COUNTRY_CODE)
    }

    pub fn country_name(&self) -> &str {
        if self.country_code() == UNKNOWN_COUNTRY_CODE {
            return UNKNOWN_COUNTRY_NAME;
        }
        self.country
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_COUNTRY_NAME)
    }
}

/// Enrollment for one country, as rendered on the map and table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographyEntry {
    pub country_code: String,
    pub country_name: String,
    pub count: i64,
    /// Share of total enrollment, between 0 and 1.
    pub percent: f64,
}

impl GeographyEntry {
    pub fn is_unknown(&self) -> bool {
        self.country_code == UNKNOWN_COUNTRY_CODE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GeographySummary {
    pub last_updated: Option<NaiveDateTime>,
    /// Number of distinct known countries.
    pub num_countries: usize,
    pub top_countries: Vec<GeographyEntry>,
}
