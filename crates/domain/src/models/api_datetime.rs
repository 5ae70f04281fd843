//! Serde helpers for analytics API timestamps.
//!
//! The analytics data API writes timestamps without separators in the time
//! part (`2014-09-08T120000`). Older deployments emit `2014-09-08T12:00:00`
//! or full RFC 3339; all three are accepted on input.

use chrono::{DateTime, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serializer};

/// Timestamp format used by the analytics data API.
pub const API_DATETIME_FORMAT: &str = "%Y-%m-%dT%H%M%S";

const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses an analytics API timestamp.
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, API_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, ISO_DATETIME_FORMAT))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

/// Formats a timestamp the way the analytics API does.
pub fn format(value: &NaiveDateTime) -> String {
    value.format(API_DATETIME_FORMAT).to_string()
}

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid analytics timestamp: {}", raw)))
}

/// Same as the parent module, for optional fields.
pub mod option {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&super::format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                de::Error::custom(format!("invalid analytics timestamp: {}", raw))
            }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expected() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 9, 8)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap()
    }

    #[test]
    fn test_parse_api_format() {
        assert_eq!(parse("2014-09-08T123005"), Some(expected()));
    }

    #[test]
    fn test_parse_iso_format() {
        assert_eq!(parse("2014-09-08T12:30:05"), Some(expected()));
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(parse("2014-09-08T12:30:05Z"), Some(expected()));
        assert_eq!(parse("2014-09-08T14:30:05+02:00"), Some(expected()));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse("yesterday"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_format() {
        assert_eq!(format(&expected()), "2014-09-08T123005");
    }
}
