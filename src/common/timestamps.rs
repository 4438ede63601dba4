//! Deserializer for the backend's timestamp format (`2023-02-14 09:30:00.123Z`).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.fZ";

pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, PARSE_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_backend_format() {
        let dt = parse("2023-02-14 09:30:15.250Z").unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), 2);
        assert_eq!(dt.day(), 14);
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.second(), 15);
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn falls_back_to_rfc3339() {
        let dt = parse("2023-02-14T09:30:15Z").unwrap();
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_none());
    }
}
