//! Points in time and calendar dates.

use super::ValidationError;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An instant, always in UTC. Local last-modified times and remote
/// last-edited times are both expressed as `Timestamp` so they compare
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    pub fn from_unix_secs(secs: i64) -> Result<Self, ValidationError> {
        Utc.timestamp_opt(secs, 0)
            .single()
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidDate {
                value: secs.to_string(),
                reason: "seconds out of range".to_string(),
            })
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        DateTime::parse_from_rfc3339(input.trim())
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| ValidationError::InvalidDate {
                value: input.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0 + chrono::Duration::seconds(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// A calendar date without time of day (due dates, collection dates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ADate(NaiveDate);

impl ADate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidDate {
                value: format!("{:04}-{:02}-{:02}", year, month, day),
                reason: "no such calendar day".to_string(),
            })
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| ValidationError::InvalidDate {
                value: input.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for ADate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Source of "now" for event timestamps.
pub trait TimeProvider {
    fn right_now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn right_now(&self) -> Timestamp {
        Timestamp(Utc::now())
    }
}

/// Always answers the same instant. Used for deterministic runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeProvider(Timestamp);

impl FixedTimeProvider {
    pub fn new(at: Timestamp) -> Self {
        Self(at)
    }
}

impl TimeProvider for FixedTimeProvider {
    fn right_now(&self) -> Timestamp {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_order_chronologically() {
        let earlier = Timestamp::from_unix_secs(1_000).unwrap();
        let later = earlier.plus_secs(1);
        assert!(earlier < later);
        assert_eq!(
            Timestamp::parse("1970-01-01T00:16:40Z").unwrap(),
            earlier
        );
    }

    #[test]
    fn dates_parse_iso_format() {
        let date = ADate::parse("2024-02-29").unwrap();
        assert_eq!(date, ADate::from_ymd(2024, 2, 29).unwrap());
        assert_eq!(date.to_string(), "2024-02-29");
        assert!(ADate::parse("2023-02-29").is_err());
        assert!(ADate::from_ymd(2023, 13, 1).is_err());
    }

    #[test]
    fn fixed_provider_is_stable() {
        let at = Timestamp::from_unix_secs(42).unwrap();
        let provider = FixedTimeProvider::new(at);
        assert_eq!(provider.right_now(), provider.right_now());
    }
}
