use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Commit time as epoch milliseconds plus the author's UTC offset in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateResult {
    pub ms: i64,
    pub adjustment: i32,
}

impl DateResult {
    pub fn new(ms: i64, adjustment: i32) -> Self {
        Self { ms, adjustment }
    }

    pub fn from_git_time(time: git2::Time) -> Self {
        Self {
            ms: time.seconds().saturating_mul(1000),
            adjustment: time.offset_minutes(),
        }
    }

    /// Local time of the revision, or `None` when either value is out of range.
    pub fn to_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.adjustment.checked_mul(60)?)?;
        let utc = DateTime::from_timestamp_millis(self.ms)?;
        Some(utc.with_timezone(&offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_git_time() {
        let date = DateResult::from_git_time(git2::Time::new(1_700_000_000, 120));
        assert_eq!(date.ms, 1_700_000_000_000);
        assert_eq!(date.adjustment, 120);
    }

    #[test]
    fn test_to_datetime_applies_offset() {
        let date = DateResult::new(0, 90);
        let dt = date.to_datetime().unwrap();
        assert_eq!(dt.to_rfc3339(), "1970-01-01T01:30:00+01:30");
    }

    #[test]
    fn test_to_datetime_out_of_range() {
        assert!(DateResult::new(0, 24 * 60).to_datetime().is_none());
        assert!(DateResult::new(i64::MAX, 0).to_datetime().is_none());
    }
}
