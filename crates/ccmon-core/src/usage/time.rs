//! Session-start timestamp parsing and the fixed session window.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

/// Length of a ccusage billing block
pub const SESSION_WINDOW_HOURS: i64 = 5;

/// `6/21/2025, 11:52:17 AM`
const LAYOUT_US_12H: &str = "%m/%d/%Y, %I:%M:%S %p";
/// `2025/6/21 11:52:17`
const LAYOUT_ISO_24H: &str = "%Y/%m/%d %H:%M:%S";

/// Time left in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Remaining {
    /// Session still running
    Left { hours: i64, minutes: i64 },
    /// Window has elapsed
    Expired,
    /// Session taken from a finished block
    Completed,
    /// Start time could not be parsed
    Unknown,
}

impl Remaining {
    /// Short display form ("3h 52m", "expired", ...)
    pub fn display(&self) -> String {
        match self {
            Remaining::Left { hours, minutes } => format!("{}h {:02}m", hours, minutes),
            Remaining::Expired => "expired".to_string(),
            Remaining::Completed => "completed".to_string(),
            Remaining::Unknown => "--".to_string(),
        }
    }
}

/// Parse a session start in either supported layout.
///
/// Runs of whitespace are collapsed first so `6/21/2025,  11:52:17 AM`
/// parses the same as the single-spaced form.
pub fn parse_session_start(text: &str) -> Option<NaiveDateTime> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, LAYOUT_US_12H)
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, LAYOUT_ISO_24H))
        .ok()
}

/// End of the session window that started at `start`
pub fn session_end(start: NaiveDateTime) -> NaiveDateTime {
    start + Duration::hours(SESSION_WINDOW_HOURS)
}

/// Time left until `end`, floored to the minute, or `Expired` once `now >= end`
pub fn remaining_at(end: NaiveDateTime, now: NaiveDateTime) -> Remaining {
    if end <= now {
        return Remaining::Expired;
    }
    let secs = (end - now).num_seconds();
    Remaining::Left {
        hours: secs / 3600,
        minutes: (secs % 3600) / 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_both_layouts_yield_same_instant() {
        let us = parse_session_start("6/21/2025, 11:52:17 AM").unwrap();
        let iso = parse_session_start("2025/6/21 11:52:17").unwrap();
        assert_eq!(us, iso);
        assert_eq!(us, at(2025, 6, 21, 11, 52, 17));
    }

    #[test]
    fn test_pm_and_padded_forms() {
        assert_eq!(
            parse_session_start("06/21/2025, 01:05:00 PM"),
            Some(at(2025, 6, 21, 13, 5, 0))
        );
        assert_eq!(
            parse_session_start("2025/06/21 13:05:00"),
            Some(at(2025, 6, 21, 13, 5, 0))
        );
        assert_eq!(
            parse_session_start("12/1/2024,   12:00:00 AM"),
            Some(at(2024, 12, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_unparsable_start() {
        assert_eq!(parse_session_start("yesterday-ish"), None);
        assert_eq!(parse_session_start("21.6.2025 11:52"), None);
        assert_eq!(parse_session_start(""), None);
    }

    #[test]
    fn test_session_end_is_five_hours_later() {
        let start = at(2025, 6, 21, 22, 30, 0);
        assert_eq!(session_end(start), at(2025, 6, 22, 3, 30, 0));
    }

    #[test]
    fn test_remaining_floors_seconds() {
        let end = at(2025, 6, 21, 16, 52, 17);
        let now = at(2025, 6, 21, 13, 0, 0);
        assert_eq!(
            remaining_at(end, now),
            Remaining::Left {
                hours: 3,
                minutes: 52
            }
        );
    }

    #[test]
    fn test_remaining_boundary() {
        let end = at(2025, 6, 21, 16, 52, 17);
        let just_before = end - Duration::seconds(1);
        let just_after = end + Duration::seconds(1);

        assert_eq!(
            remaining_at(end, just_before),
            Remaining::Left {
                hours: 0,
                minutes: 0
            }
        );
        assert_eq!(remaining_at(end, end), Remaining::Expired);
        assert_eq!(remaining_at(end, just_after), Remaining::Expired);
    }

    #[test]
    fn test_remaining_display() {
        assert_eq!(
            Remaining::Left {
                hours: 2,
                minutes: 5
            }
            .display(),
            "2h 05m"
        );
        assert_eq!(Remaining::Expired.display(), "expired");
    }
}
