//! # Calendar Engine
//!
//! Every date the application reasons about is a *civil date*: the calendar day
//! observed in the user's IANA timezone. Converting an instant into weekly buckets
//! happens in two stages:
//!
//! 1. **Resolve**: render the instant in the timezone and keep only the date
//!    ([`target_date`]). This is the only step that consults the timezone
//!    database, so DST rules apply here and nowhere else.
//! 2. **Walk**: do day-of-week and day-count arithmetic on the bare
//!    [`NaiveDate`]. Naive dates have no offset, so a 7-day walk can never
//!    land on the wrong side of a DST transition.
//!
//! ## Week Windows
//!
//! A week starts on the user's [`WeekStartDay`]. Weekday indices follow the
//! sunday=0 … saturday=6 convention and the start of the week containing a date
//! is found by stepping back `(day_of_week - start_index + 7) % 7` days. Both
//! bounds of a [`WeekRange`] are inclusive.

use crate::error::{CompanionError, Result};
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// The weekday a user's calendar week begins on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    #[default]
    Monday,
    Sunday,
    Saturday,
}

impl WeekStartDay {
    /// Weekday index with sunday=0 … saturday=6.
    pub fn index(self) -> u32 {
        match self {
            WeekStartDay::Sunday => 0,
            WeekStartDay::Monday => 1,
            WeekStartDay::Saturday => 6,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeekStartDay::Monday => "monday",
            WeekStartDay::Sunday => "sunday",
            WeekStartDay::Saturday => "saturday",
        }
    }
}

impl fmt::Display for WeekStartDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekStartDay {
    type Err = CompanionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(WeekStartDay::Monday),
            "sunday" | "sun" => Ok(WeekStartDay::Sunday),
            "saturday" | "sat" => Ok(WeekStartDay::Saturday),
            other => Err(CompanionError::Api(format!(
                "Unsupported week start day '{}' (expected monday, sunday or saturday)",
                other
            ))),
        }
    }
}

/// An inclusive 7-day window of civil dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start,
            end: shift_date(start, 6),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The seven dates of the week, in order.
    pub fn days(&self) -> [NaiveDate; 7] {
        std::array::from_fn(|offset| shift_date(self.start, offset as i64))
    }

    pub fn shift(&self, weeks: i64) -> Self {
        Self::starting(shift_date(self.start, weeks.saturating_mul(7)))
    }
}

impl fmt::Display for WeekRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Looks up an IANA timezone name in the bundled timezone database.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    Tz::from_str(name.trim()).map_err(|_| CompanionError::UnknownTimezone(name.to_string()))
}

/// Like [`resolve_timezone`] but total: unknown names degrade to UTC.
pub fn resolve_timezone_or_utc(name: &str) -> Tz {
    resolve_timezone(name).unwrap_or_else(|_| {
        warn!(timezone = name, "unknown timezone, falling back to UTC");
        Tz::UTC
    })
}

/// The calendar date observed in `tz` at `instant`.
pub fn target_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// The week containing `instant` as seen from `tz`.
pub fn week_range(instant: DateTime<Utc>, tz: Tz, week_start: WeekStartDay) -> WeekRange {
    week_containing(target_date(instant, tz), week_start)
}

/// The week containing a civil date.
pub fn week_containing(date: NaiveDate, week_start: WeekStartDay) -> WeekRange {
    let day_of_week = date.weekday().num_days_from_sunday();
    let back = (day_of_week + 7 - week_start.index()) % 7;
    WeekRange::starting(shift_date(date, -i64::from(back)))
}

/// Resolves `instant` in `tz`, then moves `days` calendar days from there.
pub fn add_days(instant: DateTime<Utc>, tz: Tz, days: i64) -> NaiveDate {
    shift_date(target_date(instant, tz), days)
}

/// Pure calendar arithmetic, saturating at the representable range.
pub fn shift_date(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        })
}

/// `YYYY-MM` bucket key for monthly summaries.
pub fn month_prefix(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// The host's IANA timezone, or `"UTC"` when it can't be determined.
pub fn detect_timezone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(name) if resolve_timezone(&name).is_ok() => name,
        Ok(name) => {
            warn!(timezone = %name, "host timezone not in database, using UTC");
            DEFAULT_TIMEZONE.to_string()
        }
        Err(_) => DEFAULT_TIMEZONE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tz(name: &str) -> Tz {
        resolve_timezone(name).unwrap()
    }

    #[test]
    fn target_date_uses_the_timezone() {
        let d = target_date(instant("2025-01-01T02:30:00Z"), tz("America/New_York"));
        assert_eq!(d, date("2024-12-31"));
    }

    #[test]
    fn target_date_in_utc_is_the_utc_date() {
        let d = target_date(instant("2025-01-01T02:30:00Z"), Tz::UTC);
        assert_eq!(d, date("2025-01-01"));
    }

    #[test]
    fn monday_week_in_new_york() {
        let range = week_range(
            instant("2025-01-01T12:00:00Z"),
            tz("America/New_York"),
            WeekStartDay::Monday,
        );
        assert_eq!(range.start, date("2024-12-30"));
        assert_eq!(range.end, date("2025-01-05"));
    }

    #[test]
    fn sunday_week_in_tokyo() {
        let range = week_range(
            instant("2025-01-03T03:00:00Z"),
            tz("Asia/Tokyo"),
            WeekStartDay::Sunday,
        );
        assert_eq!(range.start, date("2024-12-29"));
        assert_eq!(range.end, date("2025-01-04"));
    }

    #[test]
    fn saturday_week_starts_on_saturday() {
        // 2025-01-04 is a Saturday
        let sat = week_containing(date("2025-01-04"), WeekStartDay::Saturday);
        assert_eq!(sat.start, date("2025-01-04"));
        let fri = week_containing(date("2025-01-10"), WeekStartDay::Saturday);
        assert_eq!(fri.start, date("2025-01-04"));
        assert_eq!(fri.end, date("2025-01-10"));
    }

    #[test]
    fn week_start_day_is_its_own_week_start() {
        // 2025-01-06 is a Monday
        let range = week_containing(date("2025-01-06"), WeekStartDay::Monday);
        assert_eq!(range.start, date("2025-01-06"));
    }

    #[test]
    fn add_days_in_london_summer() {
        let d = add_days(instant("2025-06-15T22:00:00Z"), tz("Europe/London"), 2);
        assert_eq!(d, date("2025-06-17"));
    }

    #[test]
    fn add_days_negative() {
        let d = add_days(instant("2025-03-01T12:00:00Z"), Tz::UTC, -1);
        assert_eq!(d, date("2025-02-28"));
    }

    #[test]
    fn week_end_is_six_days_after_start_everywhere() {
        let zones = [
            "UTC",
            "America/New_York",
            "America/Los_Angeles",
            "Europe/London",
            "Asia/Tokyo",
            "Australia/Lord_Howe",
            "Pacific/Kiritimati",
        ];
        let starts = [
            WeekStartDay::Monday,
            WeekStartDay::Sunday,
            WeekStartDay::Saturday,
        ];
        // Spans both DST transitions of 2025 in the northern and southern hemispheres
        let moments = [
            "2025-03-09T06:59:00Z",
            "2025-03-30T01:30:00Z",
            "2025-04-06T15:45:00Z",
            "2025-10-05T16:00:00Z",
            "2025-11-02T05:30:00Z",
            "2025-12-31T23:59:59Z",
        ];

        for zone in zones {
            for start in starts {
                for moment in moments {
                    let range = week_range(instant(moment), tz(zone), start);
                    assert_eq!(range.end, shift_date(range.start, 6), "{zone} {start} {moment}");
                    assert_eq!(
                        range.start.weekday().num_days_from_sunday(),
                        start.index(),
                        "{zone} {start} {moment}"
                    );
                    assert!(range.contains(target_date(instant(moment), tz(zone))));
                }
            }
        }
    }

    #[test]
    fn dst_spring_forward_keeps_seven_days() {
        // US DST started 2025-03-09
        let range = week_range(
            instant("2025-03-10T12:00:00Z"),
            tz("America/New_York"),
            WeekStartDay::Sunday,
        );
        assert_eq!(range.start, date("2025-03-09"));
        assert_eq!(range.days().len(), 7);
        assert_eq!(range.days()[6], date("2025-03-15"));
    }

    #[test]
    fn week_range_shift_moves_whole_weeks() {
        let range = week_containing(date("2025-01-01"), WeekStartDay::Monday);
        let next = range.shift(1);
        assert_eq!(next.start, date("2025-01-06"));
        let prev = range.shift(-1);
        assert_eq!(prev.end, date("2024-12-29"));
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert!(matches!(
            resolve_timezone("Mars/Olympus_Mons"),
            Err(CompanionError::UnknownTimezone(_))
        ));
        assert_eq!(resolve_timezone_or_utc("Mars/Olympus_Mons"), Tz::UTC);
    }

    #[test]
    fn week_start_day_parsing() {
        assert_eq!("Sunday".parse::<WeekStartDay>().unwrap(), WeekStartDay::Sunday);
        assert_eq!("sat".parse::<WeekStartDay>().unwrap(), WeekStartDay::Saturday);
        assert!("tuesday".parse::<WeekStartDay>().is_err());
    }

    #[test]
    fn week_start_day_serializes_lowercase() {
        let json = serde_json::to_string(&WeekStartDay::Saturday).unwrap();
        assert_eq!(json, "\"saturday\"");
    }

    #[test]
    fn month_prefix_formats_year_month() {
        assert_eq!(month_prefix(date("2025-02-09")), "2025-02");
    }

    #[test]
    fn detect_timezone_never_empty() {
        let name = detect_timezone();
        assert!(!name.is_empty());
        assert!(resolve_timezone(&name).is_ok());
    }
}
