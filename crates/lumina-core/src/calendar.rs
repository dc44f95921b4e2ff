//! Logical calendar with a 4 AM day boundary.
//!
//! Activity between midnight and 04:00 belongs to the previous day: an
//! instant is shifted back four hours and truncated to its calendar date in
//! the instant's own timezone.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};

use crate::error::ValidationError;

/// Hours subtracted from an instant before truncating to a date.
pub const DAY_BOUNDARY_HOURS: i64 = 4;

/// Map an instant to its logical day.
pub fn logical_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    (instant.clone() - Duration::hours(DAY_BOUNDARY_HOURS)).date_naive()
}

/// Logical day rendered as an ISO date (`YYYY-MM-DD`).
pub fn logical_day_string<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    format_day(logical_day(instant))
}

/// The logical day immediately before the one containing `instant`.
pub fn previous_logical_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    let today = logical_day(instant);
    today.pred_opt().unwrap_or(today)
}

/// Whether `instant` falls on the same logical day as `now`.
pub fn is_logical_today<Tz: TimeZone>(instant: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
    logical_day(instant) == logical_day(now)
}

pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Parse an ISO date string into a logical day.
pub fn parse_logical_day(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use proptest::prelude::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn late_night_belongs_to_previous_day() {
        let instant = utc(2026, 3, 10, 1, 30, 0);
        assert_eq!(logical_day_string(&instant), "2026-03-09");
    }

    #[test]
    fn boundary_instants_share_a_day() {
        let before_boundary = utc(2026, 3, 10, 3, 59, 59);
        let after_prior_boundary = utc(2026, 3, 9, 4, 0, 1);
        assert_eq!(
            logical_day_string(&before_boundary),
            logical_day_string(&after_prior_boundary)
        );
        assert_eq!(logical_day_string(&before_boundary), "2026-03-09");
    }

    #[test]
    fn four_am_starts_a_new_day() {
        assert_eq!(logical_day_string(&utc(2026, 3, 10, 4, 0, 0)), "2026-03-10");
    }

    #[test]
    fn uses_the_instant_timezone() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        // 02:00 local on the 10th is 17:00 UTC on the 9th
        let local = tz.with_ymd_and_hms(2026, 3, 10, 2, 0, 0).unwrap();
        assert_eq!(logical_day_string(&local), "2026-03-09");
        let local_morning = tz.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        assert_eq!(logical_day_string(&local_morning), "2026-03-10");
    }

    #[test]
    fn previous_day_crosses_month() {
        let instant = utc(2026, 4, 1, 12, 0, 0);
        assert_eq!(
            previous_logical_day(&instant),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()
        );
    }

    #[test]
    fn is_logical_today_respects_boundary() {
        let now = utc(2026, 3, 10, 2, 0, 0);
        assert!(is_logical_today(&utc(2026, 3, 9, 22, 0, 0), &now));
        assert!(!is_logical_today(&utc(2026, 3, 10, 5, 0, 0), &now));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_logical_day("2026-13-01").is_err());
        assert_eq!(
            parse_logical_day(" 2026-01-05 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
        );
    }

    proptest! {
        #[test]
        fn instants_in_one_window_map_to_one_day(
            day_offset in 0i64..3650,
            start in 0i64..86_400,
            delta in 0i64..86_400,
        ) {
            let window_start = utc(2020, 1, 1, 4, 0, 0) + Duration::days(day_offset);
            let a = window_start + Duration::seconds(start.min(delta));
            let b = window_start + Duration::seconds(start.max(delta));
            prop_assert_eq!(logical_day(&a), logical_day(&b));
            prop_assert_eq!(logical_day(&a), window_start.date_naive());
        }

        #[test]
        fn logical_day_is_monotonic(base in 0i64..315_360_000, step in 0i64..1_000_000) {
            let a = utc(2020, 1, 1, 0, 0, 0) + Duration::seconds(base);
            let b = a + Duration::seconds(step);
            prop_assert!(logical_day(&a) <= logical_day(&b));
        }
    }
}
