//! Resolution of `--since`/`--until`/`--days` inputs to absolute instants.
//!
//! Everything here takes `now` explicitly so results are reproducible.

use crate::error::{GridError, Result};
use crate::model::{DateRange, DisplayZone};
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Which end of a range an input describes. A bare date covers a whole day,
/// so the lower bound takes its first second and the upper bound its last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Since,
    Until,
}

pub fn resolve_instant(
    input: &str,
    bound: Bound,
    zone: DisplayZone,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    try_resolve_instant(input, bound, zone, now)?.ok_or_else(|| {
        GridError::invalid_filter(
            input,
            "expected YYYY-MM-DD, an RFC 3339 timestamp, or a relative expression like \"2 weeks ago\"",
        )
    })
}

/// Like [`resolve_instant`], but `Ok(None)` when the input is not a date
/// expression at all, so callers can try other interpretations.
pub fn try_resolve_instant(
    input: &str,
    bound: Bound,
    zone: DisplayZone,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(GridError::invalid_filter(input, "empty date expression"));
    }

    // RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    // YYYY-MM-DD HH:MM[:SS]
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return localize(input, naive, zone).map(Some);
        }
    }

    // YYYY-MM-DD
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return day_bound(input, date, bound, zone).map(Some);
    }

    let lowered = trimmed.to_lowercase();
    match lowered.as_str() {
        "now" => return Ok(Some(now)),
        "today" => return day_bound(input, zone.today(now), Bound::Since, zone).map(Some),
        "yesterday" => {
            let date = zone.today(now).pred_opt().ok_or_else(|| out_of_range(input))?;
            return day_bound(input, date, Bound::Since, zone).map(Some);
        }
        _ => {}
    }

    // "2 weeks ago", "3.days.ago"
    if let Some(offset) = parse_relative(&lowered) {
        return offset.before(now).map(Some).ok_or_else(|| out_of_range(input));
    }

    // "90d", "2weeks", "1h 30m"
    if let Ok(duration) = humantime::parse_duration(&lowered) {
        let duration = Duration::from_std(duration).map_err(|_| out_of_range(input))?;
        return now.checked_sub_signed(duration).map(Some).ok_or_else(|| out_of_range(input));
    }

    Ok(None)
}

pub fn days_ago(days: u32, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    now.checked_sub_signed(Duration::days(days as i64))
        .ok_or_else(|| out_of_range(&format!("{days} days")))
}

/// Build a range from already-resolved bounds, rejecting inverted ones.
pub fn make_range(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Result<DateRange> {
    if let (Some(s), Some(u)) = (since, until) {
        if s > u {
            return Err(GridError::invalid_filter(
                format!("{} .. {}", s.to_rfc3339(), u.to_rfc3339()),
                "since is after until",
            ));
        }
    }

    let mut range = DateRange::new();
    if let Some(s) = since {
        range = range.with_since(s);
    }
    if let Some(u) = until {
        range = range.with_until(u);
    }
    Ok(range)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativeOffset {
    Exact(Duration),
    Months(u32),
}

impl RelativeOffset {
    fn before(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            RelativeOffset::Exact(d) => now.checked_sub_signed(d),
            RelativeOffset::Months(m) => now.checked_sub_months(Months::new(m)),
        }
    }
}

fn parse_relative(input: &str) -> Option<RelativeOffset> {
    let words: Vec<&str> = input
        .split(|c: char| c.is_whitespace() || c == '.')
        .filter(|w| !w.is_empty())
        .collect();

    let (amount, unit) = match words.as_slice() {
        [amount, unit, "ago"] => (amount.parse::<i64>().ok()?, *unit),
        [unit, "ago"] => (1, *unit),
        _ => return None,
    };
    if amount < 0 {
        return None;
    }

    let unit = unit.strip_suffix('s').unwrap_or(unit);
    let offset = match unit {
        "second" | "sec" => RelativeOffset::Exact(Duration::try_seconds(amount)?),
        "minute" | "min" => RelativeOffset::Exact(Duration::try_minutes(amount)?),
        "hour" => RelativeOffset::Exact(Duration::try_hours(amount)?),
        "day" => RelativeOffset::Exact(Duration::try_days(amount)?),
        "week" => RelativeOffset::Exact(Duration::try_weeks(amount)?),
        "month" => RelativeOffset::Months(u32::try_from(amount).ok()?),
        "year" => RelativeOffset::Months(u32::try_from(amount).ok()?.checked_mul(12)?),
        _ => return None,
    };
    Some(offset)
}

fn day_bound(input: &str, date: NaiveDate, bound: Bound, zone: DisplayZone) -> Result<DateTime<Utc>> {
    let time = match bound {
        Bound::Since => NaiveTime::from_hms_opt(0, 0, 0),
        Bound::Until => NaiveTime::from_hms_opt(23, 59, 59),
    }
    .ok_or_else(|| out_of_range(input))?;
    localize(input, date.and_time(time), zone)
}

fn localize(input: &str, naive: NaiveDateTime, zone: DisplayZone) -> Result<DateTime<Utc>> {
    zone.localize(naive).ok_or_else(|| {
        GridError::invalid_filter(input, format!("{naive} does not exist in the {zone} time zone"))
    })
}

fn out_of_range(input: &str) -> GridError {
    GridError::invalid_filter(input, "date is out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap()
    }

    fn resolve(input: &str, bound: Bound) -> DateTime<Utc> {
        resolve_instant(input, bound, DisplayZone::Utc, now()).unwrap()
    }

    #[test]
    fn absolute_dates_cover_the_whole_day() {
        assert_eq!(resolve("2024-01-01", Bound::Since), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(resolve("2024-01-01", Bound::Until), Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap());
    }

    #[test]
    fn rfc3339_keeps_its_offset() {
        assert_eq!(
            resolve("2024-01-01T09:00:00+02:00", Bound::Since),
            Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn wall_clock_time_uses_display_zone() {
        assert_eq!(resolve("2024-01-01 08:30", Bound::Until), Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn relative_expressions() {
        assert_eq!(resolve("2 weeks ago", Bound::Since), now() - Duration::days(14));
        assert_eq!(resolve("3.days.ago", Bound::Since), now() - Duration::days(3));
        assert_eq!(resolve("1 hour ago", Bound::Since), now() - Duration::hours(1));
        assert_eq!(resolve("week ago", Bound::Since), now() - Duration::days(7));
        assert_eq!(resolve("2 Weeks Ago", Bound::Since), now() - Duration::days(14));
    }

    #[test]
    fn months_are_calendar_months() {
        // March 31st minus one month clamps to the end of February.
        assert_eq!(resolve("1 month ago", Bound::Since), Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
        assert_eq!(resolve("1 year ago", Bound::Since), Utc.with_ymd_and_hms(2023, 3, 31, 12, 0, 0).unwrap());
    }

    #[test]
    fn compact_durations() {
        assert_eq!(resolve("90d", Bound::Since), now() - Duration::days(90));
        assert_eq!(resolve("1h 30m", Bound::Since), now() - Duration::minutes(90));
    }

    #[test]
    fn keywords() {
        assert_eq!(resolve("now", Bound::Until), now());
        assert_eq!(resolve("today", Bound::Since), Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap());
        assert_eq!(resolve("yesterday", Bound::Since), Utc.with_ymd_and_hms(2024, 3, 30, 0, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_rejected_with_input_echoed() {
        let err = resolve_instant("next tuesday-ish", Bound::Since, DisplayZone::Utc, now()).unwrap_err();
        assert!(matches!(err, GridError::InvalidFilter { ref input, .. } if input == "next tuesday-ish"));
        assert!(try_resolve_instant("v1.0", Bound::Since, DisplayZone::Utc, now()).unwrap().is_none());
        assert!(resolve_instant("  ", Bound::Since, DisplayZone::Utc, now()).is_err());
    }

    #[test]
    fn days_shorthand() {
        assert_eq!(days_ago(30, now()).unwrap(), now() - Duration::days(30));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let since = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(make_range(Some(since), Some(until)), Err(GridError::InvalidFilter { .. })));
        let range = make_range(Some(until), Some(since)).unwrap();
        assert_eq!(range.since, Some(until));
        assert_eq!(range.until, Some(since));
    }
}
