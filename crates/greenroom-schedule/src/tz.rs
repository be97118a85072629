//! Timezone resolution and wall-clock to UTC conversion.
//!
//! Uses ICU4X for IANA canonicalization (aliases like `US/Central`) and
//! chrono-tz for the actual offset lookups, so DST transitions resolve
//! exactly rather than through an offset-guess iteration.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::iana::IanaParserExtended;
use std::str::FromStr;

use crate::error::ScheduleError;

/// ## Summary
/// Resolves an IANA timezone name to a `chrono_tz::Tz`.
///
/// The name is canonicalized first so deprecated aliases
/// (`US/Central` -> `America/Chicago`, `Europe/Kiev` -> `Europe/Kyiv`)
/// resolve like their canonical forms.
///
/// ## Errors
/// Returns `ScheduleError::UnknownTimezone` if the name is not a known IANA
/// zone. Callers that need a last-resort fallback decide it themselves; this
/// layer never silently substitutes a zone.
pub fn resolve_zone(name: &str) -> Result<Tz, ScheduleError> {
    let canonical = canonicalize_zone_name(name.trim());

    Tz::from_str(&canonical).map_err(|_e| ScheduleError::UnknownTimezone(name.to_string()))
}

/// Canonicalizes an IANA timezone identifier, returning the input unchanged
/// when ICU does not recognize it.
fn canonicalize_zone_name(name: &str) -> String {
    let parser = IanaParserExtended::new();
    let parsed = parser.parse(name);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    name.to_string()
}

/// ## Summary
/// Converts a civil date plus minutes-since-midnight in `tz` to the UTC
/// instant, handling DST transitions.
///
/// - Unambiguous wall-clock times map to their single instant.
/// - Times inside a fall-back fold map to the earlier instant
///   (pre-transition, the RFC 5545 convention).
/// - Times inside a spring-forward gap do not exist and return `None`;
///   slot expansion skips them rather than inventing an instant.
///
/// Returns `None` as well if `minutes_from_midnight` does not form a valid
/// time of day.
#[must_use]
pub fn local_to_utc(date: NaiveDate, minutes_from_midnight: i64, tz: Tz) -> Option<DateTime<Utc>> {
    let hours = u32::try_from(minutes_from_midnight / 60).ok()?;
    let minutes = u32::try_from(minutes_from_midnight % 60).ok()?;
    let time = NaiveTime::from_hms_opt(hours, minutes, 0)?;
    let local = NaiveDateTime::new(date, time);

    match tz.from_local_datetime(&local) {
        LocalResult::None => None,
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, _second) => Some(first.with_timezone(&Utc)),
    }
}

/// Formats a UTC instant as the wire form used for slot ids and booking
/// datetimes: second precision, `Z` suffix.
#[must_use]
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn test_resolve_standard_zone() {
        let tz = resolve_zone("America/Chicago").expect("should resolve");
        assert_eq!(tz, Tz::America__Chicago);
    }

    #[test]
    fn test_resolve_canonicalizes_aliases() {
        assert_eq!(
            resolve_zone("US/Central").expect("alias resolves"),
            Tz::America__Chicago
        );
        assert_eq!(
            resolve_zone("Europe/Kiev").expect("alias resolves"),
            Tz::Europe__Kyiv
        );
    }

    #[test]
    fn test_resolve_unknown_zone_errors() {
        let err = resolve_zone("Mars/Olympus_Mons").expect_err("should fail");
        assert!(matches!(err, ScheduleError::UnknownTimezone(_)));
    }

    #[test]
    fn test_local_to_utc_standard_time() {
        // January in Chicago is CST, UTC-6.
        let utc = local_to_utc(date(2026, 1, 13), 9 * 60, Tz::America__Chicago)
            .expect("unambiguous time");
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 1, 13, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_local_to_utc_daylight_time() {
        // July in Chicago is CDT, UTC-5.
        let utc = local_to_utc(date(2026, 7, 14), 9 * 60, Tz::America__Chicago)
            .expect("unambiguous time");
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 7, 14, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_spring_forward_gap_is_none() {
        // 2026-03-08 02:30 does not exist in Chicago; clocks jump 02:00 -> 03:00.
        assert_eq!(
            local_to_utc(date(2026, 3, 8), 2 * 60 + 30, Tz::America__Chicago),
            None
        );
    }

    #[test]
    fn test_fall_back_fold_takes_earlier_instant() {
        // 2026-11-01 01:30 occurs twice in Chicago; the CDT (UTC-5) reading wins.
        let utc = local_to_utc(date(2026, 11, 1), 60 + 30, Tz::America__Chicago)
            .expect("ambiguous time resolves");
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 11, 1, 6, 30, 0).unwrap());
    }

    #[test]
    fn test_format_instant_wire_shape() {
        let instant = Utc.with_ymd_and_hms(2026, 8, 11, 14, 0, 0).unwrap();
        assert_eq!(format_instant(instant), "2026-08-11T14:00:00Z");
    }
}
