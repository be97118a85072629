//! Weekly availability template: the admin-configured recurring business
//! hours that slot expansion reads from.
//!
//! Field names follow the persisted JSON contract (`camelCase`). Templates are
//! normalized wholesale on read and on admin save; there are no partial
//! updates.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEZONE: &str = "America/Chicago";
pub const DEFAULT_SLOT_MINUTES: i64 = 30;
pub const DEFAULT_DAYS_AHEAD: i64 = 14;
pub const DEFAULT_START_OFFSET: i64 = 1;
pub const DEFAULT_WINDOW_START: &str = "09:00";
pub const DEFAULT_WINDOW_END: &str = "17:00";

/// Expansion range bounds. Values outside are clamped, never rejected.
pub const MIN_DAYS_AHEAD: i64 = 1;
pub const MAX_DAYS_AHEAD: i64 = 60;
pub const MIN_START_OFFSET: i64 = 0;
pub const MAX_START_OFFSET: i64 = 14;

/// One weekday's bookable window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_window_start")]
    pub start: String,
    #[serde(default = "default_window_end")]
    pub end: String,
}

impl DayWindow {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            start: DEFAULT_WINDOW_START.to_string(),
            end: DEFAULT_WINDOW_END.to_string(),
        }
    }

    #[must_use]
    pub fn enabled(start: &str, end: &str) -> Self {
        Self {
            enabled: true,
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Parses this window into `(start, end)` minutes since midnight.
    ///
    /// Returns `None` for malformed `HH:MM` values or an inverted/empty
    /// window; the day then contributes no slots.
    #[must_use]
    pub fn parse_window(&self) -> Option<(i64, i64)> {
        let start = parse_hhmm(&self.start)?;
        let end = parse_hhmm(&self.end)?;
        if end <= start {
            return None;
        }
        Some((start, end))
    }
}

fn default_window_start() -> String {
    DEFAULT_WINDOW_START.to_string()
}

fn default_window_end() -> String {
    DEFAULT_WINDOW_END.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_slot_minutes() -> i64 {
    DEFAULT_SLOT_MINUTES
}

fn default_days_ahead() -> i64 {
    DEFAULT_DAYS_AHEAD
}

fn default_start_offset() -> i64 {
    DEFAULT_START_OFFSET
}

/// The weekly recurring availability record.
///
/// `days` is indexed Sunday=0 through Saturday=6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityTemplate {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_slot_minutes")]
    pub slot_duration_minutes: i64,
    #[serde(default = "default_days_ahead")]
    pub days_ahead: i64,
    #[serde(default = "default_start_offset")]
    pub start_days_from_now: i64,
    #[serde(default)]
    pub days: Vec<DayWindow>,
}

impl AvailabilityTemplate {
    /// Default policy fields with no days configured; normalization turns
    /// this into a week of disabled windows.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            slot_duration_minutes: DEFAULT_SLOT_MINUTES,
            days_ahead: DEFAULT_DAYS_AHEAD,
            start_days_from_now: DEFAULT_START_OFFSET,
            days: Vec::new(),
        }
    }

    /// The built-in template used when no record has been saved yet:
    /// Monday through Friday, 09:00 to 17:00, Central time.
    #[must_use]
    pub fn fallback() -> Self {
        let mut days = vec![DayWindow::disabled()];
        for _ in 0..5 {
            days.push(DayWindow::enabled(DEFAULT_WINDOW_START, DEFAULT_WINDOW_END));
        }
        days.push(DayWindow::disabled());

        Self {
            days,
            ..Self::blank()
        }
    }

    /// ## Summary
    /// Normalizes the template in place: blank timezone falls back to the
    /// default and `days` is padded or truncated to exactly seven entries.
    ///
    /// Out-of-range numeric fields are left untouched here; the expansion
    /// clamps them per request so stored records round-trip unchanged.
    pub fn normalize(&mut self) {
        if self.timezone.trim().is_empty() {
            self.timezone = DEFAULT_TIMEZONE.to_string();
        } else {
            self.timezone = self.timezone.trim().to_string();
        }

        while self.days.len() < 7 {
            self.days.push(DayWindow::disabled());
        }
        self.days.truncate(7);
    }

    /// Slot duration with the positivity fallback applied.
    #[must_use]
    pub fn effective_slot_minutes(&self) -> i64 {
        if self.slot_duration_minutes > 0 {
            self.slot_duration_minutes
        } else {
            DEFAULT_SLOT_MINUTES
        }
    }

    /// Expansion day count, clamped into `[MIN_DAYS_AHEAD, MAX_DAYS_AHEAD]`.
    #[must_use]
    pub fn effective_days_ahead(&self) -> i64 {
        self.days_ahead.clamp(MIN_DAYS_AHEAD, MAX_DAYS_AHEAD)
    }

    /// Expansion start offset, clamped into `[MIN_START_OFFSET, MAX_START_OFFSET]`.
    #[must_use]
    pub fn effective_start_offset(&self) -> i64 {
        self.start_days_from_now
            .clamp(MIN_START_OFFSET, MAX_START_OFFSET)
    }

    /// The window for a weekday index (Sunday=0), if present.
    #[must_use]
    pub fn day(&self, weekday: usize) -> Option<&DayWindow> {
        self.days.get(weekday)
    }
}

impl Default for AvailabilityTemplate {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Parses an `HH:MM` wall-clock string into minutes since midnight.
///
/// Accepts one- or two-digit hours and exactly two-digit minutes, bounded to
/// `[00:00, 23:59]`. Anything else is `None`.
#[must_use]
pub fn parse_hhmm(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let (hours_part, minutes_part) = trimmed.split_once(':')?;

    if hours_part.is_empty()
        || hours_part.len() > 2
        || minutes_part.len() != 2
        || !hours_part.bytes().all(|b| b.is_ascii_digit())
        || !minutes_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let hours: i64 = hours_part.parse().ok()?;
    let minutes: i64 = minutes_part.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hhmm_valid() {
        assert_eq!(parse_hhmm("09:00"), Some(540));
        assert_eq!(parse_hhmm("9:00"), Some(540));
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("23:59"), Some(1439));
        assert_eq!(parse_hhmm(" 17:30 "), Some(1050));
    }

    #[test]
    fn test_parse_hhmm_rejects_malformed() {
        assert_eq!(parse_hhmm(""), None);
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("12:5"), None);
        assert_eq!(parse_hhmm("12:005"), None);
        assert_eq!(parse_hhmm("noon"), None);
        assert_eq!(parse_hhmm("12-30"), None);
        assert_eq!(parse_hhmm("-1:30"), None);
    }

    #[test]
    fn test_parse_window_inverted_is_none() {
        let window = DayWindow::enabled("17:00", "09:00");
        assert_eq!(window.parse_window(), None);

        let empty = DayWindow::enabled("09:00", "09:00");
        assert_eq!(empty.parse_window(), None);
    }

    #[test]
    fn test_parse_window_malformed_is_none() {
        let window = DayWindow::enabled("nine", "17:00");
        assert_eq!(window.parse_window(), None);
    }

    #[test]
    fn test_normalize_pads_days_to_seven() {
        let mut template = AvailabilityTemplate {
            timezone: "  ".to_string(),
            slot_duration_minutes: 30,
            days_ahead: 14,
            start_days_from_now: 1,
            days: vec![DayWindow::enabled("10:00", "12:00")],
        };
        template.normalize();

        assert_eq!(template.timezone, DEFAULT_TIMEZONE);
        assert_eq!(template.days.len(), 7);
        assert!(template.days[0].enabled);
        assert!(!template.days[6].enabled);
    }

    #[test]
    fn test_normalize_truncates_extra_days() {
        let mut template = AvailabilityTemplate::fallback();
        template.days.push(DayWindow::disabled());
        template.days.push(DayWindow::disabled());
        template.normalize();
        assert_eq!(template.days.len(), 7);
    }

    #[test]
    fn test_effective_clamps() {
        let mut template = AvailabilityTemplate::fallback();

        template.days_ahead = 1000;
        assert_eq!(template.effective_days_ahead(), MAX_DAYS_AHEAD);

        template.days_ahead = 0;
        assert_eq!(template.effective_days_ahead(), MIN_DAYS_AHEAD);

        template.start_days_from_now = -5;
        assert_eq!(template.effective_start_offset(), 0);

        template.start_days_from_now = 99;
        assert_eq!(template.effective_start_offset(), MAX_START_OFFSET);

        template.slot_duration_minutes = 0;
        assert_eq!(template.effective_slot_minutes(), DEFAULT_SLOT_MINUTES);

        template.slot_duration_minutes = -15;
        assert_eq!(template.effective_slot_minutes(), DEFAULT_SLOT_MINUTES);
    }

    #[test]
    fn test_fallback_enables_weekdays_only() {
        let template = AvailabilityTemplate::fallback();
        assert_eq!(template.days.len(), 7);
        assert!(!template.days[0].enabled, "Sunday should be disabled");
        for weekday in 1..=5 {
            assert!(template.days[weekday].enabled);
        }
        assert!(!template.days[6].enabled, "Saturday should be disabled");
    }

    #[test]
    fn test_wire_shape_round_trip() {
        let template = AvailabilityTemplate::fallback();
        let json = serde_json::to_value(&template).expect("serializes");

        assert_eq!(json["timezone"], "America/Chicago");
        assert_eq!(json["slotDurationMinutes"], 30);
        assert_eq!(json["daysAhead"], 14);
        assert_eq!(json["startDaysFromNow"], 1);
        assert_eq!(json["days"].as_array().map(Vec::len), Some(7));
        assert_eq!(json["days"][1]["start"], "09:00");

        let back: AvailabilityTemplate = serde_json::from_value(json).expect("deserializes");
        assert_eq!(back, template);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let template: AvailabilityTemplate = serde_json::from_str("{}").expect("deserializes");
        assert_eq!(template.timezone, DEFAULT_TIMEZONE);
        assert_eq!(template.slot_duration_minutes, DEFAULT_SLOT_MINUTES);
        assert_eq!(template.days_ahead, DEFAULT_DAYS_AHEAD);
        assert_eq!(template.start_days_from_now, DEFAULT_START_OFFSET);
        assert!(template.days.is_empty());
    }
}
