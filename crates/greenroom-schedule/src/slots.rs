//! Slot expansion: turns a weekly availability template into the finite,
//! ordered list of bookable intervals for the next N days.

use chrono::{DateTime, Datelike, Duration, Utc};
use chrono_tz::Tz;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::template::AvailabilityTemplate;
use crate::tz::{format_instant, local_to_utc, resolve_zone};

/// A discrete bookable interval, derived from the template and never
/// persisted. The UTC start instant doubles as the slot id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
    pub day_label: String,
    pub time_label: String,
    pub label: String,
}

impl Slot {
    /// The wire identifier: the start instant in second-precision ISO form.
    #[must_use]
    pub fn id(&self) -> String {
        format_instant(self.start)
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Slot", 7)?;
        state.serialize_field("id", &self.id())?;
        state.serialize_field("start", &format_instant(self.start))?;
        state.serialize_field("end", &format_instant(self.end))?;
        state.serialize_field("durationMinutes", &self.duration_minutes)?;
        state.serialize_field("dayLabel", &self.day_label)?;
        state.serialize_field("timeLabel", &self.time_label)?;
        state.serialize_field("label", &self.label)?;
        state.end()
    }
}

/// ## Summary
/// Expands `template` into the ordered slot list as of `now`.
///
/// Deterministic and side-effect-free: two calls with the same template and
/// the same `now` produce identical slot sets. Cost is bounded by the
/// expansion clamps, so recomputing per request is cheap enough that no
/// caching layer exists.
///
/// Per day, in order:
/// - the weekday is observed in the template's timezone, not the server's,
///   so a server near midnight cannot shift the day by one;
/// - disabled days, malformed windows, and inverted windows contribute zero
///   slots;
/// - the window is walked in duration-sized steps, dropping any trailing
///   partial interval;
/// - wall-clock positions erased by a spring-forward transition are skipped.
///
/// An unrecognized template timezone logs a warning and falls back to UTC
/// interpretation so availability does not vanish outright on a bad save.
#[must_use]
pub fn compute_slots(template: &AvailabilityTemplate, now: DateTime<Utc>) -> Vec<Slot> {
    let tz = match resolve_zone(&template.timezone) {
        Ok(tz) => tz,
        Err(error) => {
            tracing::warn!(
                timezone = %template.timezone,
                %error,
                "Unrecognized availability timezone, interpreting business hours as UTC"
            );
            Tz::UTC
        }
    };

    let slot_minutes = template.effective_slot_minutes();
    let days_ahead = template.effective_days_ahead();
    let start_offset = template.effective_start_offset();

    let mut slots = Vec::new();

    for day_offset in 0..days_ahead {
        let day_instant = now + Duration::days(start_offset + day_offset);
        let civil_date = day_instant.with_timezone(&tz).date_naive();
        let weekday = usize::try_from(civil_date.weekday().num_days_from_sunday())
            .unwrap_or_default();

        let Some(window) = template.day(weekday) else {
            continue;
        };
        if !window.enabled {
            continue;
        }
        let Some((window_start, window_end)) = window.parse_window() else {
            continue;
        };

        let mut position = window_start;
        while position + slot_minutes <= window_end {
            if let Some(start) = local_to_utc(civil_date, position, tz) {
                let end = start + Duration::minutes(slot_minutes);
                let local_start = start.with_timezone(&tz);

                slots.push(Slot {
                    start,
                    end,
                    duration_minutes: slot_minutes,
                    day_label: local_start.format("%A, %B %-d").to_string(),
                    time_label: local_start.format("%-I:%M %p").to_string(),
                    label: local_start.format("%a, %b %-d, %-I:%M %p").to_string(),
                });
            }
            position += slot_minutes;
        }
    }

    slots
}

/// ## Summary
/// Membership check for a proposed booking instant: true iff it equals some
/// slot's start exactly. Near misses are misses.
#[must_use]
pub fn datetime_in_slots(datetime: DateTime<Utc>, slots: &[Slot]) -> bool {
    slots.iter().any(|slot| slot.start == datetime)
}
