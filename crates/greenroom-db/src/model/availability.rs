use diesel::{pg::Pg, prelude::*};

use greenroom_schedule::template::{AvailabilityTemplate, DayWindow};

use crate::db::schema;
use crate::error::DbResult;

/// The single stored availability record.
///
/// `revision` increments on every save so admin clients can detect a
/// concurrent edit; it is not part of the template contract itself.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::availability)]
#[diesel(check_for_backend(Pg))]
pub struct AvailabilityRecord {
    pub id: String,
    pub timezone: String,
    pub slot_duration_minutes: i64,
    pub days_ahead: i64,
    pub start_days_from_now: i64,
    pub days: serde_json::Value,
    pub revision: i64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AvailabilityRecord {
    /// ## Summary
    /// Rebuilds the template from the stored columns.
    ///
    /// A `days` payload that no longer deserializes is treated as absent
    /// (the template normalizes to seven disabled days) instead of failing
    /// the read; the scheduling layer is lenient about half-broken records.
    #[must_use]
    pub fn to_template(&self) -> AvailabilityTemplate {
        let days: Vec<DayWindow> =
            serde_json::from_value(self.days.clone()).unwrap_or_default();

        let mut template = AvailabilityTemplate {
            timezone: self.timezone.clone(),
            slot_duration_minutes: self.slot_duration_minutes,
            days_ahead: self.days_ahead,
            start_days_from_now: self.start_days_from_now,
            days,
        };
        template.normalize();
        template
    }
}

/// Insert struct for the availability record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::availability)]
pub struct NewAvailabilityRecord {
    pub id: String,
    pub timezone: String,
    pub slot_duration_minutes: i64,
    pub days_ahead: i64,
    pub start_days_from_now: i64,
    pub days: serde_json::Value,
    pub revision: i64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl NewAvailabilityRecord {
    /// ## Summary
    /// Builds the row for a normalized template.
    ///
    /// ## Errors
    /// Returns an error if the day windows fail to serialize.
    pub fn from_template(
        id: &str,
        template: &AvailabilityTemplate,
        now: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<Self> {
        Ok(Self {
            id: id.to_string(),
            timezone: template.timezone.clone(),
            slot_duration_minutes: template.slot_duration_minutes,
            days_ahead: template.days_ahead,
            start_days_from_now: template.start_days_from_now,
            days: serde_json::to_value(&template.days)?,
            revision: 0,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_round_trips_template() {
        let mut template = AvailabilityTemplate::fallback();
        template.normalize();

        let now = chrono::Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let new_record =
            NewAvailabilityRecord::from_template("default", &template, now).expect("serializes");

        let record = AvailabilityRecord {
            id: new_record.id,
            timezone: new_record.timezone,
            slot_duration_minutes: new_record.slot_duration_minutes,
            days_ahead: new_record.days_ahead,
            start_days_from_now: new_record.start_days_from_now,
            days: new_record.days,
            revision: 0,
            updated_at: now,
        };

        assert_eq!(record.to_template(), template);
    }

    #[test_log::test]
    fn test_corrupt_days_payload_degrades_to_disabled_week() {
        let now = chrono::Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let record = AvailabilityRecord {
            id: "default".to_string(),
            timezone: "America/Chicago".to_string(),
            slot_duration_minutes: 30,
            days_ahead: 14,
            start_days_from_now: 1,
            days: serde_json::json!("not an array"),
            revision: 3,
            updated_at: now,
        };

        let template = record.to_template();
        assert_eq!(template.days.len(), 7);
        assert!(template.days.iter().all(|day| !day.enabled));
    }
}
