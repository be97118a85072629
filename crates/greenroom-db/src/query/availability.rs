//! Availability record queries.
//!
//! The availability template is one row under a fixed key. Saves bump a
//! revision counter; callers that pass their last-seen revision get
//! optimistic-concurrency semantics, callers that omit it keep the
//! historical last-writer-wins behavior.

use diesel::upsert::excluded;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use greenroom_core::constants::AVAILABILITY_RECORD_ID;
use greenroom_schedule::template::AvailabilityTemplate;

use crate::db::connection::DbConnection;
use crate::db::schema;
use crate::error::{DbError, DbResult};
use crate::model::availability::{AvailabilityRecord, NewAvailabilityRecord};

/// ## Summary
/// Reads the availability record, if one has been saved.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn fetch(conn: &mut DbConnection<'_>) -> DbResult<Option<AvailabilityRecord>> {
    let row = schema::availability::table
        .find(AVAILABILITY_RECORD_ID)
        .select(AvailabilityRecord::as_select())
        .first::<AvailabilityRecord>(conn)
        .await
        .optional()?;

    Ok(row)
}

/// ## Summary
/// Saves the (already normalized) template.
///
/// With `expected_revision`, the write only lands if the stored revision
/// still matches; a mismatch means another admin saved in between and the
/// caller should re-fetch. Without it, the record is upserted
/// unconditionally and the revision still increments.
///
/// ## Errors
/// Returns `DbError::RevisionConflict` when a conditional save loses, or
/// the underlying database error otherwise.
pub async fn save(
    conn: &mut DbConnection<'_>,
    template: &AvailabilityTemplate,
    expected_revision: Option<i64>,
    now: chrono::DateTime<chrono::Utc>,
) -> DbResult<AvailabilityRecord> {
    let record = NewAvailabilityRecord::from_template(AVAILABILITY_RECORD_ID, template, now)?;

    if let Some(expected) = expected_revision {
        let updated = diesel::update(schema::availability::table)
            .filter(schema::availability::id.eq(AVAILABILITY_RECORD_ID))
            .filter(schema::availability::revision.eq(expected))
            .set((
                schema::availability::timezone.eq(&record.timezone),
                schema::availability::slot_duration_minutes.eq(record.slot_duration_minutes),
                schema::availability::days_ahead.eq(record.days_ahead),
                schema::availability::start_days_from_now.eq(record.start_days_from_now),
                schema::availability::days.eq(&record.days),
                schema::availability::revision.eq(expected + 1),
                schema::availability::updated_at.eq(now),
            ))
            .returning(AvailabilityRecord::as_select())
            .get_result::<AvailabilityRecord>(conn)
            .await
            .optional()?;

        return updated.ok_or(DbError::RevisionConflict);
    }

    let row = diesel::insert_into(schema::availability::table)
        .values(&record)
        .on_conflict(schema::availability::id)
        .do_update()
        .set((
            schema::availability::timezone.eq(excluded(schema::availability::timezone)),
            schema::availability::slot_duration_minutes
                .eq(excluded(schema::availability::slot_duration_minutes)),
            schema::availability::days_ahead.eq(excluded(schema::availability::days_ahead)),
            schema::availability::start_days_from_now
                .eq(excluded(schema::availability::start_days_from_now)),
            schema::availability::days.eq(excluded(schema::availability::days)),
            schema::availability::revision.eq(schema::availability::revision + 1),
            schema::availability::updated_at.eq(now),
        ))
        .returning(AvailabilityRecord::as_select())
        .get_result::<AvailabilityRecord>(conn)
        .await?;

    Ok(row)
}
