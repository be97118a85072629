//! Availability template persistence.
//!
//! Slot computation reads through `effective_template`, which degrades to
//! the built-in fallback on any storage trouble so the public booking flow
//! keeps working while operators fix the record. Admin reads and writes are
//! strict.

use chrono::{DateTime, Utc};

use greenroom_db::db::connection::DbConnection;
use greenroom_db::query;
use greenroom_schedule::template::AvailabilityTemplate;

use crate::error::ServiceResult;

/// The stored template plus its concurrency revision.
#[derive(Debug, Clone)]
pub struct AvailabilityView {
    pub template: Option<AvailabilityTemplate>,
    pub revision: i64,
}

/// ## Summary
/// The template slot computation should use right now: the stored record
/// when present and readable, the built-in fallback otherwise.
pub async fn effective_template(conn: &mut DbConnection<'_>) -> AvailabilityTemplate {
    match query::availability::fetch(conn).await {
        Ok(Some(record)) => record.to_template(),
        Ok(None) => AvailabilityTemplate::fallback(),
        Err(error) => {
            tracing::warn!(%error, "Failed to read availability, using fallback template");
            AvailabilityTemplate::fallback()
        }
    }
}

/// ## Summary
/// Admin view of the stored record. Unlike `effective_template` this
/// propagates storage errors and reports an unset record as `None`.
///
/// ## Errors
/// Returns a database error if the read fails.
pub async fn admin_view(conn: &mut DbConnection<'_>) -> ServiceResult<AvailabilityView> {
    let record = query::availability::fetch(conn).await?;

    Ok(match record {
        Some(record) => AvailabilityView {
            template: Some(record.to_template()),
            revision: record.revision,
        },
        None => AvailabilityView {
            template: None,
            revision: 0,
        },
    })
}

/// ## Summary
/// Normalizes and saves the template wholesale.
///
/// With `expected_revision` the save is conditional (optimistic
/// concurrency); without it, last writer wins, as the original contract
/// allowed.
///
/// ## Errors
/// Returns `DbError::RevisionConflict` (wrapped) when a conditional save
/// loses, or a database error if the write fails.
pub async fn save(
    conn: &mut DbConnection<'_>,
    mut template: AvailabilityTemplate,
    expected_revision: Option<i64>,
    now: DateTime<Utc>,
) -> ServiceResult<AvailabilityView> {
    template.normalize();

    let record = query::availability::save(conn, &template, expected_revision, now).await?;

    tracing::info!(
        revision = record.revision,
        timezone = %record.timezone,
        "Availability saved"
    );

    Ok(AvailabilityView {
        template: Some(record.to_template()),
        revision: record.revision,
    })
}
