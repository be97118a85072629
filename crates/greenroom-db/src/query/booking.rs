//! Booking queries.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema;
use crate::error::{DbError, DbResult};
use crate::model::booking::{Booking, NewBooking};

/// ## Summary
/// Appends a booking row.
///
/// The unique index on `slot_start` is the cross-token double-booking
/// guard: the second insert for the same instant fails and surfaces as
/// `DbError::SlotTaken`.
///
/// ## Errors
/// Returns `DbError::SlotTaken` when the slot is already claimed, or the
/// underlying database error otherwise.
pub async fn insert(conn: &mut DbConnection<'_>, booking: &NewBooking) -> DbResult<Booking> {
    let row = diesel::insert_into(schema::booking::table)
        .values(booking)
        .returning(Booking::as_select())
        .get_result::<Booking>(conn)
        .await
        .map_err(|error| match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _info) => {
                DbError::SlotTaken
            }
            other => DbError::DatabaseError(other),
        })?;

    Ok(row)
}

/// ## Summary
/// Fetches a booking by id.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn fetch(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> DbResult<Option<Booking>> {
    let row = schema::booking::table
        .find(id)
        .select(Booking::as_select())
        .first::<Booking>(conn)
        .await
        .optional()?;

    Ok(row)
}
