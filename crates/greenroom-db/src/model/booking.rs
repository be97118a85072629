use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A confirmed appointment. Append-only and immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::booking)]
#[diesel(check_for_backend(Pg))]
pub struct Booking {
    pub id: uuid::Uuid,
    pub token: String,
    pub guest_name: String,
    pub email: String,
    pub slot_start: chrono::DateTime<chrono::Utc>,
    pub notes: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert struct for new bookings.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::booking)]
pub struct NewBooking {
    pub id: uuid::Uuid,
    pub token: String,
    pub guest_name: String,
    pub email: String,
    pub slot_start: chrono::DateTime<chrono::Utc>,
    pub notes: String,
}
