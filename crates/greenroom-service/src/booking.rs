//! The booking flow: the gate between "guest wants this slot" and "booking
//! is durably recorded".
//!
//! States run `received -> token_checked -> slot_checked -> persisted ->
//! token_consumed -> notified`; any failure short-circuits without
//! advancing. Persistence and token consumption share one transaction, so
//! losing the consume race rolls the insert back and a failed write never
//! burns the invite. Notification happens after commit and never unwinds a
//! booking.

use chrono::{DateTime, Utc};
use diesel_async::scoped_futures::ScopedFutureExt;

use greenroom_core::config::Settings;
use greenroom_db::db::connection::DbConnection;
use greenroom_db::db::transaction::with_transaction;
use greenroom_db::error::DbError;
use greenroom_db::model::booking::{Booking, NewBooking};
use greenroom_db::query;
use greenroom_schedule::slots::{Slot, compute_slots};

use crate::availability::effective_template;
use crate::error::{ServiceError, ServiceResult};
use crate::token::{self, InvalidReason, TokenGrant, TokenValidation, token_digest};

/// Raw booking submission, as received.
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub token: String,
    pub name: String,
    pub email: String,
    pub datetime: String,
    pub notes: String,
}

/// Trimmed, presence-checked request fields.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SanitizedRequest {
    token: String,
    name: String,
    email: String,
    datetime: String,
    notes: String,
}

impl BookingRequest {
    /// Trims every field and requires token, name, email, and datetime.
    fn sanitized(&self) -> Option<SanitizedRequest> {
        let token = self.token.trim();
        let name = self.name.trim();
        let email = self.email.trim();
        let datetime = self.datetime.trim();

        if token.is_empty() || name.is_empty() || email.is_empty() || datetime.is_empty() {
            return None;
        }

        Some(SanitizedRequest {
            token: token.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            datetime: datetime.to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}

/// Why a submission was turned away. Each maps to a caller-visible status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingRejection {
    /// A required field was absent.
    MissingFields,
    /// The invite failed validation.
    InvalidToken(InvalidReason),
    /// Email-match enforcement is on and the submitted address differs.
    EmailMismatch,
    /// The requested datetime is not among the currently computed slots.
    SlotUnavailable,
    /// Another booking claimed the same slot first.
    SlotTaken,
}

/// A booking that made it through the whole flow.
#[derive(Debug, Clone)]
pub struct ConfirmedBooking {
    pub booking: Booking,
    pub grant: TokenGrant,
    pub slot: Slot,
}

#[derive(Debug)]
pub enum BookingOutcome {
    Confirmed(Box<ConfirmedBooking>),
    Rejected(BookingRejection),
}

/// Transaction-internal error carrier: lets a rejection abort (and roll
/// back) without masquerading as an infrastructure failure.
enum TxnError {
    Service(ServiceError),
    Rejected(BookingRejection),
}

impl From<diesel::result::Error> for TxnError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Service(ServiceError::DieselError(error))
    }
}

/// Parses a submitted booking datetime (RFC 3339) into a UTC instant.
fn parse_booking_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// True when enforcement is on, the invite carries an address, and the
/// submitted one differs (case-insensitively).
fn email_mismatch(enforce: bool, invite_email: &str, submitted: &str) -> bool {
    let invite = invite_email.trim();
    enforce && !invite.is_empty() && !invite.eq_ignore_ascii_case(submitted.trim())
}

/// ## Summary
/// Runs the full booking flow for one submission.
///
/// The submitted datetime is checked against slots recomputed from the
/// template as stored *now*; client-claimed times are never trusted. Slot
/// collisions and token reuse are settled inside the storage transaction.
///
/// ## Errors
/// Returns an error for infrastructure failures (storage, unexpected
/// database errors). Policy refusals come back as
/// `BookingOutcome::Rejected` instead.
pub async fn submit(
    conn: &mut DbConnection<'_>,
    settings: &Settings,
    request: &BookingRequest,
    now: DateTime<Utc>,
) -> ServiceResult<BookingOutcome> {
    // received
    let Some(request) = request.sanitized() else {
        return Ok(BookingOutcome::Rejected(BookingRejection::MissingFields));
    };

    // token_checked
    let grant = match token::validate(conn, &settings.schedule, &request.token, now).await? {
        TokenValidation::Valid(grant) => grant,
        TokenValidation::Invalid(reason) => {
            return Ok(BookingOutcome::Rejected(BookingRejection::InvalidToken(
                reason,
            )));
        }
    };

    if email_mismatch(
        settings.schedule.enforce_email_match,
        &grant.email,
        &request.email,
    ) {
        tracing::info!(
            token_digest = %token_digest(&grant.token),
            "Booking rejected: submitted email does not match invite"
        );
        return Ok(BookingOutcome::Rejected(BookingRejection::EmailMismatch));
    }

    // slot_checked
    let Some(datetime) = parse_booking_datetime(&request.datetime) else {
        return Ok(BookingOutcome::Rejected(BookingRejection::SlotUnavailable));
    };

    let template = effective_template(conn).await;
    let slots = compute_slots(&template, now);
    let Some(slot) = slots.iter().find(|slot| slot.start == datetime).cloned() else {
        tracing::info!(
            token_digest = %token_digest(&grant.token),
            requested = %request.datetime,
            "Booking rejected: requested time is not an available slot"
        );
        return Ok(BookingOutcome::Rejected(BookingRejection::SlotUnavailable));
    };

    // persisted + token_consumed, atomically
    let new_booking = NewBooking {
        id: uuid::Uuid::now_v7(),
        token: grant.token.clone(),
        guest_name: request.name.clone(),
        email: request.email.clone(),
        slot_start: slot.start,
        notes: request.notes.clone(),
    };

    match persist_and_consume(conn, new_booking, grant.demo, now).await {
        Ok(booking) => {
            tracing::info!(
                booking_id = %booking.id,
                token_digest = %token_digest(&grant.token),
                slot_start = %booking.slot_start,
                "Booking confirmed"
            );
            Ok(BookingOutcome::Confirmed(Box::new(ConfirmedBooking {
                booking,
                grant,
                slot,
            })))
        }
        Err(TxnError::Rejected(rejection)) => Ok(BookingOutcome::Rejected(rejection)),
        Err(TxnError::Service(error)) => Err(error),
    }
}

/// Inserts the booking and consumes its token in one transaction. Demo
/// grants have no stored row, so their consume step is skipped.
async fn persist_and_consume(
    conn: &mut DbConnection<'_>,
    new_booking: NewBooking,
    demo: bool,
    now: DateTime<Utc>,
) -> Result<Booking, TxnError> {
    with_transaction(conn, |conn| {
        async move {
            let booking = query::booking::insert(conn, &new_booking)
                .await
                .map_err(|error| match error {
                    DbError::SlotTaken => TxnError::Rejected(BookingRejection::SlotTaken),
                    other => TxnError::Service(other.into()),
                })?;

            if !demo {
                let consumed = query::token::consume(conn, &new_booking.token, now)
                    .await
                    .map_err(|error| TxnError::Service(error.into()))?;
                if !consumed {
                    // Lost the single-use race; rolling back drops our insert.
                    return Err(TxnError::Rejected(BookingRejection::InvalidToken(
                        InvalidReason::AlreadyUsed,
                    )));
                }
            }

            Ok(booking)
        }
        .scope_boxed()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitized_trims_fields() {
        let request = BookingRequest {
            token: "  tok  ".to_string(),
            name: " Ada ".to_string(),
            email: " ada@example.com ".to_string(),
            datetime: " 2026-08-11T14:00:00Z ".to_string(),
            notes: "  ".to_string(),
        };

        let sanitized = request.sanitized().expect("all required fields present");
        assert_eq!(sanitized.token, "tok");
        assert_eq!(sanitized.name, "Ada");
        assert_eq!(sanitized.email, "ada@example.com");
        assert_eq!(sanitized.datetime, "2026-08-11T14:00:00Z");
        assert_eq!(sanitized.notes, "");
    }

    #[test]
    fn test_sanitized_rejects_missing_required_fields() {
        let mut request = BookingRequest {
            token: "tok".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            datetime: "2026-08-11T14:00:00Z".to_string(),
            notes: String::new(),
        };
        assert!(request.sanitized().is_some());

        request.name = "   ".to_string();
        assert!(request.sanitized().is_none());

        request.name = "Ada".to_string();
        request.datetime = String::new();
        assert!(request.sanitized().is_none());
    }

    #[test]
    fn test_parse_booking_datetime_accepts_wire_form() {
        let parsed = parse_booking_datetime("2026-08-11T14:00:00Z").expect("parses");
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2026, 8, 11, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_booking_datetime_normalizes_offsets() {
        let parsed = parse_booking_datetime("2026-08-11T09:00:00-05:00").expect("parses");
        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2026, 8, 11, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_booking_datetime_rejects_garbage() {
        assert!(parse_booking_datetime("tomorrow at nine").is_none());
        assert!(parse_booking_datetime("2026-08-11").is_none());
        assert!(parse_booking_datetime("").is_none());
    }

    #[test]
    fn test_email_mismatch_only_when_enforced() {
        assert!(!email_mismatch(false, "a@example.com", "b@example.com"));
        assert!(email_mismatch(true, "a@example.com", "b@example.com"));
    }

    #[test]
    fn test_email_match_is_case_insensitive() {
        assert!(!email_mismatch(true, "Guest@Example.com", "guest@example.com"));
        assert!(!email_mismatch(true, " guest@example.com ", "guest@example.com"));
    }

    #[test]
    fn test_email_mismatch_skipped_for_blank_invite_email() {
        assert!(!email_mismatch(true, "", "whoever@example.com"));
        assert!(!email_mismatch(true, "   ", "whoever@example.com"));
    }
}
