use chrono::Utc;
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, handler};
use serde::{Deserialize, Serialize};
use tracing::error;

use greenroom_core::constants::SCHEDULE_ROUTE_PREFIX;
use greenroom_service::booking::{BookingOutcome, BookingRejection, BookingRequest, submit};

use super::{reason_response, render_error};
use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;
use crate::notifier_handler::get_notifier_from_depot;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BookRequest {
    token: String,
    name: String,
    email: String,
    datetime: String,
    notes: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookResponse {
    ok: bool,
    booking_id: String,
    guest_email_sent: bool,
    host_email_sent: bool,
}

/// ## Summary
/// POST /api/schedule/book - submits a booking for a slot.
///
/// The datetime is validated against slots recomputed server-side; the
/// invite is consumed in the same transaction that records the booking.
/// Confirmation emails are best-effort and reported as response flags.
///
/// ## Errors
/// Returns HTTP 400 for missing fields or an unavailable time, 401 for an
/// invalid invite, 403 on an enforced email mismatch, 409 when another
/// booking claimed the slot first, 503 when storage cannot be reached, and
/// 500 on storage failure.
#[handler]
pub async fn submit_booking(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: BookRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(_e) => {
            render_error(res, StatusCode::BAD_REQUEST, "Invalid JSON");
            return;
        }
    };

    let settings = match get_config_from_depot(depot) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = ?e, "Failed to get config from depot");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            return;
        }
    };

    let notifier = match get_notifier_from_depot(depot) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!(error = ?e, "Failed to get notifier");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            render_error(res, StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable");
            return;
        }
    };

    let request = BookingRequest {
        token: body.token,
        name: body.name,
        email: body.email,
        datetime: body.datetime,
        notes: body.notes,
    };

    let outcome = match submit(&mut conn, &settings, &request, Utc::now()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = ?e, "Booking submission failed");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Failed to save booking");
            return;
        }
    };

    let confirmed = match outcome {
        BookingOutcome::Confirmed(confirmed) => confirmed,
        BookingOutcome::Rejected(rejection) => {
            let (status, message) = rejection_response(rejection);
            render_error(res, status, message);
            return;
        }
    };

    // notified: best-effort, never unwinds the booking
    let ics_url = format!(
        "{origin}{SCHEDULE_ROUTE_PREFIX}/ics?bookingId={id}&token={token}",
        origin = settings.server.origin(),
        id = confirmed.booking.id,
        token = confirmed.grant.token,
    );
    let email_status = notifier
        .send_booking_confirmations(&confirmed.booking, &confirmed.slot, &ics_url)
        .await;

    res.status_code(StatusCode::OK);
    res.render(Json(BookResponse {
        ok: true,
        booking_id: confirmed.booking.id.to_string(),
        guest_email_sent: email_status.guest_sent,
        host_email_sent: email_status.host_sent,
    }));
}

fn rejection_response(rejection: BookingRejection) -> (StatusCode, &'static str) {
    match rejection {
        BookingRejection::MissingFields => (StatusCode::BAD_REQUEST, "Missing required fields"),
        BookingRejection::InvalidToken(reason) => reason_response(reason),
        BookingRejection::EmailMismatch => {
            (StatusCode::FORBIDDEN, "Email does not match invite")
        }
        BookingRejection::SlotUnavailable => {
            (StatusCode::BAD_REQUEST, "Requested time is not available")
        }
        BookingRejection::SlotTaken => (
            StatusCode::CONFLICT,
            "Requested time is no longer available",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenroom_service::token::InvalidReason;

    #[test]
    fn test_rejection_status_mapping() {
        assert_eq!(
            rejection_response(BookingRejection::MissingFields).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            rejection_response(BookingRejection::InvalidToken(InvalidReason::Expired)).0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            rejection_response(BookingRejection::EmailMismatch).0,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            rejection_response(BookingRejection::SlotUnavailable).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            rejection_response(BookingRejection::SlotTaken).0,
            StatusCode::CONFLICT
        );
    }
}
