use chrono::{Duration, Utc};
use salvo::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use salvo::http::{HeaderValue, StatusCode};
use salvo::{Depot, Request, Response, handler};
use tracing::error;

use greenroom_schedule::ics::{IcsEvent, build_ics};

use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;

const DEFAULT_DURATION_MINUTES: i64 = 30;
const MIN_DURATION_MINUTES: i64 = 5;
const MAX_DURATION_MINUTES: i64 = 240;

const EVENT_SUMMARY: &str = "Podcast Recording";

fn render_text(res: &mut Response, status: StatusCode, message: &str) {
    res.status_code(status);
    res.render(message.to_string());
}

/// Host part of the public origin, for calendar UIDs.
fn origin_host(origin: &str) -> &str {
    origin
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
}

/// ## Summary
/// `GET /api/schedule/ics?bookingId=&token=&duration=` - downloads the
/// calendar file for a confirmed booking.
///
/// The caller must present the booking's own invite token; possession of
/// the booking id alone is not enough. Duration is clamped to [5, 240]
/// minutes.
///
/// ## Errors
/// Returns HTTP 400 for missing parameters, 403 for a token mismatch, 404
/// for an unknown booking, 503 when storage cannot be reached, and 500 on
/// lookup failure.
#[handler]
pub async fn booking_ics(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let booking_id = req.query::<String>("bookingId").unwrap_or_default();
    let token = req.query::<String>("token").unwrap_or_default();

    if booking_id.trim().is_empty() || token.trim().is_empty() {
        render_text(res, StatusCode::BAD_REQUEST, "Missing bookingId or token");
        return;
    }

    let Ok(booking_id) = uuid::Uuid::parse_str(booking_id.trim()) else {
        render_text(res, StatusCode::BAD_REQUEST, "Invalid bookingId");
        return;
    };

    let duration_minutes = req
        .query::<i64>("duration")
        .unwrap_or(DEFAULT_DURATION_MINUTES)
        .clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES);

    let settings = match get_config_from_depot(depot) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = ?e, "Failed to get config from depot");
            render_text(res, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            render_text(res, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            render_text(res, StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable");
            return;
        }
    };

    let booking = match greenroom_db::query::booking::fetch(&mut conn, booking_id).await {
        Ok(Some(booking)) => booking,
        Ok(None) => {
            render_text(res, StatusCode::NOT_FOUND, "Not found");
            return;
        }
        Err(e) => {
            error!(error = ?e, "Booking lookup failed");
            render_text(res, StatusCode::INTERNAL_SERVER_ERROR, "Failed to load booking");
            return;
        }
    };

    if booking.token != token.trim() {
        render_text(res, StatusCode::FORBIDDEN, "Forbidden");
        return;
    }

    let mut description_lines = vec![
        "Your recording appointment details:".to_string(),
        format!("Guest: {}", booking.guest_name),
        format!("Email: {}", booking.email),
    ];
    if !booking.notes.is_empty() {
        description_lines.push(format!("Notes: {}", booking.notes));
    }
    description_lines.push(format!("Booking ID: {}", booking.id));

    let event = IcsEvent {
        uid: format!("{}@{}", booking.id, origin_host(&settings.server.origin())),
        start: booking.slot_start,
        end: booking.slot_start + Duration::minutes(duration_minutes),
        summary: EVENT_SUMMARY.to_string(),
        description: description_lines.join("\n"),
    };

    let ics = build_ics(&event, Utc::now());

    res.status_code(StatusCode::OK);
    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/calendar; charset=utf-8"),
    );
    res.headers_mut().insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"recording.ics\""),
    );
    if let Err(e) = res.write_body(ics) {
        error!(error = ?e, "Failed to write ICS body");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_host_strips_scheme_and_slash() {
        assert_eq!(origin_host("https://booking.example.com"), "booking.example.com");
        assert_eq!(origin_host("http://localhost:8720/"), "localhost:8720");
        assert_eq!(origin_host("booking.example.com"), "booking.example.com");
    }
}
