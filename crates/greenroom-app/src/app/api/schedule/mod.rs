//! Schedule API handlers: guest-facing token/slot/booking endpoints plus
//! the admin-gated availability and invite management.

mod admin;
mod book;
mod ics;
mod slots;
mod validate;

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Response, Router};
use serde::Serialize;

use greenroom_core::constants::ADMIN_ROUTE_COMPONENT;
use greenroom_service::token::InvalidReason;

use crate::middleware::admin_auth::AdminAuthMiddleware;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(greenroom_core::constants::SCHEDULE_ROUTE_COMPONENT)
        .push(Router::with_path("validate").post(validate::validate_token))
        .push(Router::with_path("slots").post(slots::list_slots))
        .push(Router::with_path("book").post(book::submit_booking))
        .push(Router::with_path("ics").get(ics::booking_ics))
        .push(
            Router::with_path(ADMIN_ROUTE_COMPONENT)
                .hoop(AdminAuthMiddleware)
                .push(Router::with_path("availability/get").post(admin::get_availability))
                .push(Router::with_path("availability/set").post(admin::set_availability))
                .push(Router::with_path("invite").post(admin::create_invite)),
        )
}

/// Error payload shared by every schedule endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

pub(crate) fn render_error(res: &mut Response, status: StatusCode, message: &str) {
    res.status_code(status);
    res.render(Json(ErrorBody {
        ok: false,
        error: message.to_string(),
    }));
}

/// Caller-visible mapping for token validation failures.
///
/// Token-state reasons share one deliberately vague message; which of
/// not-found / expired / already-used applied is only in the logs.
pub(crate) fn reason_response(reason: InvalidReason) -> (StatusCode, &'static str) {
    match reason {
        InvalidReason::Missing
        | InvalidReason::NotFound
        | InvalidReason::Expired
        | InvalidReason::AlreadyUsed => (StatusCode::UNAUTHORIZED, "Invalid or expired invite link"),
        InvalidReason::StorageUnavailable => (
            StatusCode::NOT_IMPLEMENTED,
            "Schedule token storage not configured",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_state_reasons_share_generic_message() {
        let (status, message) = reason_response(InvalidReason::NotFound);
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        for reason in [
            InvalidReason::Missing,
            InvalidReason::Expired,
            InvalidReason::AlreadyUsed,
        ] {
            assert_eq!(reason_response(reason), (status, message));
        }
    }

    #[test]
    fn test_storage_unavailable_maps_to_not_implemented() {
        let (status, _message) = reason_response(InvalidReason::StorageUnavailable);
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    }
}
