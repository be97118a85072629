use chrono::Utc;
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, handler};
use serde::{Deserialize, Serialize};
use tracing::error;

use greenroom_schedule::slots::{Slot, compute_slots};
use greenroom_service::availability::effective_template;
use greenroom_service::token::{self, TokenValidation};

use super::{reason_response, render_error};
use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SlotsRequest {
    token: String,
}

#[derive(Debug, Serialize)]
struct SlotsResponse {
    ok: bool,
    slots: Vec<Slot>,
}

/// ## Summary
/// POST /api/schedule/slots - returns the server-computed slots for a valid
/// invite token.
///
/// Slots are recomputed from the stored template on every call; an empty
/// list is a normal "no times available" answer, not an error.
///
/// ## Errors
/// Returns HTTP 400 for an unreadable body, 401 for an invalid token, 503
/// when storage cannot be reached, and 500 on lookup failure.
#[handler]
pub async fn list_slots(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: SlotsRequest = match req.parse_json().await {
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

    let now = Utc::now();

    match token::validate(&mut conn, &settings.schedule, &body.token, now).await {
        Ok(TokenValidation::Valid(_grant)) => {}
        Ok(TokenValidation::Invalid(reason)) => {
            let (status, message) = reason_response(reason);
            render_error(res, status, message);
            return;
        }
        Err(e) => {
            error!(error = ?e, "Token validation failed");
            render_error(
                res,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Schedule token storage read error",
            );
            return;
        }
    }

    let template = effective_template(&mut conn).await;
    let slots = compute_slots(&template, now);

    tracing::debug!(slot_count = slots.len(), "Computed slots for invite");

    res.status_code(StatusCode::OK);
    res.render(Json(SlotsResponse { ok: true, slots }));
}
