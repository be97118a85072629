//! Admin endpoints: availability read/save and invite creation. The
//! `AdminAuthMiddleware` hoop has already authenticated the caller by the
//! time these run.

use chrono::Utc;
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, handler};
use serde::{Deserialize, Serialize};
use tracing::error;

use greenroom_db::error::DbError;
use greenroom_schedule::template::AvailabilityTemplate;
use greenroom_service::availability;
use greenroom_service::error::ServiceError;
use greenroom_service::token;

use super::render_error;
use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;

const DEFAULT_INVITE_DAYS: i64 = 7;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SetAvailabilityRequest {
    availability: Option<AvailabilityTemplate>,
    /// Last revision this admin session saw; omit for last-writer-wins.
    expected_revision: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    ok: bool,
    availability: Option<AvailabilityTemplate>,
    revision: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InviteRequest {
    email: String,
    name: Option<String>,
    days: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InviteResponse {
    ok: bool,
    token: String,
    expires_at: i64,
    invite_url: String,
}

/// ## Summary
/// POST /api/schedule/admin/availability/get - reads the stored template.
/// `availability` is null until the first save.
///
/// ## Errors
/// Returns HTTP 503 when storage cannot be reached and 500 on read failure.
#[handler]
pub async fn get_availability(depot: &mut Depot, res: &mut Response) {
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

    match availability::admin_view(&mut conn).await {
        Ok(view) => {
            res.status_code(StatusCode::OK);
            res.render(Json(AvailabilityResponse {
                ok: true,
                availability: view.template,
                revision: view.revision,
            }));
        }
        Err(e) => {
            error!(error = ?e, "Failed to read availability");
            render_error(
                res,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read availability",
            );
        }
    }
}

/// ## Summary
/// POST /api/schedule/admin/availability/set - replaces the template
/// wholesale. With `expectedRevision` the save is refused (HTTP 409) if
/// another session saved in between.
///
/// ## Errors
/// Returns HTTP 400 for an unreadable body, 409 on a revision conflict,
/// 503 when storage cannot be reached, and 500 on write failure.
#[handler]
pub async fn set_availability(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: SetAvailabilityRequest = match req.parse_json().await {
        Ok(body) => body,
        Err(_e) => {
            render_error(res, StatusCode::BAD_REQUEST, "Invalid JSON");
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

    let template = body.availability.unwrap_or_else(AvailabilityTemplate::blank);

    match availability::save(&mut conn, template, body.expected_revision, Utc::now()).await {
        Ok(view) => {
            res.status_code(StatusCode::OK);
            res.render(Json(AvailabilityResponse {
                ok: true,
                availability: view.template,
                revision: view.revision,
            }));
        }
        Err(ServiceError::DatabaseError(DbError::RevisionConflict)) => {
            render_error(
                res,
                StatusCode::CONFLICT,
                "Availability was modified by another session",
            );
        }
        Err(e) => {
            error!(error = ?e, "Failed to save availability");
            render_error(
                res,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save availability",
            );
        }
    }
}

/// ## Summary
/// POST /api/schedule/admin/invite - issues a single-use invite token and
/// returns the guest link. `days` defaults to 7 and must stay in [1, 365].
///
/// ## Errors
/// Returns HTTP 400 for a bad email or day count, 503 when storage cannot
/// be reached, and 500 on write failure.
#[handler]
pub async fn create_invite(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: InviteRequest = match req.parse_json().await {
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

    let days = body.days.unwrap_or(DEFAULT_INVITE_DAYS);

    match token::issue(
        &mut conn,
        &settings.server.origin(),
        &body.email,
        body.name.as_deref(),
        days,
        Utc::now(),
    )
    .await
    {
        Ok(issued) => {
            res.status_code(StatusCode::OK);
            res.render(Json(InviteResponse {
                ok: true,
                token: issued.invite.token.clone(),
                expires_at: issued.invite.expires_at.timestamp_millis(),
                invite_url: issued.invite_url,
            }));
        }
        Err(ServiceError::ValidationError(message)) => {
            render_error(res, StatusCode::BAD_REQUEST, &message);
        }
        Err(e) => {
            error!(error = ?e, "Failed to create invite");
            render_error(
                res,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create invite",
            );
        }
    }
}
