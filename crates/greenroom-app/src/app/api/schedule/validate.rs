use chrono::Utc;
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, handler};
use serde::{Deserialize, Serialize};
use tracing::error;

use greenroom_service::token::{self, TokenValidation};

use super::{reason_response, render_error};
use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ValidateRequest {
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResponse {
    token: String,
    email: String,
    /// Epoch milliseconds, matching the stored-token contract.
    expires_at: i64,
}

/// ## Summary
/// POST /api/schedule/validate - checks an invite token and returns its
/// minimal metadata for the booking UI.
///
/// ## Errors
/// Returns HTTP 400 for an unreadable body, 401 for an invalid token, 503
/// when storage cannot be reached, and 500 on lookup failure.
#[handler]
pub async fn validate_token(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let body: ValidateRequest = match req.parse_json().await {
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

    match token::validate(&mut conn, &settings.schedule, &body.token, Utc::now()).await {
        Ok(TokenValidation::Valid(grant)) => {
            res.status_code(StatusCode::OK);
            res.render(Json(ValidateResponse {
                token: grant.token,
                email: grant.email,
                expires_at: grant.expires_at.timestamp_millis(),
            }));
        }
        Ok(TokenValidation::Invalid(reason)) => {
            let (status, message) = reason_response(reason);
            render_error(res, status, message);
        }
        Err(e) => {
            error!(error = ?e, "Token validation failed");
            render_error(
                res,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Schedule token storage read error",
            );
        }
    }
}
