use salvo::Depot;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;
use tracing::error;

use greenroom_service::admin::verify_admin_key;
use greenroom_service::error::ServiceError;

use crate::config::get_config_from_depot;

#[derive(Debug, Serialize)]
struct AuthErrorBody {
    ok: bool,
    error: String,
}

pub struct AdminAuthMiddleware;

/// ## Summary
/// Gate for the admin route subtree: requires a bearer API key matching the
/// configured credential. Requests that fail never reach the handlers.
///
/// ## Errors
/// Returns HTTP 401 for a missing or wrong key and HTTP 501 when no admin
/// credential is configured at all.
#[salvo::async_trait]
impl salvo::Handler for AdminAuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let settings = match get_config_from_depot(depot) {
            Ok(settings) => settings,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let presented = bearer_token(req).unwrap_or_default();

        match verify_admin_key(&settings, &presented) {
            Ok(()) => {
                tracing::debug!("Admin request authenticated");
            }
            Err(ServiceError::InvalidConfiguration(message)) => {
                tracing::warn!(%message, "Admin surface is not configured");
                res.status_code(StatusCode::NOT_IMPLEMENTED);
                res.render(Json(AuthErrorBody {
                    ok: false,
                    error: "Admin access not configured".to_string(),
                }));
                ctrl.skip_rest();
            }
            Err(_not_authenticated) => {
                tracing::info!("Admin request rejected");
                res.status_code(StatusCode::UNAUTHORIZED);
                res.render(Json(AuthErrorBody {
                    ok: false,
                    error: "Unauthorized".to_string(),
                }));
                ctrl.skip_rest();
            }
        }
    }
}

/// Extracts the bearer credential from the Authorization header.
fn bearer_token(req: &salvo::Request) -> Option<String> {
    let header = req
        .headers()
        .get(salvo::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let (scheme, value) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
