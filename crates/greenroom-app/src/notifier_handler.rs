use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use greenroom_core::error::CoreError;
use greenroom_service::notify::Notifier;

pub struct NotifierHandler {
    pub notifier: Arc<Notifier>,
}

#[async_trait]
impl salvo::Handler for NotifierHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.notifier));
    }
}

/// ## Summary
/// Retrieves the shared email notifier from the depot.
///
/// ## Errors
/// Returns an error if the notifier is not found in the depot.
pub fn get_notifier_from_depot(depot: &salvo::Depot) -> AppResult<Arc<Notifier>> {
    depot
        .obtain::<Arc<Notifier>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Notifier not found in depot").into())
}
