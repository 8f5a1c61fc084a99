/// Maintenance status endpoint
///
/// Tells the front-end whether the caller may use the app right now. It is
/// self-describing rather than session-gated: a blocked caller gets 200 with
/// `canAccess: false` and the gate's reason code.
///
/// # Endpoint
///
/// ```text
/// GET /api/maintenance/status
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "maintenanceMode": true,
///   "canAccess": false,
///   "reason": "maintenance_user_blocked",
///   "error": null
/// }
/// ```

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{success, Envelope},
};
use axum::{extract::State, http::HeaderMap, Json};
use fitcoach_shared::auth::gate::{maintenance_access, AccessDecision, MaintenanceState};
use fitcoach_shared::auth::projector::project;
use serde::Serialize;

/// Maintenance status response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceStatusResponse {
    pub maintenance_mode: bool,
    pub can_access: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl MaintenanceStatusResponse {
    /// Reason codes are only reported while maintenance is on
    pub fn new(maintenance: MaintenanceState, decision: AccessDecision) -> Self {
        let maintenance_mode = maintenance.is_enabled();
        Self {
            maintenance_mode,
            can_access: decision.is_allowed(),
            reason: maintenance_mode.then(|| decision.reason()),
        }
    }
}

/// Report maintenance status for the caller
///
/// No session lookup happens while maintenance is off.
pub async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Envelope<MaintenanceStatusResponse>>> {
    if !state.maintenance.is_enabled() {
        let decision = maintenance_access(state.maintenance, None);
        return Ok(success(MaintenanceStatusResponse::new(state.maintenance, decision)));
    }

    let user = match state.sessions.resolve(&headers).await? {
        Some(identity) => Some(project(state.store.as_ref(), &identity).await?),
        None => None,
    };

    let decision = maintenance_access(state.maintenance, user.as_ref());
    tracing::debug!(%decision, "Maintenance status evaluated");

    Ok(success(MaintenanceStatusResponse::new(state.maintenance, decision)))
}
