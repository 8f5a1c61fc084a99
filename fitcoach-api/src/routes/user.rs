/// Current-user endpoints
///
/// Both endpoints project the caller first, so the first authenticated call
/// creates the application user.
///
/// # Endpoints
///
/// - `GET /api/user/role` - Caller's role
/// - `POST /api/user/onboarding` - Mark onboarding completed

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{success, Envelope},
};
use axum::{extract::State, Extension, Json};
use fitcoach_shared::auth::projector::project;
use fitcoach_shared::models::user::{ApplicationUser, Identity, UserRole};
use serde::Serialize;

/// Role response
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: UserRole,
}

/// Onboarding response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: ApplicationUser,
}

/// Get caller's role
///
/// # Endpoint
///
/// ```text
/// GET /api/user/role
/// Authorization: Bearer <access_token>
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "role": "user", "error": null }
/// ```
pub async fn get_role(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Envelope<RoleResponse>>> {
    let user = project(state.store.as_ref(), &identity).await?;

    Ok(success(RoleResponse { role: user.role }))
}

/// Complete onboarding
///
/// Idempotent; completing twice leaves the flag set.
pub async fn complete_onboarding(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Envelope<UserResponse>>> {
    project(state.store.as_ref(), &identity).await?;

    let user = state
        .store
        .complete_onboarding(identity.id)
        .await?
        .ok_or_else(|| ApiError::InternalError(format!("User {} vanished after projection", identity.id)))?;

    tracing::info!(user_id = %user.id, "Onboarding completed");

    Ok(success(UserResponse { user }))
}
