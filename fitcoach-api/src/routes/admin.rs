/// Admin endpoints
///
/// # Endpoints
///
/// - `GET /api/admin/check-status` - Whether the caller is an admin
/// - `GET /api/admin/users` - Paginated user listing (admins only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{success, Envelope},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use fitcoach_shared::auth::gate::{evaluate, Policy};
use fitcoach_shared::auth::projector::project;
use fitcoach_shared::models::user::{ApplicationUser, Identity};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Admin status response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusResponse {
    pub is_admin: bool,
    pub user: ApplicationUser,
}

/// User listing query
#[derive(Debug, Deserialize, Validate)]
pub struct ListUsersQuery {
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    #[serde(default = "default_limit")]
    pub limit: i64,

    #[validate(range(min = 0, message = "offset must not be negative"))]
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// User listing response
#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<ApplicationUser>,
}

/// Check admin status
///
/// Reads the stored row without projecting: a caller who has never been
/// projected gets 404 rather than a freshly created row.
///
/// # Response
///
/// ```json
/// { "success": true, "isAdmin": false, "user": { ... }, "error": null }
/// ```
pub async fn check_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Envelope<AdminStatusResponse>>> {
    let user = state
        .store
        .find_user(identity.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(success(AdminStatusResponse {
        is_admin: user.is_admin(),
        user,
    }))
}

/// List users, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Envelope<UsersResponse>>> {
    let user = project(state.store.as_ref(), &identity).await?;
    evaluate(&user, &Policy::AdminOnly, &state.gate_context()).into_result()?;

    query.validate()?;
    let users = state.store.list_users(query.limit, query.offset).await?;

    Ok(success(UsersResponse { users }))
}
