/// Training program endpoints
///
/// # Endpoints
///
/// - `GET /api/programs` - Catalog of training splits
/// - `GET /api/programs/purchases` - Caller's purchases

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{success, Envelope},
};
use axum::{extract::State, Extension, Json};
use fitcoach_shared::auth::projector::project;
use fitcoach_shared::models::program::{TrainingSplit, UserPurchase};
use fitcoach_shared::models::user::Identity;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProgramsResponse {
    pub programs: Vec<TrainingSplit>,
}

#[derive(Debug, Serialize)]
pub struct PurchasesResponse {
    pub purchases: Vec<UserPurchase>,
}

/// List training programs
///
/// The catalog is the same for every caller, so no projection happens here.
pub async fn list_programs(
    State(state): State<AppState>,
    Extension(_identity): Extension<Identity>,
) -> ApiResult<Json<Envelope<ProgramsResponse>>> {
    let programs = state.store.list_training_splits().await?;

    Ok(success(ProgramsResponse { programs }))
}

/// List the caller's purchases
pub async fn list_purchases(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Envelope<PurchasesResponse>>> {
    let user = project(state.store.as_ref(), &identity).await?;
    let purchases = state.store.list_purchases(user.id).await?;

    Ok(success(PurchasesResponse { purchases }))
}
