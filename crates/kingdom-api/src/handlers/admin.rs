//! Administrative realm-status handlers
//!
//! All endpoints here require the `admin` role.

use axum::{extract::State, Json};
use kingdom_core::UserRole;
use kingdom_service::dto::{LeftRealmResponse, MarkLeftRealmRequest, SweepResponse};
use kingdom_service::RealmStatusService;

use crate::extractors::{ApiPath, AuthUser, LordIdPath, OptionalJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Re-run the realm-status sweep over the whole registry
///
/// POST /admin/realm-status/sweep
pub async fn run_sweep(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<SweepResponse>> {
    auth.require(UserRole::Admin)?;

    let report = RealmStatusService::new(state.service_context()).sweep().await?;
    Ok(Json(report.into()))
}

/// Flag a player as having left the realm
///
/// PUT /admin/players/{lord_id}/left-realm
pub async fn mark_left_realm(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<LordIdPath>,
    OptionalJson(body): OptionalJson<MarkLeftRealmRequest>,
) -> ApiResult<Json<LeftRealmResponse>> {
    auth.require(UserRole::Admin)?;

    let at = body.and_then(|b| b.at);
    let update = RealmStatusService::new(state.service_context())
        .mark_left(path.lord_id()?, at)
        .await?;
    Ok(Json(update.into()))
}

/// Clear a player's left-realm flag
///
/// DELETE /admin/players/{lord_id}/left-realm
pub async fn clear_left_realm(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(path): ApiPath<LordIdPath>,
) -> ApiResult<Json<LeftRealmResponse>> {
    auth.require(UserRole::Admin)?;

    let update = RealmStatusService::new(state.service_context())
        .clear_left(path.lord_id()?)
        .await?;
    Ok(Json(update.into()))
}
