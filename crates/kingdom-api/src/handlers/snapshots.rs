//! Snapshot handlers

use axum::{extract::State, Json};
use kingdom_service::dto::{
    LatestSnapshotQuery, PaginatedResponse, PlayerPageQuery, SnapshotListQuery,
    SnapshotPlayerResponse, SnapshotResponse,
};
use kingdom_service::SnapshotService;

use crate::extractors::{ApiPath, ApiQuery, AuthUser, SnapshotIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Most recent snapshot, optionally scoped to a season or kingdom
///
/// GET /snapshots/latest
pub async fn get_latest_snapshot(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<LatestSnapshotQuery>,
) -> ApiResult<Json<SnapshotResponse>> {
    let snapshot = SnapshotService::new(state.service_context()).latest(query).await?;
    Ok(Json(snapshot))
}

/// GET /snapshots
pub async fn list_snapshots(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<SnapshotListQuery>,
) -> ApiResult<Json<Vec<SnapshotResponse>>> {
    let snapshots = SnapshotService::new(state.service_context()).list(query).await?;
    Ok(Json(snapshots))
}

/// GET /snapshots/{snapshot_id}
pub async fn get_snapshot(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<SnapshotIdPath>,
) -> ApiResult<Json<SnapshotResponse>> {
    let snapshot = SnapshotService::new(state.service_context())
        .get(path.snapshot_id()?)
        .await?;
    Ok(Json(snapshot))
}

/// Rows of a snapshot joined with registry status
///
/// GET /snapshots/{snapshot_id}/players
pub async fn get_snapshot_players(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<SnapshotIdPath>,
    ApiQuery(query): ApiQuery<PlayerPageQuery>,
) -> ApiResult<Json<PaginatedResponse<SnapshotPlayerResponse>>> {
    let page = SnapshotService::new(state.service_context())
        .players(path.snapshot_id()?, query)
        .await?;
    Ok(Json(page))
}
