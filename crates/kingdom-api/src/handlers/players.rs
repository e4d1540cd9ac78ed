//! Player registry handlers

use axum::{extract::State, Json};
use kingdom_service::dto::{
    HistoryQuery, PaginatedResponse, PlayerHistoryResponse, PlayerPageQuery, PlayerResponse,
};
use kingdom_service::PlayerService;

use crate::extractors::{ApiPath, ApiQuery, AuthUser, LordIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /players
pub async fn list_players(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<PlayerPageQuery>,
) -> ApiResult<Json<PaginatedResponse<PlayerResponse>>> {
    let page = PlayerService::new(state.service_context()).list(query).await?;
    Ok(Json(page))
}

/// GET /players/{lord_id}
pub async fn get_player(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<LordIdPath>,
) -> ApiResult<Json<PlayerResponse>> {
    let player = PlayerService::new(state.service_context())
        .get(path.lord_id()?)
        .await?;
    Ok(Json(player))
}

/// Stat series plus name and alliance history
///
/// GET /players/{lord_id}/history
pub async fn get_player_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<LordIdPath>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<PlayerHistoryResponse>> {
    let history = PlayerService::new(state.service_context())
        .history(path.lord_id()?, query)
        .await?;
    Ok(Json(history))
}
