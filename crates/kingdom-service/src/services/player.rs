//! Player registry queries

use kingdom_core::traits::PlayerFilter;
use kingdom_core::{AllianceTag, DomainError, LordId, Player};
use tracing::instrument;
use validator::Validate;

use crate::dto::{
    HistoryQuery, PaginatedResponse, PlayerHistoryResponse, PlayerPageQuery, PlayerResponse,
    DEFAULT_HISTORY_LIMIT,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Player service for registry lookups and per-player history
pub struct PlayerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PlayerService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, lord_id: LordId) -> ServiceResult<PlayerResponse> {
        Ok(self.find(lord_id).await?.into())
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: PlayerPageQuery) -> ServiceResult<PaginatedResponse<PlayerResponse>> {
        query.validate()?;

        let filter = PlayerFilter {
            left_realm: query.left_realm,
            alliance: AllianceTag::normalize(query.alliance.as_deref()),
            limit: query.limit(),
            offset: query.offset(),
        };
        let players = self.ctx.player_repo().list(&filter).await?;

        Ok(PaginatedResponse::new(
            players.into_iter().map(PlayerResponse::from).collect(),
            filter.limit,
            filter.offset,
        ))
    }

    /// Stats series (oldest first) plus every recorded name and alliance change
    #[instrument(skip(self))]
    pub async fn history(&self, lord_id: LordId, query: HistoryQuery) -> ServiceResult<PlayerHistoryResponse> {
        query.validate()?;
        let player = self.find(lord_id).await?;

        let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let stats = self.ctx.snapshot_repo().find_rows_by_player(lord_id, limit).await?;
        let history = self.ctx.history_repo();
        let name_changes = history.name_changes(lord_id).await?;
        let alliance_changes = history.alliance_changes(lord_id).await?;

        Ok(PlayerHistoryResponse {
            player: player.into(),
            stats: stats.into_iter().map(Into::into).collect(),
            name_changes: name_changes.into_iter().map(Into::into).collect(),
            alliance_changes: alliance_changes.into_iter().map(Into::into).collect(),
        })
    }

    async fn find(&self, lord_id: LordId) -> ServiceResult<Player> {
        Ok(self
            .ctx
            .player_repo()
            .find_by_lord_id(lord_id)
            .await?
            .ok_or(DomainError::PlayerNotFound(lord_id))?)
    }
}
