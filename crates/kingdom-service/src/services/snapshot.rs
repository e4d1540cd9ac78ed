//! Snapshot query service

use kingdom_core::traits::{SnapshotFilter, SnapshotRowFilter};
use kingdom_core::{AllianceTag, DomainError, Snapshot, Snowflake};
use tracing::instrument;
use validator::Validate;

use crate::dto::{
    LatestSnapshotQuery, PaginatedResponse, PlayerPageQuery, SnapshotListQuery,
    SnapshotPlayerResponse, SnapshotResponse, DEFAULT_RECENT_LIMIT,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Read access to stored snapshots and their rows
pub struct SnapshotService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SnapshotService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Most recent snapshot by capture time, optionally scoped
    #[instrument(skip(self))]
    pub async fn latest(&self, query: LatestSnapshotQuery) -> ServiceResult<SnapshotResponse> {
        let filter = SnapshotFilter {
            season_id: query.season_id,
            kingdom: query.kingdom,
        };
        let snapshot = self
            .ctx
            .snapshot_repo()
            .find_latest(&filter)
            .await?
            .ok_or(DomainError::NoSnapshots)?;

        self.respond(&snapshot).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: SnapshotListQuery) -> ServiceResult<Vec<SnapshotResponse>> {
        query.validate()?;

        let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
        let filter = SnapshotFilter {
            season_id: query.season_id,
            kingdom: query.kingdom,
        };
        let snapshots = self.ctx.snapshot_repo().list_recent(&filter, limit).await?;

        let mut responses = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            responses.push(self.respond(snapshot).await?);
        }
        Ok(responses)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Snowflake) -> ServiceResult<SnapshotResponse> {
        let snapshot = self.find(id).await?;
        self.respond(&snapshot).await
    }

    /// Rows of one snapshot joined with registry status, strongest first
    #[instrument(skip(self))]
    pub async fn players(
        &self,
        id: Snowflake,
        query: PlayerPageQuery,
    ) -> ServiceResult<PaginatedResponse<SnapshotPlayerResponse>> {
        query.validate()?;
        self.find(id).await?;

        let filter = SnapshotRowFilter {
            left_realm: query.left_realm,
            alliance: AllianceTag::normalize(query.alliance.as_deref()),
            limit: query.limit(),
            offset: query.offset(),
        };
        let rows = self.ctx.snapshot_repo().find_rows(id, &filter).await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Into::into).collect(),
            filter.limit,
            filter.offset,
        ))
    }

    async fn find(&self, id: Snowflake) -> ServiceResult<Snapshot> {
        Ok(self
            .ctx
            .snapshot_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::SnapshotNotFound(id))?)
    }

    async fn respond(&self, snapshot: &Snapshot) -> ServiceResult<SnapshotResponse> {
        let rows = self.ctx.snapshot_repo().count_rows(snapshot.id).await?;
        Ok(SnapshotResponse::new(snapshot, rows))
    }
}
