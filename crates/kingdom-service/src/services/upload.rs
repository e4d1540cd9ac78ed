//! Upload audit queries

use kingdom_core::{DomainError, Snowflake};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{RecentQuery, UploadResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct UploadService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UploadService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Most recent uploads first
    #[instrument(skip(self))]
    pub async fn list(&self, query: RecentQuery) -> ServiceResult<Vec<UploadResponse>> {
        query.validate()?;
        let uploads = self.ctx.upload_repo().list_recent(query.limit()).await?;
        Ok(uploads.into_iter().map(UploadResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Snowflake) -> ServiceResult<UploadResponse> {
        let upload = self
            .ctx
            .upload_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UploadNotFound(id))?;
        Ok(upload.into())
    }

    /// Fail every upload left PROCESSING by a previous run
    ///
    /// Called once at startup, before requests are served. Returns how many
    /// uploads were closed.
    #[instrument(skip(self))]
    pub async fn fail_interrupted(&self) -> ServiceResult<usize> {
        let repo = self.ctx.upload_repo();
        let now = self.ctx.clock().now();
        let mut closed = 0;

        for mut upload in repo.list_processing().await? {
            let row_count = upload.row_count;
            upload.fail(INTERRUPTED_MESSAGE, row_count, now)?;
            match repo.finish(&upload).await {
                Ok(()) => closed += 1,
                Err(DomainError::InvalidUploadTransition { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        if closed > 0 {
            warn!(closed, "Closed uploads interrupted before completion");
        } else {
            info!("No interrupted uploads");
        }
        Ok(closed)
    }
}

/// Error message recorded on uploads closed by [`UploadService::fail_interrupted`]
pub const INTERRUPTED_MESSAGE: &str = "interrupted before completion";
