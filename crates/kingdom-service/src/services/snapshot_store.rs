//! Snapshot Store
//!
//! Creates snapshot headers and writes their rows in bounded batches. Each
//! batch is its own transaction; a failing batch aborts only itself, so an
//! upload can end with some of its rows committed. That outcome is returned
//! to the caller as a [`PartialCommit`], never swallowed.

use kingdom_core::traits::{RowWrite, SnapshotBatch, SnapshotFilter};
use kingdom_core::{DomainError, Snapshot, SnapshotMetadata, Snowflake};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Rows and batches that made it to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowsCommitted {
    pub rows: usize,
    pub batches: usize,
}

/// A batch failed; everything before it stays committed
#[derive(Debug, thiserror::Error)]
#[error(
    "batch {} failed after {} rows were committed: {}",
    .failed_batch + 1,
    .committed_rows,
    .source
)]
pub struct PartialCommit {
    pub committed_rows: usize,
    /// Zero-based index of the failed batch
    pub failed_batch: usize,
    #[source]
    pub source: DomainError,
}

impl From<PartialCommit> for ServiceError {
    fn from(err: PartialCommit) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// Snapshot Store service
pub struct SnapshotStore<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an empty snapshot header
    #[instrument(skip(self, metadata), fields(kingdom = %metadata.kingdom, captured_at = %metadata.captured_at))]
    pub async fn create_snapshot(&self, metadata: SnapshotMetadata) -> ServiceResult<Snapshot> {
        if let Some(season_id) = metadata.season_id {
            self.ctx
                .season_repo()
                .find_by_id(season_id)
                .await?
                .ok_or(DomainError::SeasonNotFound(season_id))?;
        }

        let snapshot = Snapshot::new(self.ctx.generate_id(), metadata, self.ctx.clock().now());
        self.ctx.snapshot_repo().create(&snapshot).await?;

        debug!(snapshot_id = %snapshot.id, "Snapshot created");
        Ok(snapshot)
    }

    /// Write rows in batches of the configured size, stopping at the first
    /// failed batch
    #[instrument(skip(self, writes), fields(rows = writes.len()))]
    pub async fn add_player_rows(
        &self,
        snapshot_id: Snowflake,
        writes: Vec<RowWrite>,
    ) -> Result<RowsCommitted, PartialCommit> {
        let batch_size = self.ctx.ingestion().batch_size.max(1);
        let mut committed = RowsCommitted::default();
        let mut remaining = writes.into_iter().peekable();

        while remaining.peek().is_some() {
            let batch = SnapshotBatch {
                snapshot_id,
                index: committed.batches,
                rows: remaining.by_ref().take(batch_size).collect(),
            };
            let size = batch.rows.len();

            if let Err(source) = self.ctx.snapshot_repo().commit_batch(&batch).await {
                warn!(batch = batch.index, committed = committed.rows, error = %source, "Batch failed");
                return Err(PartialCommit {
                    committed_rows: committed.rows,
                    failed_batch: batch.index,
                    source,
                });
            }

            committed.rows += size;
            committed.batches += 1;
            debug!(batch = batch.index, rows = size, "Batch committed");
        }

        info!(rows = committed.rows, batches = committed.batches, "Snapshot rows stored");
        Ok(committed)
    }

    /// Most recent snapshot matching the filter
    pub async fn find_latest(&self, filter: &SnapshotFilter) -> ServiceResult<Option<Snapshot>> {
        Ok(self.ctx.snapshot_repo().find_latest(filter).await?)
    }
}
