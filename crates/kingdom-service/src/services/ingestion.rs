//! Ingestion Pipeline
//!
//! Turns one uploaded file into a snapshot, its rows, registry updates and
//! history events, then runs the realm-status sweep. Strict order:
//!
//! 1. parse and validate the file (nothing is stored on failure)
//! 2. create the Upload in PROCESSING
//! 3. create the Snapshot
//! 4. detect changes and write rows plus registry updates, batch by batch
//! 5. sweep the whole registry
//! 6. move the Upload to COMPLETED, or to FAILED if anything after step 2
//!    went wrong
//!
//! A failure after step 2 is written to the Upload and then returned to the
//! caller as [`ServiceError::UploadFailed`]. Batches committed before the
//! failure stay committed.

use chrono::{DateTime, Utc};
use kingdom_core::{DomainError, SnapshotMetadata, Snowflake, Upload};
use tracing::{error, info, instrument};

use crate::dto::{IngestionResponse, SweepSummary};
use crate::import::{parse_upload, ParsedSheet};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::realm_status::RealmStatusService;
use super::registry::{ObservationTally, PlayerRegistry};
use super::snapshot_store::SnapshotStore;

/// One ingestion attempt as submitted by a caller
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub uploaded_by: Snowflake,
    /// Falls back to the configured default kingdom
    pub kingdom: Option<String>,
    pub season_id: Option<Snowflake>,
    /// Capture time of the export; defaults to now
    pub captured_at: Option<DateTime<Utc>>,
}

/// Everything validated before the Upload record is created
struct Prepared {
    sheet: ParsedSheet,
    metadata: SnapshotMetadata,
}

/// Ingestion pipeline service
pub struct IngestionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> IngestionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request), fields(filename = %request.filename, bytes = request.bytes.len()))]
    pub async fn ingest(&self, request: IngestionRequest) -> ServiceResult<IngestionResponse> {
        let prepared = self.prepare(&request).await?;

        let mut upload = Upload::start(
            self.ctx.generate_id(),
            request.filename,
            request.uploaded_by,
            prepared.metadata.kingdom.clone(),
            self.ctx.clock().now(),
        );
        self.ctx.upload_repo().create(&upload).await?;
        info!(
            upload_id = %upload.id,
            rows = prepared.sheet.len(),
            kingdom = %upload.kingdom,
            "Upload started"
        );

        let mut committed = 0;
        match self.run(&mut upload, prepared, &mut committed).await {
            Ok(response) => Ok(response),
            Err(err) => Err(self.record_failure(upload, committed, err).await),
        }
    }

    /// Step 1: nothing here may write to the store
    async fn prepare(&self, request: &IngestionRequest) -> ServiceResult<Prepared> {
        if request.filename.trim().is_empty() {
            return Err(DomainError::MissingFile.into());
        }
        let sheet = parse_upload(&request.filename, &request.bytes)?;

        let kingdom = request
            .kingdom
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or(self.ctx.ingestion().default_kingdom.as_deref())
            .ok_or_else(|| ServiceError::validation("kingdom is required"))?
            .to_string();

        if let Some(season_id) = request.season_id {
            self.ctx
                .season_repo()
                .find_by_id(season_id)
                .await?
                .ok_or(DomainError::SeasonNotFound(season_id))?;
        }

        Ok(Prepared {
            sheet,
            metadata: SnapshotMetadata {
                captured_at: request.captured_at.unwrap_or_else(|| self.ctx.clock().now()),
                filename: request.filename.clone(),
                kingdom,
                season_id: request.season_id,
            },
        })
    }

    /// Steps 3 to 6; `committed` tracks rows durably written so far
    async fn run(
        &self,
        upload: &mut Upload,
        prepared: Prepared,
        committed: &mut usize,
    ) -> ServiceResult<IngestionResponse> {
        let store = SnapshotStore::new(self.ctx);
        let Prepared { sheet, metadata } = prepared;

        let snapshot = store.create_snapshot(metadata).await?;
        upload.snapshot_id = Some(snapshot.id);

        let mut registry = PlayerRegistry::new(self.ctx);
        registry.load(&sheet.lord_ids()).await?;

        let mut tally = ObservationTally::default();
        let mut writes = Vec::with_capacity(sheet.len());
        for row in sheet.rows {
            let write = registry.observe(&snapshot, row);
            tally.record(&write);
            writes.push(write);
        }

        match store.add_player_rows(snapshot.id, writes).await {
            Ok(stored) => *committed = stored.rows,
            Err(partial) => {
                *committed = partial.committed_rows;
                return Err(partial.into());
            }
        }

        let sweep = RealmStatusService::new(self.ctx).sweep().await?;

        let mut completed = upload.clone();
        completed.complete(*committed as i64, self.ctx.clock().now())?;
        self.ctx.upload_repo().finish(&completed).await?;
        *upload = completed;

        let message = format!(
            "Processed {} rows into snapshot {}: {} new players, {} name changes, {} alliance changes; \
             realm sweep marked {} and cleared {}",
            committed,
            snapshot.id,
            tally.new_players,
            tally.name_changes,
            tally.alliance_changes,
            sweep.marked_left.len(),
            sweep.cleared.len(),
        );
        info!(upload_id = %upload.id, snapshot_id = %snapshot.id, rows = *committed, "Upload completed");

        Ok(IngestionResponse {
            upload_id: upload.id.to_string(),
            snapshot_id: snapshot.id.to_string(),
            rows_processed: *committed,
            new_players: tally.new_players,
            name_changes: tally.name_changes,
            alliance_changes: tally.alliance_changes,
            realm: SweepSummary::from(&sweep),
            message,
        })
    }

    /// Step 6, failure branch: record, then hand back the error to re-raise
    async fn record_failure(&self, mut upload: Upload, committed: usize, err: ServiceError) -> ServiceError {
        let message = err.to_string();
        error!(upload_id = %upload.id, committed, error = %message, "Upload failed");

        match upload.fail(message.clone(), committed as i64, self.ctx.clock().now()) {
            Ok(()) => {
                if let Err(e) = self.ctx.upload_repo().finish(&upload).await {
                    error!(upload_id = %upload.id, error = %e, "Could not record upload failure");
                }
            }
            Err(e) => error!(upload_id = %upload.id, error = %e, "Upload already finished"),
        }

        ServiceError::UploadFailed {
            upload_id: upload.id,
            message,
        }
    }
}
