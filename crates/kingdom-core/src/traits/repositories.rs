//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL, or the in-memory store used by
//! tests and local runs).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    AllianceChange, NameChange, Player, PlayerSnapshot, RealmCandidate, Season, Snapshot, Upload,
};
use crate::error::DomainError;
use crate::value_objects::{AllianceTag, LordId, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Snapshot Store
// ============================================================================

/// Filter for snapshot lookups
#[derive(Debug, Clone, Default)]
pub struct SnapshotFilter {
    pub season_id: Option<Snowflake>,
    pub kingdom: Option<String>,
}

/// Filter for rows inside one snapshot
#[derive(Debug, Clone)]
pub struct SnapshotRowFilter {
    /// Registry left-realm status to match
    pub left_realm: Option<bool>,
    /// Alliance tag as recorded on the row
    pub alliance: Option<AllianceTag>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for SnapshotRowFilter {
    fn default() -> Self {
        Self {
            left_realm: None,
            alliance: None,
            limit: 100,
            offset: 0,
        }
    }
}

/// Everything one ingested row writes
///
/// `player` is the registry record after the observation was applied (new
/// players carry a freshly generated id). The history events, if any, were
/// produced by comparing against the registry before that application.
#[derive(Debug, Clone)]
pub struct RowWrite {
    pub player: Player,
    pub is_new_player: bool,
    pub row: PlayerSnapshot,
    pub name_change: Option<NameChange>,
    pub alliance_change: Option<AllianceChange>,
}

/// A bounded group of rows committed in a single transaction
#[derive(Debug, Clone)]
pub struct SnapshotBatch {
    pub snapshot_id: Snowflake,
    /// Zero-based position of this batch within the upload
    pub index: usize,
    pub rows: Vec<RowWrite>,
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Create a snapshot header (no rows)
    async fn create(&self, snapshot: &Snapshot) -> RepoResult<()>;

    /// Find snapshot by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Snapshot>>;

    /// Most recent snapshot matching the filter, by capture time
    async fn find_latest(&self, filter: &SnapshotFilter) -> RepoResult<Option<Snapshot>>;

    /// Recent snapshots matching the filter, newest first
    async fn list_recent(&self, filter: &SnapshotFilter, limit: i64) -> RepoResult<Vec<Snapshot>>;

    /// Commit one batch atomically: registry upserts, history events, rows
    ///
    /// A failure leaves the store exactly as it was before this call; batches
    /// committed earlier are not affected.
    async fn commit_batch(&self, batch: &SnapshotBatch) -> RepoResult<()>;

    /// Number of rows stored for a snapshot
    async fn count_rows(&self, snapshot_id: Snowflake) -> RepoResult<i64>;

    /// Rows of a snapshot joined with current registry state
    async fn find_rows(
        &self,
        snapshot_id: Snowflake,
        filter: &SnapshotRowFilter,
    ) -> RepoResult<Vec<(PlayerSnapshot, Player)>>;

    /// A player's rows across snapshots, oldest first
    async fn find_rows_by_player(&self, lord_id: LordId, limit: i64) -> RepoResult<Vec<PlayerSnapshot>>;
}

// ============================================================================
// Player Registry
// ============================================================================

/// Filter for registry listings
#[derive(Debug, Clone)]
pub struct PlayerFilter {
    pub left_realm: Option<bool>,
    pub alliance: Option<AllianceTag>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for PlayerFilter {
    fn default() -> Self {
        Self {
            left_realm: None,
            alliance: None,
            limit: 100,
            offset: 0,
        }
    }
}

#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Find player by external identifier
    async fn find_by_lord_id(&self, lord_id: LordId) -> RepoResult<Option<Player>>;

    /// Bulk lookup; unknown ids are simply absent from the result
    async fn find_by_lord_ids(&self, lord_ids: &[LordId]) -> RepoResult<Vec<Player>>;

    /// List players matching the filter, ordered by lord id
    async fn list(&self, filter: &PlayerFilter) -> RepoResult<Vec<Player>>;

    /// Flag as left realm (idempotent); returns true if the flag changed
    ///
    /// `at` is recorded as `left_realm_at`, `now` as `updated_at`.
    async fn mark_left_realm(&self, lord_id: LordId, at: DateTime<Utc>, now: DateTime<Utc>) -> RepoResult<bool>;

    /// Clear the left-realm flag (idempotent); returns true if the flag changed
    async fn clear_left_realm(&self, lord_id: LordId, now: DateTime<Utc>) -> RepoResult<bool>;

    /// Every player with its most recent recorded power, for the realm sweep
    async fn realm_candidates(&self) -> RepoResult<Vec<RealmCandidate>>;
}

// ============================================================================
// History
// ============================================================================

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Renames for a player, oldest first
    async fn name_changes(&self, lord_id: LordId) -> RepoResult<Vec<NameChange>>;

    /// Alliance moves for a player, oldest first
    async fn alliance_changes(&self, lord_id: LordId) -> RepoResult<Vec<AllianceChange>>;
}

// ============================================================================
// Uploads
// ============================================================================

#[async_trait]
pub trait UploadRepository: Send + Sync {
    /// Record a new attempt (status PROCESSING)
    async fn create(&self, upload: &Upload) -> RepoResult<()>;

    /// Find upload by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Upload>>;

    /// Recent uploads, newest first
    async fn list_recent(&self, limit: i64) -> RepoResult<Vec<Upload>>;

    /// Uploads still PROCESSING, oldest first
    async fn list_processing(&self) -> RepoResult<Vec<Upload>>;

    /// Persist a terminal transition
    ///
    /// Only applies while the stored upload is still PROCESSING.
    async fn finish(&self, upload: &Upload) -> RepoResult<()>;
}

// ============================================================================
// Seasons
// ============================================================================

#[async_trait]
pub trait SeasonRepository: Send + Sync {
    /// Find season by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Season>>;

    /// Seasons, newest first, optionally restricted to a kingdom
    async fn list(&self, kingdom: Option<&str>) -> RepoResult<Vec<Season>>;

    /// Create a season
    async fn create(&self, season: &Season) -> RepoResult<()>;
}
