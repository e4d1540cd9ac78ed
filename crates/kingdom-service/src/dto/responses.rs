//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs and lord ids are serialized as strings for JavaScript
//! compatibility.

use chrono::{DateTime, Utc};
use kingdom_core::PlayerStats;
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Offset-paginated response
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, limit: i64, offset: i64) -> Self {
        let has_more = i64::try_from(data.len()).is_ok_and(|len| len == limit);
        Self {
            data,
            pagination: PaginationMeta {
                limit,
                offset,
                has_more,
            },
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub offset: i64,
    /// A full page came back, so another may follow
    pub has_more: bool,
}

// ============================================================================
// Snapshot Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResponse {
    pub id: String,
    pub captured_at: DateTime<Utc>,
    pub filename: String,
    pub kingdom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_id: Option<String>,
    pub row_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One snapshot row joined with the player's current registry status
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotPlayerResponse {
    pub lord_id: String,
    /// Name as recorded in this snapshot
    pub name: String,
    pub alliance: Option<String>,
    pub stats: PlayerStats,
    pub captured_at: DateTime<Utc>,
    pub current_name: String,
    pub has_left_realm: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub left_realm_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Player Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PlayerResponse {
    pub lord_id: String,
    pub current_name: String,
    pub current_alliance: Option<String>,
    pub has_left_realm: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub left_realm_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatPointResponse {
    pub snapshot_id: String,
    pub captured_at: DateTime<Utc>,
    pub name: String,
    pub alliance: Option<String>,
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameChangeResponse {
    pub old_name: String,
    pub new_name: String,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllianceChangeResponse {
    pub old_alliance: Option<String>,
    pub new_alliance: Option<String>,
    /// `join`, `leave` or `switch`
    pub kind: &'static str,
    pub detected_at: DateTime<Utc>,
}

/// Time-ordered stat rows plus the player's change history
#[derive(Debug, Clone, Serialize)]
pub struct PlayerHistoryResponse {
    pub player: PlayerResponse,
    pub stats: Vec<StatPointResponse>,
    pub name_changes: Vec<NameChangeResponse>,
    pub alliance_changes: Vec<AllianceChangeResponse>,
}

/// Result of an administrative left-realm correction
#[derive(Debug, Clone, Serialize)]
pub struct LeftRealmResponse {
    pub player: PlayerResponse,
    pub changed: bool,
}

// ============================================================================
// Upload / Ingestion Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub id: String,
    pub filename: String,
    pub uploaded_by: String,
    pub kingdom: String,
    pub status: String,
    pub row_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Counts from the sweep that closes an ingestion
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SweepSummary {
    pub evaluated: usize,
    pub marked_left: usize,
    pub cleared: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestionResponse {
    pub upload_id: String,
    pub snapshot_id: String,
    pub rows_processed: usize,
    pub new_players: usize,
    pub name_changes: usize,
    pub alliance_changes: usize,
    pub realm: SweepSummary,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepFailureResponse {
    pub lord_id: String,
    pub error: String,
}

/// Full report of an administrative sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub evaluated: usize,
    pub marked_left: Vec<String>,
    pub cleared: Vec<String>,
    pub failed: Vec<SweepFailureResponse>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub store: String,
    pub backend: String,
}

impl ReadinessResponse {
    pub fn ready(store_healthy: bool, backend: &str) -> Self {
        Self {
            status: if store_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                store: if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
                backend: backend.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
