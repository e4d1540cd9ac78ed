//! Request DTOs for API endpoints
//!
//! Query-string and body DTOs implement `Deserialize` and `Validate`.

use chrono::{DateTime, Utc};
use kingdom_core::Snowflake;
use serde::Deserialize;
use validator::Validate;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const DEFAULT_RECENT_LIMIT: i64 = 20;
pub const DEFAULT_HISTORY_LIMIT: i64 = 200;

// ============================================================================
// Snapshot Queries
// ============================================================================

/// `GET /snapshots/latest`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestSnapshotQuery {
    pub season_id: Option<Snowflake>,
    pub kingdom: Option<String>,
}

/// `GET /snapshots`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SnapshotListQuery {
    pub season_id: Option<Snowflake>,
    pub kingdom: Option<String>,

    #[validate(range(min = 1, max = 100, message = "limit must be 1-100"))]
    pub limit: Option<i64>,
}

/// `GET /snapshots/:snapshot_id/players` and `GET /players`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PlayerPageQuery {
    pub left_realm: Option<bool>,

    #[validate(length(max = 32, message = "alliance must be at most 32 characters"))]
    pub alliance: Option<String>,

    #[validate(range(min = 1, max = 500, message = "limit must be 1-500"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: Option<i64>,
}

impl PlayerPageQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}

// ============================================================================
// Player Queries
// ============================================================================

/// `GET /players/:lord_id/history`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 1000, message = "limit must be 1-1000"))]
    pub limit: Option<i64>,
}

// ============================================================================
// Upload Queries
// ============================================================================

/// `GET /uploads`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RecentQuery {
    #[validate(range(min = 1, max = 100, message = "limit must be 1-100"))]
    pub limit: Option<i64>,
}

impl RecentQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_RECENT_LIMIT)
    }
}

// ============================================================================
// Admin Requests
// ============================================================================

/// `PUT /admin/players/:lord_id/left-realm`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkLeftRealmRequest {
    /// When the player left; defaults to now
    pub at: Option<DateTime<Utc>>,
}
