//! Snapshot database models

use chrono::{DateTime, Utc};
use kingdom_core::PlayerStats;
use sqlx::types::Json;
use sqlx::FromRow;

/// Database model for snapshots table
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotModel {
    pub id: i64,
    pub captured_at: DateTime<Utc>,
    pub filename: String,
    pub kingdom: String,
    pub season_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Database model for player_snapshots table
///
/// `power`, `city_level` and `division` are duplicated out of `stats` as
/// columns for sorting and filtering; `stats` is the source of truth.
#[derive(Debug, Clone, FromRow)]
pub struct PlayerSnapshotModel {
    pub id: i64,
    pub snapshot_id: i64,
    pub player_id: i64,
    pub lord_id: i64,
    pub name: String,
    pub alliance: Option<String>,
    pub stats: Json<PlayerStats>,
    pub captured_at: DateTime<Utc>,
}

/// A snapshot row joined with the player's current registry record
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRowModel {
    pub id: i64,
    pub snapshot_id: i64,
    pub player_id: i64,
    pub lord_id: i64,
    pub name: String,
    pub alliance: Option<String>,
    pub stats: Json<PlayerStats>,
    pub captured_at: DateTime<Utc>,
    pub current_name: String,
    pub current_alliance: Option<String>,
    pub has_left_realm: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub left_realm_at: Option<DateTime<Utc>>,
    pub player_created_at: DateTime<Utc>,
    pub player_updated_at: DateTime<Utc>,
}
