//! Snapshot and PlayerSnapshot mappers

use chrono::{DateTime, Utc};
use kingdom_core::entities::{Player, PlayerSnapshot, PlayerStats, Snapshot};
use kingdom_core::value_objects::{AllianceTag, LordId, Snowflake};
use sqlx::types::Json;

use crate::models::{PlayerSnapshotModel, SnapshotModel, SnapshotRowModel};

impl From<SnapshotModel> for Snapshot {
    fn from(model: SnapshotModel) -> Self {
        Snapshot {
            id: Snowflake::new(model.id),
            captured_at: model.captured_at,
            filename: model.filename,
            kingdom: model.kingdom,
            season_id: model.season_id.map(Snowflake::new),
            created_at: model.created_at,
        }
    }
}

impl From<PlayerSnapshotModel> for PlayerSnapshot {
    fn from(model: PlayerSnapshotModel) -> Self {
        PlayerSnapshot {
            id: Snowflake::new(model.id),
            snapshot_id: Snowflake::new(model.snapshot_id),
            player_id: Snowflake::new(model.player_id),
            lord_id: LordId::new(model.lord_id),
            name: model.name,
            alliance: AllianceTag::normalize(model.alliance.as_deref()),
            stats: model.stats.0,
            captured_at: model.captured_at,
        }
    }
}

impl From<SnapshotRowModel> for (PlayerSnapshot, Player) {
    fn from(model: SnapshotRowModel) -> Self {
        let player = Player {
            id: Snowflake::new(model.player_id),
            lord_id: LordId::new(model.lord_id),
            current_name: model.current_name,
            current_alliance: AllianceTag::normalize(model.current_alliance.as_deref()),
            has_left_realm: model.has_left_realm,
            last_seen_at: model.last_seen_at,
            left_realm_at: model.left_realm_at,
            created_at: model.player_created_at,
            updated_at: model.player_updated_at,
        };
        let row = PlayerSnapshot {
            id: Snowflake::new(model.id),
            snapshot_id: Snowflake::new(model.snapshot_id),
            player_id: Snowflake::new(model.player_id),
            lord_id: LordId::new(model.lord_id),
            name: model.name,
            alliance: AllianceTag::normalize(model.alliance.as_deref()),
            stats: model.stats.0,
            captured_at: model.captured_at,
        };
        (row, player)
    }
}

/// Column values of one player_snapshots insert
pub struct PlayerSnapshotInsert<'a> {
    pub id: i64,
    pub snapshot_id: i64,
    pub lord_id: i64,
    pub name: &'a str,
    pub alliance: Option<&'a str>,
    pub power: i64,
    pub city_level: i32,
    pub division: i32,
    pub stats: Json<&'a PlayerStats>,
    pub captured_at: DateTime<Utc>,
}

impl<'a> PlayerSnapshotInsert<'a> {
    pub fn new(row: &'a PlayerSnapshot) -> Self {
        Self {
            id: row.id.into_inner(),
            snapshot_id: row.snapshot_id.into_inner(),
            lord_id: row.lord_id.into_inner(),
            name: &row.name,
            alliance: row.alliance.as_ref().map(AllianceTag::as_str),
            power: row.stats.power,
            city_level: row.stats.city_level,
            division: row.stats.division,
            stats: Json(&row.stats),
            captured_at: row.captured_at,
        }
    }
}
