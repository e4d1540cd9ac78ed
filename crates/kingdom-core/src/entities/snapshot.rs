//! Snapshot entities - immutable point-in-time captures of player stats

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AllianceTag, LordId, Snowflake};

/// Metadata supplied when a snapshot is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMetadata {
    pub captured_at: DateTime<Utc>,
    pub filename: String,
    pub kingdom: String,
    pub season_id: Option<Snowflake>,
}

/// One immutable capture of all players at a point in time
///
/// Snapshots are never updated once created. Several snapshots per day (or
/// with identical timestamps) are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub id: Snowflake,
    pub captured_at: DateTime<Utc>,
    pub filename: String,
    pub kingdom: String,
    pub season_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(id: Snowflake, metadata: SnapshotMetadata, now: DateTime<Utc>) -> Self {
        Self {
            id,
            captured_at: metadata.captured_at,
            filename: metadata.filename,
            kingdom: metadata.kingdom,
            season_id: metadata.season_id,
            created_at: now,
        }
    }
}

/// Full stat vector of one player as exported by the game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub power: i64,
    pub highest_power: i64,
    pub building_power: i64,
    pub hero_power: i64,
    pub legion_power: i64,
    pub tech_power: i64,
    pub merits: i64,
    pub units_killed: i64,
    pub units_dead: i64,
    pub units_healed: i64,
    pub t1_kills: i64,
    pub t2_kills: i64,
    pub t3_kills: i64,
    pub t4_kills: i64,
    pub t5_kills: i64,
    pub gold: i64,
    pub wood: i64,
    pub ore: i64,
    pub mana: i64,
    pub gems: i64,
    pub gold_spent: i64,
    pub wood_spent: i64,
    pub ore_spent: i64,
    pub mana_spent: i64,
    pub resources_given: i64,
    pub resources_given_count: i64,
    pub helps_given: i64,
    pub city_level: i32,
    pub division: i32,
    pub faction: Option<String>,
}

impl PlayerStats {
    /// Sum of tiered kill counters
    pub fn tiered_kills(&self) -> i64 {
        self.t1_kills + self.t2_kills + self.t3_kills + self.t4_kills + self.t5_kills
    }
}

/// One player's row within one snapshot
///
/// `name` and `alliance` are the values as observed in that snapshot, kept on
/// the row so history queries don't depend on the registry's current values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
    pub id: Snowflake,
    pub snapshot_id: Snowflake,
    pub player_id: Snowflake,
    pub lord_id: LordId,
    pub name: String,
    pub alliance: Option<AllianceTag>,
    pub stats: PlayerStats,
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_deserialize_with_missing_fields() {
        let stats: PlayerStats = serde_json::from_str(r#"{"power": 5000000, "t4_kills": 7}"#).unwrap();
        assert_eq!(stats.power, 5_000_000);
        assert_eq!(stats.t4_kills, 7);
        assert_eq!(stats.city_level, 0);
        assert!(stats.faction.is_none());
    }

    #[test]
    fn test_tiered_kills() {
        let stats = PlayerStats {
            t1_kills: 1,
            t2_kills: 2,
            t3_kills: 3,
            t4_kills: 4,
            t5_kills: 5,
            ..Default::default()
        };
        assert_eq!(stats.tiered_kills(), 15);
    }
}
