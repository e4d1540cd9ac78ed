//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use kingdom_core::{AllianceChange, AllianceTag, NameChange, Player, PlayerSnapshot, Snapshot, Upload};

use crate::services::{LeftRealmUpdate, SweepReport};

use super::responses::{
    AllianceChangeResponse, LeftRealmResponse, NameChangeResponse, PlayerResponse,
    SnapshotPlayerResponse, SnapshotResponse, StatPointResponse, SweepFailureResponse,
    SweepResponse, SweepSummary, UploadResponse,
};

fn tag(alliance: Option<&AllianceTag>) -> Option<String> {
    alliance.map(|tag| tag.as_str().to_string())
}

// ============================================================================
// Snapshot Mappers
// ============================================================================

impl SnapshotResponse {
    pub fn new(snapshot: &Snapshot, row_count: i64) -> Self {
        Self {
            id: snapshot.id.to_string(),
            captured_at: snapshot.captured_at,
            filename: snapshot.filename.clone(),
            kingdom: snapshot.kingdom.clone(),
            season_id: snapshot.season_id.map(|id| id.to_string()),
            row_count,
            created_at: snapshot.created_at,
        }
    }
}

impl From<(PlayerSnapshot, Player)> for SnapshotPlayerResponse {
    fn from((row, player): (PlayerSnapshot, Player)) -> Self {
        Self {
            lord_id: row.lord_id.to_string(),
            alliance: tag(row.alliance.as_ref()),
            name: row.name,
            stats: row.stats,
            captured_at: row.captured_at,
            current_name: player.current_name,
            has_left_realm: player.has_left_realm,
            last_seen_at: player.last_seen_at,
            left_realm_at: player.left_realm_at,
        }
    }
}

// ============================================================================
// Player Mappers
// ============================================================================

impl From<&Player> for PlayerResponse {
    fn from(player: &Player) -> Self {
        Self {
            lord_id: player.lord_id.to_string(),
            current_name: player.current_name.clone(),
            current_alliance: tag(player.current_alliance.as_ref()),
            has_left_realm: player.has_left_realm,
            last_seen_at: player.last_seen_at,
            left_realm_at: player.left_realm_at,
            created_at: player.created_at,
            updated_at: player.updated_at,
        }
    }
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        Self::from(&player)
    }
}

impl From<PlayerSnapshot> for StatPointResponse {
    fn from(row: PlayerSnapshot) -> Self {
        Self {
            snapshot_id: row.snapshot_id.to_string(),
            captured_at: row.captured_at,
            alliance: tag(row.alliance.as_ref()),
            name: row.name,
            stats: row.stats,
        }
    }
}

impl From<NameChange> for NameChangeResponse {
    fn from(change: NameChange) -> Self {
        Self {
            old_name: change.old_name,
            new_name: change.new_name,
            detected_at: change.detected_at,
        }
    }
}

impl From<AllianceChange> for AllianceChangeResponse {
    fn from(change: AllianceChange) -> Self {
        let kind = if change.is_join() {
            "join"
        } else if change.is_leave() {
            "leave"
        } else {
            "switch"
        };
        Self {
            old_alliance: tag(change.old_alliance.as_ref()),
            new_alliance: tag(change.new_alliance.as_ref()),
            kind,
            detected_at: change.detected_at,
        }
    }
}

impl From<LeftRealmUpdate> for LeftRealmResponse {
    fn from(update: LeftRealmUpdate) -> Self {
        Self {
            player: PlayerResponse::from(&update.player),
            changed: update.changed,
        }
    }
}

// ============================================================================
// Upload / Sweep Mappers
// ============================================================================

impl From<&Upload> for UploadResponse {
    fn from(upload: &Upload) -> Self {
        Self {
            id: upload.id.to_string(),
            filename: upload.filename.clone(),
            uploaded_by: upload.uploaded_by.to_string(),
            kingdom: upload.kingdom.clone(),
            status: upload.status.as_str().to_string(),
            row_count: upload.row_count,
            error_message: upload.error_message.clone(),
            snapshot_id: upload.snapshot_id.map(|id| id.to_string()),
            created_at: upload.created_at,
            completed_at: upload.completed_at,
        }
    }
}

impl From<Upload> for UploadResponse {
    fn from(upload: Upload) -> Self {
        Self::from(&upload)
    }
}

impl From<&SweepReport> for SweepSummary {
    fn from(report: &SweepReport) -> Self {
        Self {
            evaluated: report.evaluated,
            marked_left: report.marked_left.len(),
            cleared: report.cleared.len(),
            failed: report.failed.len(),
        }
    }
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            evaluated: report.evaluated,
            marked_left: report.marked_left.iter().map(ToString::to_string).collect(),
            cleared: report.cleared.iter().map(ToString::to_string).collect(),
            failed: report
                .failed
                .into_iter()
                .map(|failure| SweepFailureResponse {
                    lord_id: failure.lord_id.to_string(),
                    error: failure.error,
                })
                .collect(),
        }
    }
}
