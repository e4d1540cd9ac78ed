//! Player <-> model mapper

use kingdom_core::entities::{Player, RealmCandidate};
use kingdom_core::value_objects::{AllianceTag, LordId, Snowflake};

use crate::models::{PlayerModel, RealmCandidateModel};

/// Column value for an optional alliance tag
pub fn alliance_column(tag: Option<&AllianceTag>) -> Option<&str> {
    tag.map(AllianceTag::as_str)
}

impl From<PlayerModel> for Player {
    fn from(model: PlayerModel) -> Self {
        Player {
            id: Snowflake::new(model.id),
            lord_id: LordId::new(model.lord_id),
            current_name: model.current_name,
            current_alliance: AllianceTag::normalize(model.current_alliance.as_deref()),
            has_left_realm: model.has_left_realm,
            last_seen_at: model.last_seen_at,
            left_realm_at: model.left_realm_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<RealmCandidateModel> for RealmCandidate {
    fn from(model: RealmCandidateModel) -> Self {
        RealmCandidate {
            lord_id: LordId::new(model.lord_id),
            has_left_realm: model.has_left_realm,
            last_seen_at: model.last_seen_at,
            left_realm_at: model.left_realm_at,
            latest_power: model.latest_power,
        }
    }
}
