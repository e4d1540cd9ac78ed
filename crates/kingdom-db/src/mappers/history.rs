//! History event mappers

use kingdom_core::entities::{AllianceChange, NameChange};
use kingdom_core::value_objects::{AllianceTag, LordId, Snowflake};

use crate::models::{AllianceChangeModel, NameChangeModel};

impl From<NameChangeModel> for NameChange {
    fn from(model: NameChangeModel) -> Self {
        NameChange {
            id: Snowflake::new(model.id),
            player_id: Snowflake::new(model.player_id),
            lord_id: LordId::new(model.lord_id),
            old_name: model.old_name,
            new_name: model.new_name,
            detected_at: model.detected_at,
        }
    }
}

impl From<AllianceChangeModel> for AllianceChange {
    fn from(model: AllianceChangeModel) -> Self {
        AllianceChange {
            id: Snowflake::new(model.id),
            player_id: Snowflake::new(model.player_id),
            lord_id: LordId::new(model.lord_id),
            old_alliance: AllianceTag::normalize(model.old_alliance.as_deref()),
            new_alliance: AllianceTag::normalize(model.new_alliance.as_deref()),
            detected_at: model.detected_at,
        }
    }
}
