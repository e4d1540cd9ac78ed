//! Append-only name and alliance history events

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::{AllianceTag, LordId, Snowflake};

/// A detected rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameChange {
    pub id: Snowflake,
    pub player_id: Snowflake,
    pub lord_id: LordId,
    pub old_name: String,
    pub new_name: String,
    pub detected_at: DateTime<Utc>,
}

/// A detected alliance move; `None` on either side means "no alliance"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllianceChange {
    pub id: Snowflake,
    pub player_id: Snowflake,
    pub lord_id: LordId,
    pub old_alliance: Option<AllianceTag>,
    pub new_alliance: Option<AllianceTag>,
    pub detected_at: DateTime<Utc>,
}

impl AllianceChange {
    /// The player joined an alliance from having none
    pub fn is_join(&self) -> bool {
        self.old_alliance.is_none() && self.new_alliance.is_some()
    }

    /// The player left an alliance and is now unaffiliated
    pub fn is_leave(&self) -> bool {
        self.old_alliance.is_some() && self.new_alliance.is_none()
    }
}
