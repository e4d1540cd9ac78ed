//! Player entity - the registry's current-state record for one lord

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::{AllianceTag, LordId, Snowflake};

/// Current-state record for one external player identity
///
/// History lives elsewhere (snapshot rows, name/alliance change logs); this
/// record only holds what the latest observation says plus the left-realm flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: Snowflake,
    pub lord_id: LordId,
    pub current_name: String,
    pub current_alliance: Option<AllianceTag>,
    pub has_left_realm: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub left_realm_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Create the record for a lord seen for the first time
    ///
    /// `seen_at` is the snapshot capture time, `now` the write time.
    pub fn first_seen(
        id: Snowflake,
        lord_id: LordId,
        name: String,
        alliance: Option<AllianceTag>,
        seen_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            lord_id,
            current_name: name,
            current_alliance: alliance,
            has_left_realm: false,
            last_seen_at: Some(seen_at),
            left_realm_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record an appearance; `last_seen_at` never moves backwards
    ///
    /// Returns true if the timestamp advanced.
    pub fn touch_seen(&mut self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.last_seen_at {
            Some(current) if current >= at => false,
            _ => {
                self.last_seen_at = Some(at);
                self.updated_at = now;
                true
            }
        }
    }

    /// Flag the player as having left the realm (idempotent)
    ///
    /// Returns true if the flag changed. An already-flagged player keeps its
    /// original `left_realm_at`.
    pub fn mark_left_realm(&mut self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if self.has_left_realm {
            return false;
        }
        self.has_left_realm = true;
        self.left_realm_at = Some(at);
        self.updated_at = now;
        true
    }

    /// Clear the left-realm flag (idempotent)
    pub fn clear_left_realm(&mut self, now: DateTime<Utc>) -> bool {
        if !self.has_left_realm && self.left_realm_at.is_none() {
            return false;
        }
        self.has_left_realm = false;
        self.left_realm_at = None;
        self.updated_at = now;
        true
    }
}

/// Input row for the realm-status sweep
///
/// `latest_power` is the power on the player's most recent snapshot row, or
/// `None` if the player has no rows at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmCandidate {
    pub lord_id: LordId,
    pub has_left_realm: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub left_realm_at: Option<DateTime<Utc>>,
    pub latest_power: Option<i64>,
}

impl From<&Player> for RealmCandidate {
    fn from(player: &Player) -> Self {
        Self {
            lord_id: player.lord_id,
            has_left_realm: player.has_left_realm,
            last_seen_at: player.last_seen_at,
            left_realm_at: player.left_realm_at,
            latest_power: None,
        }
    }
}
