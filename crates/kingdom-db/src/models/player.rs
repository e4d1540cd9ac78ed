//! Player registry database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for players table
#[derive(Debug, Clone, FromRow)]
pub struct PlayerModel {
    pub id: i64,
    pub lord_id: i64,
    pub current_name: String,
    pub current_alliance: Option<String>,
    pub has_left_realm: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub left_realm_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Player joined with the power of its most recent row
#[derive(Debug, Clone, FromRow)]
pub struct RealmCandidateModel {
    pub lord_id: i64,
    pub has_left_realm: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub left_realm_at: Option<DateTime<Utc>>,
    pub latest_power: Option<i64>,
}
