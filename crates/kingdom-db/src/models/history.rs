//! History event database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for name_changes table
#[derive(Debug, Clone, FromRow)]
pub struct NameChangeModel {
    pub id: i64,
    pub player_id: i64,
    pub lord_id: i64,
    pub old_name: String,
    pub new_name: String,
    pub detected_at: DateTime<Utc>,
}

/// Database model for alliance_changes table
#[derive(Debug, Clone, FromRow)]
pub struct AllianceChangeModel {
    pub id: i64,
    pub player_id: i64,
    pub lord_id: i64,
    pub old_alliance: Option<String>,
    pub new_alliance: Option<String>,
    pub detected_at: DateTime<Utc>,
}
