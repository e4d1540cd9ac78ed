//! Season database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for seasons table
#[derive(Debug, Clone, FromRow)]
pub struct SeasonModel {
    pub id: i64,
    pub name: String,
    pub kingdom: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}
