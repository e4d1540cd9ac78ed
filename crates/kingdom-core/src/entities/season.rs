//! Season entity - optional grouping of snapshots

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::Snowflake;

/// A game season that snapshots may be associated with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Season {
    pub id: Snowflake,
    pub name: String,
    pub kingdom: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Season {
    /// Whether the season covers the given instant
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        at >= self.started_at && self.ended_at.map_or(true, |end| at < end)
    }
}
