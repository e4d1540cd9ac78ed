//! Upload database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for uploads table
#[derive(Debug, Clone, FromRow)]
pub struct UploadModel {
    pub id: i64,
    pub filename: String,
    pub uploaded_by: i64,
    pub kingdom: String,
    pub status: String,
    pub row_count: i64,
    pub error_message: Option<String>,
    pub snapshot_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UploadModel {
    #[inline]
    pub fn is_processing(&self) -> bool {
        self.status == "PROCESSING"
    }
}
