//! Upload entity - bookkeeping for one ingestion attempt

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Lifecycle of an upload: `Processing -> Completed | Failed`, exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    Processing,
    Completed,
    Failed,
}

impl UploadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROCESSING" => Some(Self::Processing),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingestion attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upload {
    pub id: Snowflake,
    pub filename: String,
    pub uploaded_by: Snowflake,
    pub kingdom: String,
    pub status: UploadStatus,
    pub row_count: i64,
    pub error_message: Option<String>,
    pub snapshot_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Upload {
    /// Start tracking a new attempt in `Processing`
    pub fn start(
        id: Snowflake,
        filename: String,
        uploaded_by: Snowflake,
        kingdom: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            filename,
            uploaded_by,
            kingdom,
            status: UploadStatus::Processing,
            row_count: 0,
            error_message: None,
            snapshot_id: None,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn complete(&mut self, row_count: i64, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_processing(UploadStatus::Completed)?;
        self.status = UploadStatus::Completed;
        self.row_count = row_count;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Move to `Failed`; `row_count` records rows already committed
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        row_count: i64,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_processing(UploadStatus::Failed)?;
        self.status = UploadStatus::Failed;
        self.error_message = Some(message.into());
        self.row_count = row_count;
        self.completed_at = Some(at);
        Ok(())
    }

    fn ensure_processing(&self, to: UploadStatus) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidUploadTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}
