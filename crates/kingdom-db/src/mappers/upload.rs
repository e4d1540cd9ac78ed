//! Upload <-> model mapper

use chrono::{DateTime, Utc};
use kingdom_core::entities::{Upload, UploadStatus};
use kingdom_core::error::DomainError;
use kingdom_core::value_objects::Snowflake;

use crate::models::UploadModel;

impl TryFrom<UploadModel> for Upload {
    type Error = DomainError;

    fn try_from(model: UploadModel) -> Result<Self, Self::Error> {
        let status = UploadStatus::parse(&model.status).ok_or_else(|| {
            DomainError::DatabaseError(format!("unknown upload status '{}'", model.status))
        })?;

        Ok(Upload {
            id: Snowflake::new(model.id),
            filename: model.filename,
            uploaded_by: Snowflake::new(model.uploaded_by),
            kingdom: model.kingdom,
            status,
            row_count: model.row_count,
            error_message: model.error_message,
            snapshot_id: model.snapshot_id.map(Snowflake::new),
            created_at: model.created_at,
            completed_at: model.completed_at,
        })
    }
}

/// Column values written when an upload reaches a terminal state
pub struct UploadFinish<'a> {
    pub id: i64,
    pub status: &'static str,
    pub row_count: i64,
    pub error_message: Option<&'a str>,
    pub snapshot_id: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl<'a> UploadFinish<'a> {
    pub fn new(upload: &'a Upload) -> Self {
        Self {
            id: upload.id.into_inner(),
            status: upload.status.as_str(),
            row_count: upload.row_count,
            error_message: upload.error_message.as_deref(),
            snapshot_id: upload.snapshot_id.map(Snowflake::into_inner),
            completed_at: upload.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(status: &str) -> UploadModel {
        UploadModel {
            id: 1,
            filename: "k1042.csv".to_string(),
            uploaded_by: 9,
            kingdom: "1042".to_string(),
            status: status.to_string(),
            row_count: 45,
            error_message: None,
            snapshot_id: Some(3),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_status_round_trip() {
        let upload = Upload::try_from(model("COMPLETED")).unwrap();
        assert_eq!(upload.status, UploadStatus::Completed);
        assert_eq!(upload.snapshot_id, Some(Snowflake::new(3)));
    }

    #[test]
    fn test_unknown_status_is_database_error() {
        let err = Upload::try_from(model("HALF_DONE")).unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }
}
