//! PostgreSQL implementation of UploadRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use kingdom_core::entities::{Upload, UploadStatus};
use kingdom_core::error::DomainError;
use kingdom_core::traits::{RepoResult, UploadRepository};
use kingdom_core::value_objects::Snowflake;

use crate::mappers::UploadFinish;
use crate::models::UploadModel;

use super::error::map_db_error;

const UPLOAD_COLUMNS: &str = "id, filename, uploaded_by, kingdom, status, row_count, \
                              error_message, snapshot_id, created_at, completed_at";

/// PostgreSQL implementation of UploadRepository
#[derive(Clone)]
pub struct PgUploadRepository {
    pool: PgPool,
}

impl PgUploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadRepository for PgUploadRepository {
    #[instrument(skip(self, upload), fields(upload_id = %upload.id))]
    async fn create(&self, upload: &Upload) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO uploads (id, filename, uploaded_by, kingdom, status, row_count,
                                 error_message, snapshot_id, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(upload.id.into_inner())
        .bind(&upload.filename)
        .bind(upload.uploaded_by.into_inner())
        .bind(&upload.kingdom)
        .bind(upload.status.as_str())
        .bind(upload.row_count)
        .bind(upload.error_message.as_deref())
        .bind(upload.snapshot_id.map(Snowflake::into_inner))
        .bind(upload.created_at)
        .bind(upload.completed_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Upload>> {
        let result = sqlx::query_as::<_, UploadModel>(&format!(
            "SELECT {UPLOAD_COLUMNS} FROM uploads WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Upload::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, limit: i64) -> RepoResult<Vec<Upload>> {
        let results = sqlx::query_as::<_, UploadModel>(&format!(
            "SELECT {UPLOAD_COLUMNS} FROM uploads ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Upload::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn list_processing(&self) -> RepoResult<Vec<Upload>> {
        let results = sqlx::query_as::<_, UploadModel>(&format!(
            "SELECT {UPLOAD_COLUMNS} FROM uploads WHERE status = 'PROCESSING' \
             ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Upload::try_from).collect()
    }

    #[instrument(skip(self, upload), fields(upload_id = %upload.id, status = %upload.status))]
    async fn finish(&self, upload: &Upload) -> RepoResult<()> {
        let finish = UploadFinish::new(upload);
        let result = sqlx::query(
            r#"
            UPDATE uploads
            SET status = $2, row_count = $3, error_message = $4, snapshot_id = $5,
                completed_at = $6
            WHERE id = $1 AND status = 'PROCESSING'
            "#,
        )
        .bind(finish.id)
        .bind(finish.status)
        .bind(finish.row_count)
        .bind(finish.error_message)
        .bind(finish.snapshot_id)
        .bind(finish.completed_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Either the upload is gone or it already reached a terminal state
        let stored = sqlx::query_as::<_, UploadModel>(&format!(
            "SELECT {UPLOAD_COLUMNS} FROM uploads WHERE id = $1"
        ))
        .bind(finish.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match stored {
            None => Err(DomainError::UploadNotFound(upload.id)),
            Some(model) if model.is_processing() => Err(DomainError::DatabaseError(
                "upload row was not updated".to_string(),
            )),
            Some(model) => Err(DomainError::InvalidUploadTransition {
                from: UploadStatus::parse(&model.status).unwrap_or(UploadStatus::Failed),
                to: upload.status,
            }),
        }
    }
}
