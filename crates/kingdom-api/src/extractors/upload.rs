//! Multipart upload extractor
//!
//! Reads the `file` part plus the optional `kingdom`, `season_id` and
//! `captured_at` (RFC 3339) text fields. Unknown parts are ignored.

use axum::{
    async_trait,
    extract::{multipart::MultipartError, FromRef, FromRequest, Multipart, Request},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use kingdom_common::AppError;
use kingdom_core::{DomainError, Snowflake};
use kingdom_service::IngestionRequest;

use crate::response::ApiError;
use crate::state::AppState;

/// Parsed multipart upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
    pub kingdom: Option<String>,
    pub season_id: Option<Snowflake>,
    pub captured_at: Option<DateTime<Utc>>,
}

impl UploadForm {
    /// Build the ingestion request; a form without a file part is rejected
    pub fn into_request(self, uploaded_by: Snowflake) -> Result<IngestionRequest, ApiError> {
        let filename = self.filename.ok_or(DomainError::MissingFile)?;
        Ok(IngestionRequest {
            filename,
            bytes: self.bytes,
            uploaded_by,
            kingdom: self.kingdom,
            season_id: self.season_id,
            captured_at: self.captured_at,
        })
    }

    fn apply_text(&mut self, name: &str, value: String) -> Result<(), ApiError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }

        match name {
            "kingdom" => self.kingdom = Some(value.to_string()),
            "season_id" => {
                let id = Snowflake::parse(value)
                    .map_err(|_| ApiError::invalid_form("season_id must be a numeric id"))?;
                self.season_id = Some(id);
            }
            "captured_at" => {
                let at = DateTime::parse_from_rfc3339(value)
                    .map_err(|_| ApiError::invalid_form("captured_at must be an RFC 3339 timestamp"))?;
                self.captured_at = Some(at.with_timezone(&Utc));
            }
            _ => {}
        }
        Ok(())
    }
}

fn multipart_error(err: &MultipartError, limit_mb: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(limit_mb).into()
    } else {
        ApiError::invalid_form(err.body_text())
    }
}

#[async_trait]
impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let limit_mb = AppState::from_ref(state).config().ingestion.max_upload_size_mb;
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_form(e.body_text()))?;

        let mut form = UploadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e, limit_mb))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                form.filename = Some(field.file_name().unwrap_or_default().to_string());
                form.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&e, limit_mb))?
                    .to_vec();
            } else {
                let value = field.text().await.map_err(|e| multipart_error(&e, limit_mb))?;
                form.apply_text(&name, value)?;
            }
        }

        Ok(form)
    }
}
