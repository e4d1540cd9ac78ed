//! Upload handlers
//!
//! Spreadsheet submission and the upload audit trail.

use axum::{extract::State, Json};
use kingdom_core::UserRole;
use kingdom_service::dto::{IngestionResponse, RecentQuery, UploadResponse};
use kingdom_service::{IngestionService, ServiceError, UploadService};

use crate::extractors::{ApiPath, ApiQuery, AuthUser, UploadForm, UploadIdPath};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Ingest one exported spreadsheet
///
/// Ingestion runs on its own task, so a request timeout or a dropped
/// connection cannot leave the upload PROCESSING.
///
/// POST /uploads
pub async fn create_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    form: UploadForm,
) -> ApiResult<Created<Json<IngestionResponse>>> {
    auth.require(UserRole::Editor)?;

    let request = form.into_request(auth.user_id)?;
    let ctx = state.shared_context();
    let response = tokio::spawn(async move { IngestionService::new(&ctx).ingest(request).await })
        .await
        .map_err(|e| ServiceError::internal(format!("ingestion task failed: {e}")))??;
    Ok(Created(Json(response)))
}

/// Recent uploads, newest first
///
/// GET /uploads
pub async fn list_uploads(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<RecentQuery>,
) -> ApiResult<Json<Vec<UploadResponse>>> {
    let uploads = UploadService::new(state.service_context()).list(query).await?;
    Ok(Json(uploads))
}

/// GET /uploads/{upload_id}
pub async fn get_upload(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(path): ApiPath<UploadIdPath>,
) -> ApiResult<Json<UploadResponse>> {
    let upload = UploadService::new(state.service_context())
        .get(path.upload_id()?)
        .await?;
    Ok(Json(upload))
}
