//! Path parameter extractors
//!
//! Identifiers arrive as strings and are parsed here, so a malformed id is a
//! 400 with the standard envelope rather than axum's plain-text rejection.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use kingdom_core::{LordId, Snowflake};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::response::ApiError;

/// `Path` with an [`ApiError`] rejection
#[derive(Debug, Clone)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        Ok(ApiPath(inner))
    }
}

#[derive(Debug, Deserialize)]
pub struct SnapshotIdPath {
    pub snapshot_id: String,
}

impl SnapshotIdPath {
    pub fn snapshot_id(&self) -> Result<Snowflake, ApiError> {
        Snowflake::parse(&self.snapshot_id).map_err(|_| ApiError::invalid_path("Invalid snapshot_id format"))
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadIdPath {
    pub upload_id: String,
}

impl UploadIdPath {
    pub fn upload_id(&self) -> Result<Snowflake, ApiError> {
        Snowflake::parse(&self.upload_id).map_err(|_| ApiError::invalid_path("Invalid upload_id format"))
    }
}

#[derive(Debug, Deserialize)]
pub struct LordIdPath {
    pub lord_id: String,
}

impl LordIdPath {
    pub fn lord_id(&self) -> Result<LordId, ApiError> {
        LordId::parse(&self.lord_id).map_err(|_| ApiError::invalid_path("Invalid lord_id format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lord_id_parsing() {
        let path = LordIdPath {
            lord_id: "184467".to_string(),
        };
        assert_eq!(path.lord_id().unwrap(), LordId::new(184_467));

        let bad = LordIdPath {
            lord_id: "lord-1".to_string(),
        };
        assert_eq!(bad.lord_id().unwrap_err().error_code(), "INVALID_PATH_PARAMETER");
    }

    #[test]
    fn test_snapshot_id_parsing() {
        let bad = SnapshotIdPath {
            snapshot_id: String::new(),
        };
        assert!(bad.snapshot_id().is_err());
    }
}
