//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::entities::UploadStatus;
use crate::value_objects::{LordId, Snowflake};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Player not found: {0}")]
    PlayerNotFound(LordId),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(Snowflake),

    #[error("No snapshot exists yet")]
    NoSnapshots,

    #[error("Upload not found: {0}")]
    UploadNotFound(Snowflake),

    #[error("Season not found: {0}")]
    SeasonNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("No file supplied")]
    MissingFile,

    #[error("Upload contains no player rows")]
    EmptyUpload,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Invalid row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("Unreadable spreadsheet: {0}")]
    UnreadableFile(String),

    // =========================================================================
    // State Errors
    // =========================================================================
    #[error("Upload cannot move from {from} to {to}")]
    InvalidUploadTransition {
        from: UploadStatus,
        to: UploadStatus,
    },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Store operation timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::PlayerNotFound(_) => "UNKNOWN_PLAYER",
            Self::SnapshotNotFound(_) | Self::NoSnapshots => "UNKNOWN_SNAPSHOT",
            Self::UploadNotFound(_) => "UNKNOWN_UPLOAD",
            Self::SeasonNotFound(_) => "UNKNOWN_SEASON",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::MissingFile => "MISSING_FILE",
            Self::EmptyUpload => "EMPTY_UPLOAD",
            Self::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::InvalidRow { .. } => "INVALID_ROW",
            Self::UnreadableFile(_) => "UNREADABLE_FILE",

            // State
            Self::InvalidUploadTransition { .. } => "INVALID_UPLOAD_TRANSITION",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::Timeout(_) => "STORE_TIMEOUT",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PlayerNotFound(_)
                | Self::SnapshotNotFound(_)
                | Self::NoSnapshots
                | Self::UploadNotFound(_)
                | Self::SeasonNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::MissingFile
                | Self::EmptyUpload
                | Self::UnsupportedFileType(_)
                | Self::MissingColumn(_)
                | Self::InvalidRow { .. }
                | Self::UnreadableFile(_)
        )
    }

    /// Check if this is a conflict with current state
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::InvalidUploadTransition { .. })
    }

    /// Check if this is a store timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
