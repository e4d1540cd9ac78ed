//! # kingdom-service
//!
//! Application layer: spreadsheet import, the ingestion pipeline, the
//! realm-status sweep, read-side queries, and the DTOs the API serializes.

pub mod dto;
pub mod import;
pub mod services;

pub use import::{parse_upload, FileKind, ParsedRow, ParsedSheet};
pub use services::{
    IngestionRequest, IngestionService, PlayerService, RealmStatusService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, SnapshotService, SnapshotStore,
    UploadService,
};
