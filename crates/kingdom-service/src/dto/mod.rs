//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    HistoryQuery, LatestSnapshotQuery, MarkLeftRealmRequest, PlayerPageQuery, RecentQuery,
    SnapshotListQuery, DEFAULT_HISTORY_LIMIT, DEFAULT_PAGE_LIMIT, DEFAULT_RECENT_LIMIT,
};

pub use responses::{
    AllianceChangeResponse, ApiResponse, HealthChecks, HealthResponse, IngestionResponse,
    LeftRealmResponse, NameChangeResponse, PaginatedResponse, PaginationMeta,
    PlayerHistoryResponse, PlayerResponse, ReadinessResponse, SnapshotPlayerResponse,
    SnapshotResponse, StatPointResponse, SweepFailureResponse, SweepResponse, SweepSummary,
    UploadResponse,
};
