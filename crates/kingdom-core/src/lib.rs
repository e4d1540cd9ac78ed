//! # kingdom-core
//!
//! Domain layer containing entities, value objects, repository traits, and the
//! pure rules of the ingestion pipeline (change detection and realm-status
//! inference). This crate has zero dependencies on infrastructure
//! (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod rules;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AllianceChange, NameChange, Player, PlayerSnapshot, PlayerStats, RealmCandidate,
    Season, Snapshot, SnapshotMetadata, Upload, UploadStatus,
};
pub use error::DomainError;
pub use rules::{
    detect_changes, ObservedChanges, RealmDecision, RealmPolicy, DEFAULT_POWER_FLOOR,
    DEFAULT_STALE_DAYS, MAX_STALE_DAYS,
};
pub use traits::{
    Clock, HistoryRepository, PlayerFilter, PlayerRepository, RepoResult, RowWrite,
    SeasonRepository, SnapshotBatch, SnapshotFilter, SnapshotRepository, SnapshotRowFilter,
    FixedClock, SystemClock, UploadRepository,
};
pub use value_objects::{
    AllianceTag, LordId, LordIdParseError, Snowflake, SnowflakeGenerator, SnowflakeParseError,
    UserRole,
};
