//! Business logic services
//!
//! The ingestion pipeline is split across four services that mirror its
//! stages: [`SnapshotStore`], [`PlayerRegistry`], the change detection rules
//! in `kingdom-core`, and [`RealmStatusService`]. [`IngestionService`]
//! orchestrates them. The remaining services are read-side queries.

pub mod context;
pub mod error;
pub mod ingestion;
pub mod player;
pub mod realm_status;
pub mod registry;
pub mod snapshot;
pub mod snapshot_store;
pub mod upload;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use ingestion::{IngestionRequest, IngestionService};
pub use player::PlayerService;
pub use realm_status::{LeftRealmUpdate, RealmStatusService, SweepFailure, SweepReport};
pub use registry::{ObservationTally, PlayerRegistry};
pub use snapshot::SnapshotService;
pub use snapshot_store::{PartialCommit, RowsCommitted, SnapshotStore};
pub use upload::UploadService;
