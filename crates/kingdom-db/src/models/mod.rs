//! Database models - SQLx-compatible structs for PostgreSQL tables

mod history;
mod player;
mod season;
mod snapshot;
mod upload;

pub use history::{AllianceChangeModel, NameChangeModel};
pub use player::{PlayerModel, RealmCandidateModel};
pub use season::SeasonModel;
pub use snapshot::{PlayerSnapshotModel, SnapshotModel, SnapshotRowModel};
pub use upload::UploadModel;
