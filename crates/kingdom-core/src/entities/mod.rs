//! Domain entities - core business objects

mod history;
mod player;
mod season;
mod snapshot;
mod upload;

pub use history::{AllianceChange, NameChange};
pub use player::{Player, RealmCandidate};
pub use season::Season;
pub use snapshot::{PlayerSnapshot, PlayerStats, Snapshot, SnapshotMetadata};
pub use upload::{Upload, UploadStatus};
