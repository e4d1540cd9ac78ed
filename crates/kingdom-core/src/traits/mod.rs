//! Ports - what the domain needs from the outside world

mod clock;
mod repositories;

pub use clock::{Clock, FixedClock, SystemClock};
pub use repositories::{
    HistoryRepository, PlayerFilter, PlayerRepository, RepoResult, RowWrite, SeasonRepository,
    SnapshotBatch, SnapshotFilter, SnapshotRepository, SnapshotRowFilter, UploadRepository,
};
