//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in kingdom-core.
//! Each repository handles database operations for a specific domain entity.

mod error;
mod history;
mod player;
mod season;
mod snapshot;
mod upload;

pub use history::PgHistoryRepository;
pub use player::PgPlayerRepository;
pub use season::PgSeasonRepository;
pub use snapshot::PgSnapshotRepository;
pub use upload::PgUploadRepository;
