//! Entity to model mappers
//!
//! - `From<Model> for Entity`: convert database rows to domain objects
//! - `*Insert` structs: borrow entity data as column values for binding

mod history;
mod player;
mod season;
mod snapshot;
mod upload;

pub use player::alliance_column;
pub use snapshot::PlayerSnapshotInsert;
pub use upload::UploadFinish;
