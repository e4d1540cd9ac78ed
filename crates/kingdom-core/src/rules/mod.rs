//! Pure ingestion rules
//!
//! Nothing in here touches storage: the services feed registry state in and
//! persist whatever comes out.

mod change_detector;
mod realm_status;

pub use change_detector::{detect_changes, ObservedChanges};
pub use realm_status::{
    RealmDecision, RealmPolicy, DEFAULT_POWER_FLOOR, DEFAULT_STALE_DAYS, MAX_STALE_DAYS,
};
