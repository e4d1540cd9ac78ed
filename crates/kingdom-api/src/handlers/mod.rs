//! HTTP request handlers
//!
//! Handlers are thin: extract, check the caller's role, delegate to a
//! service, wrap the result.

pub mod admin;
pub mod health;
pub mod players;
pub mod snapshots;
pub mod uploads;
