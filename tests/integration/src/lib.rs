//! Integration test utilities for the kingdom tracker API
//!
//! Spawns the real router over the in-memory store and drives it with
//! `reqwest`.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
