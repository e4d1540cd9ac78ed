//! # kingdom-db
//!
//! Storage layer implementing the repository traits of `kingdom-core`.
//!
//! ## Overview
//!
//! - Connection pool management and SQL migrations (PostgreSQL via SQLx)
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations, including bounded per-batch transactions
//!   for snapshot ingestion
//! - [`memory::MemoryStore`], an in-process implementation of every trait
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kingdom_db::{create_pool, run_migrations, PgPlayerRepository, PoolConfig};
//! use kingdom_core::traits::PlayerRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::default()).await?;
//!     run_migrations(&pool).await?;
//!     let players = PgPlayerRepository::new(pool);
//!     let candidates = players.realm_candidates().await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig, TxBounds};
pub use repositories::{
    PgHistoryRepository, PgPlayerRepository, PgSeasonRepository, PgSnapshotRepository,
    PgUploadRepository,
};
