//! Service context - dependency container for services
//!
//! Holds the store handles, clock, and tuning every service needs. Services
//! never reach for global state; whatever backs the repositories (PostgreSQL
//! or the in-memory store) is decided once, when the context is built.

use std::sync::Arc;

use kingdom_common::{IngestionConfig, JwtService};
use kingdom_core::traits::{
    Clock, HistoryRepository, PlayerRepository, SeasonRepository, SnapshotRepository, SystemClock,
    UploadRepository,
};
use kingdom_core::{RealmPolicy, Snowflake, SnowflakeGenerator};
use kingdom_db::{
    MemoryStore, PgHistoryRepository, PgPlayerRepository, PgPool, PgSeasonRepository,
    PgSnapshotRepository, PgUploadRepository, TxBounds,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Present only for the PostgreSQL backend
    pool: Option<PgPool>,

    // Repositories
    snapshot_repo: Arc<dyn SnapshotRepository>,
    player_repo: Arc<dyn PlayerRepository>,
    history_repo: Arc<dyn HistoryRepository>,
    upload_repo: Arc<dyn UploadRepository>,
    season_repo: Arc<dyn SeasonRepository>,

    // Services
    clock: Arc<dyn Clock>,
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    // Tuning
    ingestion: IngestionConfig,
    realm_policy: RealmPolicy,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Store ===

    /// PostgreSQL pool, when running against PostgreSQL
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Check that the backing store answers
    pub async fn ping_store(&self) -> bool {
        match &self.pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => true,
        }
    }

    // === Repositories ===

    pub fn snapshot_repo(&self) -> &dyn SnapshotRepository {
        self.snapshot_repo.as_ref()
    }

    pub fn player_repo(&self) -> &dyn PlayerRepository {
        self.player_repo.as_ref()
    }

    pub fn history_repo(&self) -> &dyn HistoryRepository {
        self.history_repo.as_ref()
    }

    pub fn upload_repo(&self) -> &dyn UploadRepository {
        self.upload_repo.as_ref()
    }

    pub fn season_repo(&self) -> &dyn SeasonRepository {
        self.season_repo.as_ref()
    }

    // === Services ===

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    // === Tuning ===

    pub fn ingestion(&self) -> &IngestionConfig {
        &self.ingestion
    }

    pub fn realm_policy(&self) -> &RealmPolicy {
        &self.realm_policy
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("repositories", &"...")
            .field("ingestion", &self.ingestion)
            .field("realm_policy", &self.realm_policy)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    snapshot_repo: Option<Arc<dyn SnapshotRepository>>,
    player_repo: Option<Arc<dyn PlayerRepository>>,
    history_repo: Option<Arc<dyn HistoryRepository>>,
    upload_repo: Option<Arc<dyn UploadRepository>>,
    season_repo: Option<Arc<dyn SeasonRepository>>,
    clock: Option<Arc<dyn Clock>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    ingestion: Option<IngestionConfig>,
    realm_policy: Option<RealmPolicy>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back every repository with one in-memory store
    pub fn memory_store(self, store: Arc<MemoryStore>) -> Self {
        let mut builder = self
            .snapshot_repo(store.clone())
            .player_repo(store.clone())
            .history_repo(store.clone())
            .upload_repo(store.clone())
            .season_repo(store);
        builder.pool = None;
        builder
    }

    /// Back every repository with PostgreSQL
    pub fn postgres(self, pool: PgPool, bounds: TxBounds) -> Self {
        let mut builder = self
            .snapshot_repo(Arc::new(PgSnapshotRepository::with_bounds(pool.clone(), bounds)))
            .player_repo(Arc::new(PgPlayerRepository::new(pool.clone())))
            .history_repo(Arc::new(PgHistoryRepository::new(pool.clone())))
            .upload_repo(Arc::new(PgUploadRepository::new(pool.clone())))
            .season_repo(Arc::new(PgSeasonRepository::new(pool.clone())));
        builder.pool = Some(pool);
        builder
    }

    pub fn snapshot_repo(mut self, repo: Arc<dyn SnapshotRepository>) -> Self {
        self.snapshot_repo = Some(repo);
        self
    }

    pub fn player_repo(mut self, repo: Arc<dyn PlayerRepository>) -> Self {
        self.player_repo = Some(repo);
        self
    }

    pub fn history_repo(mut self, repo: Arc<dyn HistoryRepository>) -> Self {
        self.history_repo = Some(repo);
        self
    }

    pub fn upload_repo(mut self, repo: Arc<dyn UploadRepository>) -> Self {
        self.upload_repo = Some(repo);
        self
    }

    pub fn season_repo(mut self, repo: Arc<dyn SeasonRepository>) -> Self {
        self.season_repo = Some(repo);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn ingestion(mut self, config: IngestionConfig) -> Self {
        self.ingestion = Some(config);
        self
    }

    pub fn realm_policy(mut self, policy: RealmPolicy) -> Self {
        self.realm_policy = Some(policy);
        self
    }

    /// Build the ServiceContext
    ///
    /// The clock, snowflake generator, ingestion tuning and realm policy fall
    /// back to their defaults; repositories and the JWT service are required.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let ingestion = self.ingestion.unwrap_or_default();
        if ingestion.batch_size == 0 {
            return Err(ServiceError::validation("batch_size must be at least 1"));
        }

        Ok(ServiceContext {
            pool: self.pool,
            snapshot_repo: self
                .snapshot_repo
                .ok_or_else(|| ServiceError::validation("snapshot_repo is required"))?,
            player_repo: self
                .player_repo
                .ok_or_else(|| ServiceError::validation("player_repo is required"))?,
            history_repo: self
                .history_repo
                .ok_or_else(|| ServiceError::validation("history_repo is required"))?,
            upload_repo: self
                .upload_repo
                .ok_or_else(|| ServiceError::validation("upload_repo is required"))?,
            season_repo: self
                .season_repo
                .ok_or_else(|| ServiceError::validation("season_repo is required"))?,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>),
            jwt_service: self
                .jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            snowflake_generator: self.snowflake_generator.unwrap_or_default(),
            ingestion,
            realm_policy: self.realm_policy.unwrap_or_default(),
        })
    }
}
