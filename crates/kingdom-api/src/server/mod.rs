//! Server setup and initialization
//!
//! Builds the store selected by configuration, the service context, and the
//! Axum application.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use kingdom_common::{AppConfig, AppError, JwtService, StoreBackend};
use kingdom_core::{RealmPolicy, SnowflakeGenerator};
use kingdom_db::{create_pool, run_migrations, MemoryStore, PoolConfig, TxBounds};
use kingdom_service::{ServiceContext, UploadService};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_middleware, rate_limit};
use crate::routes::{api_routes, health_routes, API_PREFIX};
use crate::state::AppState;

/// Build the complete application with all routes and middleware
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();

    let v1 = rate_limit(api_routes(config.ingestion.max_upload_bytes()), &config.rate_limit)?
        .merge(health_routes());
    let router = apply_middleware(
        Router::new().nest(API_PREFIX, v1),
        &config.cors,
        config.app.env.is_production(),
        config.api.request_timeout(),
    );

    Ok(router.with_state(state))
}

/// Initialize the store and services and create the AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));
    let realm_policy = RealmPolicy::new(config.realm.power_floor, config.realm.stale_days)
        .ok_or_else(|| {
            AppError::Config(format!(
                "REALM_STALE_DAYS out of range: {}",
                config.realm.stale_days
            ))
        })?;

    let builder = ServiceContext::builder()
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .ingestion(config.ingestion.clone())
        .realm_policy(realm_policy);

    let builder = match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            builder.memory_store(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&PoolConfig::from(&config.database))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            if config.database.run_migrations {
                run_migrations(&pool)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            builder.postgres(pool, TxBounds::from(&config.ingestion))
        }
    };

    let service_context = builder
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    UploadService::new(&service_context)
        .fail_interrupted()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(AppState::new(service_context, config))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid listen address: {}", config.api.address())))?;

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, addr).await
}
