//! Route definitions
//!
//! All routes are mounted under /api/v1.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{admin, health, players, snapshots, uploads};
use crate::state::AppState;

/// API prefix for every route
pub const API_PREFIX: &str = "/api/v1";

/// Rate-limited API routes; `max_upload_bytes` caps the upload body
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(upload_routes(max_upload_bytes))
        .merge(snapshot_routes())
        .merge(player_routes())
        .merge(admin_routes())
}

/// Health checks, kept out of the rate limiter
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/uploads",
            post(uploads::create_upload)
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .get(uploads::list_uploads),
        )
        .route("/uploads/:upload_id", get(uploads::get_upload))
}

fn snapshot_routes() -> Router<AppState> {
    Router::new()
        .route("/snapshots", get(snapshots::list_snapshots))
        .route("/snapshots/latest", get(snapshots::get_latest_snapshot))
        .route("/snapshots/:snapshot_id", get(snapshots::get_snapshot))
        .route("/snapshots/:snapshot_id/players", get(snapshots::get_snapshot_players))
}

fn player_routes() -> Router<AppState> {
    Router::new()
        .route("/players", get(players::list_players))
        .route("/players/:lord_id", get(players::get_player))
        .route("/players/:lord_id/history", get(players::get_player_history))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/realm-status/sweep", post(admin::run_sweep))
        .route(
            "/admin/players/:lord_id/left-realm",
            put(admin::mark_left_realm).delete(admin::clear_left_realm),
        )
}
