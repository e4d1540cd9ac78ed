//! API Integration Tests
//!
//! Every test spawns the real router over a fresh in-memory store, so no
//! external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use std::sync::Arc;

use chrono::{Duration, Utc};
use integration_tests::{
    assert_json, assert_status, export_csv, numbered_rows, test_config_with, ErrorEnvelope, IngestionResponse,
    LeftRealmResponse, MarkLeftRealm, Page, PlayerHistory, PlayerResponse, SheetRow,
    SnapshotPlayer, SnapshotResponse, SweepResponse, TestServer, UploadResponse,
};
use kingdom_core::traits::UploadRepository;
use kingdom_core::{Snowflake, Upload, UserRole};
use kingdom_db::MemoryStore;
use reqwest::StatusCode;

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339()
}

async fn ingest(server: &TestServer, rows: &[SheetRow], captured_at: &str) -> IngestionResponse {
    let token = server.token(UserRole::Editor);
    let response = server
        .upload(&token, "export.csv", export_csv(rows), &[("captured_at", captured_at)])
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready_reports_backend() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["backend"], "memory");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_queries_require_token() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/players").await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(body.error.code, "MISSING_AUTH");

    let response = server.get_auth("/players", "not-a-jwt").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_viewer_cannot_upload() {
    let server = TestServer::start().await.unwrap();
    let token = server.token(UserRole::Viewer);

    let csv = export_csv(&[SheetRow::new(1, "Aldric", "KOR", 1_000)]);
    let response = server.upload(&token, "export.csv", csv, &[]).await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "INSUFFICIENT_PERMISSIONS");
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_creates_snapshot_and_players() {
    let server = TestServer::start().await.unwrap();
    let viewer = server.token(UserRole::Viewer);

    let rows = [
        SheetRow::new(101, "Aldric", "KOR", 52_000_000),
        SheetRow::new(102, "Brenna", "", 5_000_000),
        SheetRow::new(103, "Cato", "WAR", 20_000_000),
    ];
    let ingested = ingest(&server, &rows, &Utc::now().to_rfc3339()).await;

    assert_eq!(ingested.rows_processed, 3);
    assert_eq!(ingested.new_players, 3);
    assert_eq!(ingested.name_changes, 0);
    assert_eq!(ingested.realm.marked_left, 0);
    assert!(!ingested.message.is_empty());

    let response = server
        .get_auth(&format!("/uploads/{}", ingested.upload_id), &viewer)
        .await
        .unwrap();
    let upload: UploadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(upload.status, "COMPLETED");
    assert_eq!(upload.row_count, 3);
    assert_eq!(upload.filename, "export.csv");
    assert_eq!(upload.snapshot_id.as_deref(), Some(ingested.snapshot_id.as_str()));

    let response = server.get_auth("/snapshots/latest", &viewer).await.unwrap();
    let latest: SnapshotResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(latest.id, ingested.snapshot_id);
    assert_eq!(latest.kingdom, "1042");
    assert_eq!(latest.row_count, 3);

    let response = server
        .get_auth(
            &format!("/snapshots/{}/players?limit=2", ingested.snapshot_id),
            &viewer,
        )
        .await
        .unwrap();
    let page: Page<SnapshotPlayer> = assert_json(response, StatusCode::OK).await.unwrap();
    let ids: Vec<&str> = page.data.iter().map(|p| p.lord_id.as_str()).collect();
    assert_eq!(ids, vec!["101", "103"]);
    assert!(page.pagination.has_more);
}

#[tokio::test]
async fn test_latest_snapshot_before_any_upload() {
    let server = TestServer::start().await.unwrap();
    let viewer = server.token(UserRole::Viewer);

    let response = server.get_auth("/snapshots/latest", &viewer).await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "UNKNOWN_SNAPSHOT");
}

#[tokio::test]
async fn test_invalid_file_is_rejected_without_upload_record() {
    let server = TestServer::start().await.unwrap();
    let editor = server.token(UserRole::Editor);

    let response = server
        .upload(&editor, "export.csv", "Lord ID,Name\n1,Aldric\n", &[])
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "MISSING_COLUMN");

    let response = server.upload(&editor, "export.pdf", "%PDF", &[]).await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "UNSUPPORTED_FILE_TYPE");

    let response = server
        .upload(
            &editor,
            "export.csv",
            "Lord ID,Name,Power\n1,Aldric,100\n2,Brenna,lots\n",
            &[],
        )
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_ROW");
    assert_eq!(body.error.details.unwrap()["row"], 3);

    let response = server.get_auth("/uploads", &editor).await.unwrap();
    let uploads: Vec<UploadResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(uploads.is_empty());
}

#[tokio::test]
async fn test_bad_form_field_is_rejected() {
    let server = TestServer::start().await.unwrap();
    let editor = server.token(UserRole::Editor);

    let csv = export_csv(&[SheetRow::new(1, "Aldric", "", 1)]);
    let response = server
        .upload(&editor, "export.csv", csv, &[("captured_at", "last tuesday")])
        .await
        .unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_FORM_FIELD");
}

#[tokio::test]
async fn test_failed_batch_marks_upload_failed() {
    let store = Arc::new(MemoryStore::new());
    store.fail_batch_at(2);
    let server = TestServer::start_with_store(store.clone()).await.unwrap();
    let editor = server.token(UserRole::Editor);

    let csv = export_csv(&numbered_rows(1, 45));
    let response = server.upload(&editor, "export.csv", csv, &[]).await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::INTERNAL_SERVER_ERROR)
        .await
        .unwrap();
    assert_eq!(body.error.code, "UPLOAD_FAILED");
    let upload_id = body.error.details.unwrap()["upload_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .get_auth(&format!("/uploads/{upload_id}"), &editor)
        .await
        .unwrap();
    let upload: UploadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(upload.status, "FAILED");
    assert_eq!(upload.row_count, 40);
    assert!(upload.error_message.unwrap().contains("batch 3"));
    assert_eq!(store.row_count(), 40);
}

#[tokio::test]
async fn test_upload_finishes_after_request_times_out() {
    let store = Arc::new(MemoryStore::new());
    store.delay_batches(std::time::Duration::from_millis(600));
    let config = test_config_with(&[("API_REQUEST_TIMEOUT_SECS", "1"), ("INGEST_BATCH_SIZE", "20")])
        .unwrap();
    let server = TestServer::start_with_store_config(store.clone(), config)
        .await
        .unwrap();
    let editor = server.token(UserRole::Editor);

    // Three batches at 600ms each outlast the one second budget
    let csv = export_csv(&numbered_rows(1, 45));
    let response = server.upload(&editor, "export.csv", csv, &[]).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let mut upload: Option<UploadResponse> = None;
    for _ in 0..50 {
        let response = server.get_auth("/uploads", &editor).await.unwrap();
        let listed: Vec<UploadResponse> = assert_json(response, StatusCode::OK).await.unwrap();
        if let Some(latest) = listed.into_iter().next() {
            if latest.status != "PROCESSING" {
                upload = Some(latest);
                break;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    let upload = upload.expect("upload never left PROCESSING");
    assert_eq!(upload.status, "COMPLETED");
    assert_eq!(upload.row_count, 45);
    assert_eq!(store.row_count(), 45);
}

#[tokio::test]
async fn test_startup_fails_uploads_left_processing() {
    let store = Arc::new(MemoryStore::new());
    let stuck = Upload::start(
        Snowflake::new(77),
        "crashed.csv".to_string(),
        Snowflake::new(4242),
        "1042".to_string(),
        Utc::now(),
    );
    UploadRepository::create(store.as_ref(), &stuck).await.unwrap();

    let server = TestServer::start_with_store(store).await.unwrap();
    let editor = server.token(UserRole::Editor);

    let response = server.get_auth("/uploads/77", &editor).await.unwrap();
    let upload: UploadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(upload.status, "FAILED");
    assert_eq!(upload.error_message.as_deref(), Some("interrupted before completion"));
}

// ============================================================================
// Player History Tests
// ============================================================================

#[tokio::test]
async fn test_history_tracks_name_and_alliance_changes() {
    let server = TestServer::start().await.unwrap();
    let viewer = server.token(UserRole::Viewer);

    ingest(&server, &[SheetRow::new(7, "Greta", "", 1_000)], &days_ago(3)).await;
    ingest(&server, &[SheetRow::new(7, "Greta", "KOR", 1_500)], &days_ago(2)).await;
    let third = ingest(&server, &[SheetRow::new(7, "Greta Iron", "KOR", 1_750)], &days_ago(1)).await;
    assert_eq!(third.name_changes, 1);
    let fourth = ingest(&server, &[SheetRow::new(7, "Greta Iron", "KOR", 1_800)], &days_ago(0)).await;
    assert_eq!(fourth.name_changes, 0);

    let response = server.get_auth("/players/7/history", &viewer).await.unwrap();
    let history: PlayerHistory = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(history.player.current_name, "Greta Iron");
    assert_eq!(history.player.current_alliance.as_deref(), Some("KOR"));
    assert_eq!(history.stats.len(), 4);
    assert_eq!(history.name_changes.len(), 1);
    assert_eq!(history.name_changes[0].old_name, "Greta");
    assert_eq!(history.name_changes[0].new_name, "Greta Iron");
    assert_eq!(history.alliance_changes.len(), 1);
    assert_eq!(history.alliance_changes[0].kind, "join");
    assert!(history.alliance_changes[0].old_alliance.is_none());
    assert_eq!(history.alliance_changes[0].new_alliance.as_deref(), Some("KOR"));
}

#[tokio::test]
async fn test_player_lookup_errors() {
    let server = TestServer::start().await.unwrap();
    let viewer = server.token(UserRole::Viewer);

    let response = server.get_auth("/players/999", &viewer).await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(body.error.code, "UNKNOWN_PLAYER");

    let response = server.get_auth("/players/lord-one", &viewer).await.unwrap();
    let body: ErrorEnvelope = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "INVALID_PATH_PARAMETER");

    let response = server.get_auth("/players?limit=0", &viewer).await.unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

// ============================================================================
// Realm Status Tests
// ============================================================================

#[tokio::test]
async fn test_ingest_sweep_flags_only_strong_stale_players() {
    let server = TestServer::start().await.unwrap();
    let viewer = server.token(UserRole::Viewer);

    // Strong player last seen 30 days ago is flagged; weak one is not
    let first = ingest(
        &server,
        &[
            SheetRow::new(10, "Ysolde", "KOR", 50_000_000),
            SheetRow::new(11, "Xander", "KOR", 5_000_000),
        ],
        &days_ago(30),
    )
    .await;
    assert_eq!(first.realm.marked_left, 1);

    let response = server.get_auth("/players/10", &viewer).await.unwrap();
    let ysolde: PlayerResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(ysolde.has_left_realm);
    assert!(ysolde.left_realm_at.is_some());

    let response = server.get_auth("/players/11", &viewer).await.unwrap();
    let xander: PlayerResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!xander.has_left_realm);

    // Flagged player whose latest power drops below the floor is cleared
    let second = ingest(
        &server,
        &[SheetRow::new(10, "Ysolde", "KOR", 2_000_000)],
        &days_ago(0),
    )
    .await;
    assert_eq!(second.realm.cleared, 1);

    let response = server.get_auth("/players?left_realm=true", &viewer).await.unwrap();
    let flagged: Page<PlayerResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(flagged.data.is_empty());
}

#[tokio::test]
async fn test_admin_sweep_requires_admin_and_is_idempotent() {
    let server = TestServer::start().await.unwrap();
    ingest(&server, &[SheetRow::new(20, "Hale", "", 80_000_000)], &days_ago(10)).await;

    let response = server
        .post_auth("/admin/realm-status/sweep", &server.token(UserRole::Editor))
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let admin = server.token(UserRole::Admin);
    let response = server.post_auth("/admin/realm-status/sweep", &admin).await.unwrap();
    let sweep: SweepResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(sweep.evaluated, 1);
    // Already flagged by the ingest-time sweep
    assert!(sweep.marked_left.is_empty());
    assert!(sweep.cleared.is_empty());
}

#[tokio::test]
async fn test_manual_left_realm_corrections() {
    let server = TestServer::start().await.unwrap();
    let admin = server.token(UserRole::Admin);
    ingest(&server, &[SheetRow::new(30, "Iona", "", 1_000)], &days_ago(0)).await;

    let body = MarkLeftRealm { at: None };
    let response = server
        .put_auth("/admin/players/30/left-realm", &admin, &body)
        .await
        .unwrap();
    let marked: LeftRealmResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(marked.changed);
    assert!(marked.player.has_left_realm);

    let response = server
        .put_auth("/admin/players/30/left-realm", &admin, &body)
        .await
        .unwrap();
    let again: LeftRealmResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!again.changed);
    assert_eq!(again.player.left_realm_at, marked.player.left_realm_at);

    let response = server
        .delete_auth("/admin/players/30/left-realm", &admin)
        .await
        .unwrap();
    let cleared: LeftRealmResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(cleared.changed);
    assert!(!cleared.player.has_left_realm);
    assert!(cleared.player.left_realm_at.is_none());

    let response = server
        .delete_auth("/admin/players/31/left-realm", &admin)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}
