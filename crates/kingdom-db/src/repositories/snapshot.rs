//! PostgreSQL implementation of SnapshotRepository
//!
//! Rows are written one batch per transaction. Each batch transaction is
//! bounded twice: waiting for `BEGIN` by `TxBounds::max_wait`, and the whole
//! batch (statements plus `COMMIT`) by `TxBounds::timeout`, which is also
//! pushed down as the transaction-local `statement_timeout`.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tokio::time::timeout;
use tracing::{debug, instrument};

use kingdom_core::entities::{Player, PlayerSnapshot, Snapshot};
use kingdom_core::error::DomainError;
use kingdom_core::traits::{
    RepoResult, RowWrite, SnapshotBatch, SnapshotFilter, SnapshotRepository, SnapshotRowFilter,
};
use kingdom_core::value_objects::{LordId, Snowflake};

use crate::mappers::{alliance_column, PlayerSnapshotInsert};
use crate::models::{PlayerSnapshotModel, SnapshotModel, SnapshotRowModel};
use crate::pool::TxBounds;

use super::error::{map_batch_error, map_db_error};

const SNAPSHOT_COLUMNS: &str = "id, captured_at, filename, kingdom, season_id, created_at";

/// PostgreSQL implementation of SnapshotRepository
#[derive(Clone)]
pub struct PgSnapshotRepository {
    pool: PgPool,
    bounds: TxBounds,
}

impl PgSnapshotRepository {
    /// Create a new PgSnapshotRepository with default transaction bounds
    pub fn new(pool: PgPool) -> Self {
        Self::with_bounds(pool, TxBounds::default())
    }

    pub fn with_bounds(pool: PgPool, bounds: TxBounds) -> Self {
        Self { pool, bounds }
    }
}

/// Upsert the registry record; returns the id of the stored player
///
/// A concurrent upload may have created the player first, in which case the
/// existing id wins and the current fields are overwritten (last write wins).
async fn upsert_player(conn: &mut PgConnection, player: &Player) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO players (id, lord_id, current_name, current_alliance, has_left_realm,
                             last_seen_at, left_realm_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, FALSE, $5, NULL, $6, $7)
        ON CONFLICT (lord_id) DO UPDATE
        SET current_name = EXCLUDED.current_name,
            current_alliance = EXCLUDED.current_alliance,
            last_seen_at = GREATEST(players.last_seen_at, EXCLUDED.last_seen_at),
            updated_at = EXCLUDED.updated_at
        RETURNING id
        "#,
    )
    .bind(player.id.into_inner())
    .bind(player.lord_id.into_inner())
    .bind(&player.current_name)
    .bind(alliance_column(player.current_alliance.as_ref()))
    .bind(player.last_seen_at)
    .bind(player.created_at)
    .bind(player.updated_at)
    .fetch_one(&mut *conn)
    .await
}

async fn write_row(conn: &mut PgConnection, write: &RowWrite) -> Result<(), sqlx::Error> {
    let player_id = upsert_player(conn, &write.player).await?;

    if let Some(change) = &write.name_change {
        sqlx::query(
            r#"
            INSERT INTO name_changes (id, player_id, lord_id, old_name, new_name, detected_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(change.id.into_inner())
        .bind(player_id)
        .bind(change.lord_id.into_inner())
        .bind(&change.old_name)
        .bind(&change.new_name)
        .bind(change.detected_at)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(change) = &write.alliance_change {
        sqlx::query(
            r#"
            INSERT INTO alliance_changes (id, player_id, lord_id, old_alliance, new_alliance, detected_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(change.id.into_inner())
        .bind(player_id)
        .bind(change.lord_id.into_inner())
        .bind(alliance_column(change.old_alliance.as_ref()))
        .bind(alliance_column(change.new_alliance.as_ref()))
        .bind(change.detected_at)
        .execute(&mut *conn)
        .await?;
    }

    let row = PlayerSnapshotInsert::new(&write.row);
    sqlx::query(
        r#"
        INSERT INTO player_snapshots (id, snapshot_id, player_id, lord_id, name, alliance,
                                      power, city_level, division, stats, captured_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(row.id)
    .bind(row.snapshot_id)
    .bind(player_id)
    .bind(row.lord_id)
    .bind(row.name)
    .bind(row.alliance)
    .bind(row.power)
    .bind(row.city_level)
    .bind(row.division)
    .bind(row.stats)
    .bind(row.captured_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl SnapshotRepository for PgSnapshotRepository {
    #[instrument(skip(self, snapshot), fields(snapshot_id = %snapshot.id))]
    async fn create(&self, snapshot: &Snapshot) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (id, captured_at, filename, kingdom, season_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(snapshot.id.into_inner())
        .bind(snapshot.captured_at)
        .bind(&snapshot.filename)
        .bind(&snapshot.kingdom)
        .bind(snapshot.season_id.map(Snowflake::into_inner))
        .bind(snapshot.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Snapshot>> {
        let result = sqlx::query_as::<_, SnapshotModel>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM snapshots WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Snapshot::from))
    }

    #[instrument(skip(self))]
    async fn find_latest(&self, filter: &SnapshotFilter) -> RepoResult<Option<Snapshot>> {
        Ok(self.list_recent(filter, 1).await?.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, filter: &SnapshotFilter, limit: i64) -> RepoResult<Vec<Snapshot>> {
        let results = sqlx::query_as::<_, SnapshotModel>(&format!(
            r#"
            SELECT {SNAPSHOT_COLUMNS}
            FROM snapshots
            WHERE ($1::BIGINT IS NULL OR season_id = $1)
              AND ($2::TEXT IS NULL OR kingdom = $2)
            ORDER BY captured_at DESC, id DESC
            LIMIT $3
            "#
        ))
        .bind(filter.season_id.map(Snowflake::into_inner))
        .bind(filter.kingdom.as_deref())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Snapshot::from).collect())
    }

    #[instrument(skip(self, batch), fields(snapshot_id = %batch.snapshot_id, batch = batch.index, rows = batch.rows.len()))]
    async fn commit_batch(&self, batch: &SnapshotBatch) -> RepoResult<()> {
        let index = batch.index;
        let bounds = self.bounds;

        let mut tx = timeout(bounds.max_wait, self.pool.begin())
            .await
            .map_err(|_| DomainError::Timeout(format!("batch {index} waited too long to begin")))?
            .map_err(map_db_error)?;

        let work = async move {
            sqlx::query("SELECT set_config('statement_timeout', $1, true)")
                .bind(format!("{}ms", bounds.timeout.as_millis()))
                .execute(&mut *tx)
                .await?;

            for write in &batch.rows {
                write_row(&mut *tx, write).await?;
            }

            tx.commit().await
        };

        // Dropping the transaction on timeout rolls it back
        timeout(bounds.timeout, work)
            .await
            .map_err(|_| DomainError::Timeout(format!("batch {index} exceeded its time limit")))?
            .map_err(|e| map_batch_error(e, index))?;

        debug!("Batch committed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn count_rows(&self, snapshot_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM player_snapshots WHERE snapshot_id = $1")
            .bind(snapshot_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_rows(
        &self,
        snapshot_id: Snowflake,
        filter: &SnapshotRowFilter,
    ) -> RepoResult<Vec<(PlayerSnapshot, Player)>> {
        let results = sqlx::query_as::<_, SnapshotRowModel>(
            r#"
            SELECT ps.id, ps.snapshot_id, ps.player_id, ps.lord_id, ps.name, ps.alliance,
                   ps.stats, ps.captured_at,
                   p.current_name, p.current_alliance, p.has_left_realm, p.last_seen_at,
                   p.left_realm_at, p.created_at AS player_created_at,
                   p.updated_at AS player_updated_at
            FROM player_snapshots ps
            JOIN players p ON p.id = ps.player_id
            WHERE ps.snapshot_id = $1
              AND ($2::BOOLEAN IS NULL OR p.has_left_realm = $2)
              AND ($3::TEXT IS NULL OR ps.alliance = $3)
            ORDER BY ps.power DESC, ps.id
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(snapshot_id.into_inner())
        .bind(filter.left_realm)
        .bind(alliance_column(filter.alliance.as_ref()))
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_rows_by_player(&self, lord_id: LordId, limit: i64) -> RepoResult<Vec<PlayerSnapshot>> {
        let results = sqlx::query_as::<_, PlayerSnapshotModel>(
            r#"
            SELECT id, snapshot_id, player_id, lord_id, name, alliance, stats, captured_at
            FROM (
                SELECT id, snapshot_id, player_id, lord_id, name, alliance, stats, captured_at
                FROM player_snapshots
                WHERE lord_id = $1
                ORDER BY captured_at DESC, id DESC
                LIMIT $2
            ) recent
            ORDER BY captured_at, id
            "#,
        )
        .bind(lord_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PlayerSnapshot::from).collect())
    }
}
