//! PostgreSQL implementation of PlayerRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use kingdom_core::entities::{Player, RealmCandidate};
use kingdom_core::error::DomainError;
use kingdom_core::traits::{PlayerFilter, PlayerRepository, RepoResult};
use kingdom_core::value_objects::LordId;

use crate::mappers::alliance_column;
use crate::models::{PlayerModel, RealmCandidateModel};

use super::error::map_db_error;

const PLAYER_COLUMNS: &str = "id, lord_id, current_name, current_alliance, has_left_realm, \
                              last_seen_at, left_realm_at, created_at, updated_at";

/// PostgreSQL implementation of PlayerRepository
#[derive(Clone)]
pub struct PgPlayerRepository {
    pool: PgPool,
}

impl PgPlayerRepository {
    /// Create a new PgPlayerRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, lord_id: LordId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM players WHERE lord_id = $1)")
            .bind(lord_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl PlayerRepository for PgPlayerRepository {
    #[instrument(skip(self))]
    async fn find_by_lord_id(&self, lord_id: LordId) -> RepoResult<Option<Player>> {
        let result = sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE lord_id = $1"
        ))
        .bind(lord_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Player::from))
    }

    #[instrument(skip(self, lord_ids), fields(count = lord_ids.len()))]
    async fn find_by_lord_ids(&self, lord_ids: &[LordId]) -> RepoResult<Vec<Player>> {
        if lord_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = lord_ids.iter().map(|id| id.into_inner()).collect();
        let results = sqlx::query_as::<_, PlayerModel>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE lord_id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Player::from).collect())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &PlayerFilter) -> RepoResult<Vec<Player>> {
        let results = sqlx::query_as::<_, PlayerModel>(&format!(
            r#"
            SELECT {PLAYER_COLUMNS}
            FROM players
            WHERE ($1::BOOLEAN IS NULL OR has_left_realm = $1)
              AND ($2::TEXT IS NULL OR current_alliance = $2)
            ORDER BY lord_id
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.left_realm)
        .bind(alliance_column(filter.alliance.as_ref()))
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Player::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_left_realm(&self, lord_id: LordId, at: DateTime<Utc>, now: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE players
            SET has_left_realm = TRUE, left_realm_at = $2, updated_at = $3
            WHERE lord_id = $1 AND has_left_realm = FALSE
            "#,
        )
        .bind(lord_id.into_inner())
        .bind(at)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if self.exists(lord_id).await? {
            Ok(false)
        } else {
            Err(DomainError::PlayerNotFound(lord_id))
        }
    }

    #[instrument(skip(self))]
    async fn clear_left_realm(&self, lord_id: LordId, now: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE players
            SET has_left_realm = FALSE, left_realm_at = NULL, updated_at = $2
            WHERE lord_id = $1 AND has_left_realm = TRUE
            "#,
        )
        .bind(lord_id.into_inner())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if self.exists(lord_id).await? {
            Ok(false)
        } else {
            Err(DomainError::PlayerNotFound(lord_id))
        }
    }

    #[instrument(skip(self))]
    async fn realm_candidates(&self) -> RepoResult<Vec<RealmCandidate>> {
        let results = sqlx::query_as::<_, RealmCandidateModel>(
            r#"
            SELECT p.lord_id, p.has_left_realm, p.last_seen_at, p.left_realm_at,
                   latest.power AS latest_power
            FROM players p
            LEFT JOIN LATERAL (
                SELECT ps.power
                FROM player_snapshots ps
                WHERE ps.player_id = p.id
                ORDER BY ps.captured_at DESC, ps.id DESC
                LIMIT 1
            ) latest ON TRUE
            ORDER BY p.lord_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(RealmCandidate::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgPlayerRepository>();
    }
}
