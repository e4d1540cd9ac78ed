//! PostgreSQL implementation of HistoryRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use kingdom_core::entities::{AllianceChange, NameChange};
use kingdom_core::traits::{HistoryRepository, RepoResult};
use kingdom_core::value_objects::LordId;

use crate::models::{AllianceChangeModel, NameChangeModel};

use super::error::map_db_error;

/// PostgreSQL implementation of HistoryRepository
///
/// Writes happen inside snapshot batches; this side is read-only.
#[derive(Clone)]
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    #[instrument(skip(self))]
    async fn name_changes(&self, lord_id: LordId) -> RepoResult<Vec<NameChange>> {
        let results = sqlx::query_as::<_, NameChangeModel>(
            r#"
            SELECT id, player_id, lord_id, old_name, new_name, detected_at
            FROM name_changes
            WHERE lord_id = $1
            ORDER BY detected_at, id
            "#,
        )
        .bind(lord_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(NameChange::from).collect())
    }

    #[instrument(skip(self))]
    async fn alliance_changes(&self, lord_id: LordId) -> RepoResult<Vec<AllianceChange>> {
        let results = sqlx::query_as::<_, AllianceChangeModel>(
            r#"
            SELECT id, player_id, lord_id, old_alliance, new_alliance, detected_at
            FROM alliance_changes
            WHERE lord_id = $1
            ORDER BY detected_at, id
            "#,
        )
        .bind(lord_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(AllianceChange::from).collect())
    }
}
