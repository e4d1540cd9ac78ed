//! PostgreSQL implementation of SeasonRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use kingdom_core::entities::Season;
use kingdom_core::traits::{RepoResult, SeasonRepository};
use kingdom_core::value_objects::Snowflake;

use crate::models::SeasonModel;

use super::error::map_db_error;

/// PostgreSQL implementation of SeasonRepository
#[derive(Clone)]
pub struct PgSeasonRepository {
    pool: PgPool,
}

impl PgSeasonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeasonRepository for PgSeasonRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Season>> {
        let result = sqlx::query_as::<_, SeasonModel>(
            "SELECT id, name, kingdom, started_at, ended_at FROM seasons WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Season::from))
    }

    #[instrument(skip(self))]
    async fn list(&self, kingdom: Option<&str>) -> RepoResult<Vec<Season>> {
        let results = sqlx::query_as::<_, SeasonModel>(
            r#"
            SELECT id, name, kingdom, started_at, ended_at
            FROM seasons
            WHERE ($1::TEXT IS NULL OR kingdom = $1)
            ORDER BY started_at DESC
            "#,
        )
        .bind(kingdom)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Season::from).collect())
    }

    #[instrument(skip(self, season), fields(season_id = %season.id))]
    async fn create(&self, season: &Season) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO seasons (id, name, kingdom, started_at, ended_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(season.id.into_inner())
        .bind(&season.name)
        .bind(&season.kingdom)
        .bind(season.started_at)
        .bind(season.ended_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
