//! Realm-Status Inferencer
//!
//! Runs the left-realm rules over the whole registry. Each player is
//! evaluated and written on its own; a failure for one player is recorded in
//! the report and the sweep moves on.

use chrono::{DateTime, Utc};
use kingdom_core::{LordId, Player, RealmDecision};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// A player the sweep could not update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    pub lord_id: LordId,
    pub error: String,
}

/// Result of one sweep over the registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub evaluated: usize,
    /// Rule A transitions
    pub marked_left: Vec<LordId>,
    /// Rule B transitions
    pub cleared: Vec<LordId>,
    pub failed: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn changed(&self) -> usize {
        self.marked_left.len() + self.cleared.len()
    }
}

/// Explicit administrative transition on one player
#[derive(Debug, Clone)]
pub struct LeftRealmUpdate {
    pub player: Player,
    /// False when the player was already in the requested state
    pub changed: bool,
}

/// Realm-status service
pub struct RealmStatusService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RealmStatusService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply rules A and B to every registry record
    ///
    /// Evaluation time is the context clock's `now`. Running twice with no
    /// new data in between changes nothing the second time.
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> ServiceResult<SweepReport> {
        let now = self.ctx.clock().now();
        let policy = self.ctx.realm_policy();
        let players = self.ctx.player_repo();

        let candidates = players.realm_candidates().await?;
        let mut report = SweepReport {
            evaluated: candidates.len(),
            ..SweepReport::default()
        };

        for candidate in &candidates {
            let lord_id = candidate.lord_id;
            let (result, transitioned) = match policy.evaluate(candidate, now) {
                RealmDecision::MarkLeft { at } => (
                    players.mark_left_realm(lord_id, at, now).await,
                    &mut report.marked_left,
                ),
                RealmDecision::Clear => (
                    players.clear_left_realm(lord_id, now).await,
                    &mut report.cleared,
                ),
                RealmDecision::Unchanged => continue,
            };

            match result {
                Ok(true) => transitioned.push(lord_id),
                Ok(false) => {}
                Err(e) => {
                    warn!(lord_id = %lord_id, error = %e, "Realm-status update failed");
                    report.failed.push(SweepFailure {
                        lord_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            evaluated = report.evaluated,
            marked_left = report.marked_left.len(),
            cleared = report.cleared.len(),
            failed = report.failed.len(),
            "Realm-status sweep finished"
        );
        Ok(report)
    }

    /// Administrative correction: flag a player as having left
    ///
    /// `at` defaults to now. Marking an already flagged player keeps its
    /// original timestamp.
    #[instrument(skip(self))]
    pub async fn mark_left(
        &self,
        lord_id: LordId,
        at: Option<DateTime<Utc>>,
    ) -> ServiceResult<LeftRealmUpdate> {
        let now = self.ctx.clock().now();
        let at = at.unwrap_or(now);
        let changed = self
            .ctx
            .player_repo()
            .mark_left_realm(lord_id, at, now)
            .await?;
        let player = self.reload(lord_id).await?;

        info!(lord_id = %lord_id, changed, "Player marked as left realm");
        Ok(LeftRealmUpdate { player, changed })
    }

    /// Administrative correction: clear the left-realm flag
    #[instrument(skip(self))]
    pub async fn clear_left(&self, lord_id: LordId) -> ServiceResult<LeftRealmUpdate> {
        let now = self.ctx.clock().now();
        let changed = self.ctx.player_repo().clear_left_realm(lord_id, now).await?;
        let player = self.reload(lord_id).await?;

        info!(lord_id = %lord_id, changed, "Player left-realm flag cleared");
        Ok(LeftRealmUpdate { player, changed })
    }

    async fn reload(&self, lord_id: LordId) -> ServiceResult<Player> {
        self.ctx
            .player_repo()
            .find_by_lord_id(lord_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Player", lord_id.to_string()))
    }
}
