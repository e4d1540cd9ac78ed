//! Player Registry
//!
//! Keeps one current-state record per lord id for the duration of an
//! ingestion. Registry records are loaded once, then every observation is
//! applied to the in-memory copy in file order, so a lord id appearing twice
//! in one file sees the effects of its earlier row.
//!
//! For each observation the Change Detector runs against the registry's
//! known name and alliance before they are overwritten.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kingdom_core::traits::RowWrite;
use kingdom_core::{
    detect_changes, AllianceChange, LordId, NameChange, Player, PlayerSnapshot, Snapshot,
};
use tracing::{debug, instrument};

use crate::import::ParsedRow;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Counts of what a set of observations produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservationTally {
    pub new_players: usize,
    pub name_changes: usize,
    pub alliance_changes: usize,
}

impl ObservationTally {
    pub fn record(&mut self, write: &RowWrite) {
        self.new_players += usize::from(write.is_new_player);
        self.name_changes += usize::from(write.name_change.is_some());
        self.alliance_changes += usize::from(write.alliance_change.is_some());
    }
}

/// Working view of the registry for one ingestion
pub struct PlayerRegistry<'a> {
    ctx: &'a ServiceContext,
    known: HashMap<LordId, Player>,
}

impl<'a> PlayerRegistry<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self {
            ctx,
            known: HashMap::new(),
        }
    }

    /// Fetch registry records for any of `lord_ids` not already loaded
    #[instrument(skip(self, lord_ids), fields(requested = lord_ids.len()))]
    pub async fn load(&mut self, lord_ids: &[LordId]) -> ServiceResult<()> {
        let missing: Vec<LordId> = lord_ids
            .iter()
            .copied()
            .filter(|id| !self.known.contains_key(id))
            .collect();

        let players = self.ctx.player_repo().find_by_lord_ids(&missing).await?;
        debug!(found = players.len(), "Registry records loaded");

        self.known
            .extend(players.into_iter().map(|player| (player.lord_id, player)));
        Ok(())
    }

    pub fn get(&self, lord_id: LordId) -> Option<&Player> {
        self.known.get(&lord_id)
    }

    /// Create the record on first appearance, otherwise only advance its
    /// last-seen time; returns the record and whether it was created
    fn upsert(
        &mut self,
        row: &ParsedRow,
        seen_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> (&mut Player, bool) {
        let ctx = self.ctx;
        let mut created = false;
        let player = self.known.entry(row.lord_id).or_insert_with(|| {
            created = true;
            Player::first_seen(
                ctx.generate_id(),
                row.lord_id,
                row.name.clone(),
                row.alliance.clone(),
                seen_at,
                now,
            )
        });
        if !created {
            player.touch_seen(seen_at, now);
        }
        (player, created)
    }

    /// Apply one observation from `snapshot`
    ///
    /// The returned write carries the registry record after the observation,
    /// any history events it produced, and the snapshot row itself.
    pub fn observe(&mut self, snapshot: &Snapshot, row: ParsedRow) -> RowWrite {
        let ctx = self.ctx;
        let detected_at = snapshot.captured_at;
        let now = ctx.clock().now();
        let (player, is_new_player) = self.upsert(&row, detected_at, now);

        let changes = detect_changes(
            &player.current_name,
            player.current_alliance.as_ref(),
            &row.name,
            row.alliance.as_ref(),
        );

        let name_change = changes.name.map(|(old_name, new_name)| NameChange {
            id: ctx.generate_id(),
            player_id: player.id,
            lord_id: player.lord_id,
            old_name,
            new_name,
            detected_at,
        });
        let alliance_change = changes.alliance.map(|(old_alliance, new_alliance)| AllianceChange {
            id: ctx.generate_id(),
            player_id: player.id,
            lord_id: player.lord_id,
            old_alliance,
            new_alliance,
            detected_at,
        });

        if name_change.is_some() || alliance_change.is_some() {
            player.current_name.clone_from(&row.name);
            player.current_alliance.clone_from(&row.alliance);
            player.updated_at = now;
        }

        let snapshot_row = PlayerSnapshot {
            id: ctx.generate_id(),
            snapshot_id: snapshot.id,
            player_id: player.id,
            lord_id: row.lord_id,
            name: row.name,
            alliance: row.alliance,
            stats: row.stats,
            captured_at: snapshot.captured_at,
        };

        RowWrite {
            player: player.clone(),
            is_new_player,
            row: snapshot_row,
            name_change,
            alliance_change,
        }
    }
}
