//! In-memory store
//!
//! Implements every repository trait over `parking_lot`-guarded collections.
//! A batch commit validates first and mutates second while holding the write
//! lock, so a failing batch leaves no trace, the same as a rolled back
//! transaction.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, instrument};

use kingdom_core::entities::{
    AllianceChange, NameChange, Player, PlayerSnapshot, RealmCandidate, Season, Snapshot, Upload,
};
use kingdom_core::error::DomainError;
use kingdom_core::traits::{
    HistoryRepository, PlayerFilter, PlayerRepository, RepoResult, SeasonRepository,
    SnapshotBatch, SnapshotFilter, SnapshotRepository, SnapshotRowFilter, UploadRepository,
};
use kingdom_core::value_objects::{LordId, Snowflake};

#[derive(Debug, Default)]
struct State {
    players: BTreeMap<LordId, Player>,
    snapshots: HashMap<Snowflake, Snapshot>,
    rows: Vec<PlayerSnapshot>,
    name_changes: Vec<NameChange>,
    alliance_changes: Vec<AllianceChange>,
    uploads: HashMap<Snowflake, Upload>,
    seasons: HashMap<Snowflake, Season>,
    fail_batch_at: Option<usize>,
    batch_delay: Option<Duration>,
}

/// Repository implementation backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every batch commit with this index fail
    pub fn fail_batch_at(&self, index: usize) {
        self.state.write().fail_batch_at = Some(index);
    }

    /// Hold every batch commit for `delay` before it takes the lock
    pub fn delay_batches(&self, delay: Duration) {
        self.state.write().batch_delay = Some(delay);
    }

    pub fn clear_faults(&self) {
        let mut state = self.state.write();
        state.fail_batch_at = None;
        state.batch_delay = None;
    }

    /// Total stored snapshot rows, across all snapshots
    pub fn row_count(&self) -> usize {
        self.state.read().rows.len()
    }

    pub fn player_count(&self) -> usize {
        self.state.read().players.len()
    }

    /// Overwrite a registry record directly (test setup and repairs)
    pub fn put_player(&self, player: Player) {
        self.state.write().players.insert(player.lord_id, player);
    }

    /// Insert a snapshot row directly, bypassing batch bookkeeping
    pub fn put_row(&self, row: PlayerSnapshot) {
        self.state.write().rows.push(row);
    }
}

fn latest_power(rows: &[PlayerSnapshot], player_id: Snowflake) -> Option<i64> {
    rows.iter()
        .filter(|row| row.player_id == player_id)
        .max_by_key(|row| (row.captured_at, row.id))
        .map(|row| row.stats.power)
}

fn page<T>(items: impl Iterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .skip(usize::try_from(offset).unwrap_or(0))
        .take(usize::try_from(limit).unwrap_or(0))
        .collect()
}

#[async_trait]
impl SnapshotRepository for MemoryStore {
    async fn create(&self, snapshot: &Snapshot) -> RepoResult<()> {
        let mut state = self.state.write();
        if let Some(season_id) = snapshot.season_id {
            if !state.seasons.contains_key(&season_id) {
                return Err(DomainError::DatabaseError(format!(
                    "snapshot references unknown season {season_id}"
                )));
            }
        }
        state.snapshots.insert(snapshot.id, snapshot.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Snapshot>> {
        Ok(self.state.read().snapshots.get(&id).cloned())
    }

    async fn find_latest(&self, filter: &SnapshotFilter) -> RepoResult<Option<Snapshot>> {
        Ok(SnapshotRepository::list_recent(self, filter, 1)
            .await?
            .into_iter()
            .next())
    }

    async fn list_recent(&self, filter: &SnapshotFilter, limit: i64) -> RepoResult<Vec<Snapshot>> {
        let state = self.state.read();
        let mut matching: Vec<&Snapshot> = state
            .snapshots
            .values()
            .filter(|s| filter.season_id.is_none() || s.season_id == filter.season_id)
            .filter(|s| {
                filter
                    .kingdom
                    .as_deref()
                    .is_none_or(|kingdom| s.kingdom == kingdom)
            })
            .collect();
        matching.sort_by(|a, b| (b.captured_at, b.id).cmp(&(a.captured_at, a.id)));

        Ok(page(matching.into_iter().cloned(), limit, 0))
    }

    #[instrument(skip(self, batch), fields(batch = batch.index, rows = batch.rows.len()))]
    async fn commit_batch(&self, batch: &SnapshotBatch) -> RepoResult<()> {
        let delay = self.state.read().batch_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.write();

        if state.fail_batch_at == Some(batch.index) {
            return Err(DomainError::DatabaseError(format!(
                "injected failure in batch {}",
                batch.index
            )));
        }
        if !state.snapshots.contains_key(&batch.snapshot_id) {
            return Err(DomainError::DatabaseError(format!(
                "rows reference unknown snapshot {}",
                batch.snapshot_id
            )));
        }

        for write in &batch.rows {
            let player_id = match state.players.get_mut(&write.player.lord_id) {
                Some(stored) => {
                    stored.current_name.clone_from(&write.player.current_name);
                    stored.current_alliance.clone_from(&write.player.current_alliance);
                    if let Some(seen) = write.player.last_seen_at {
                        stored.touch_seen(seen, write.player.updated_at);
                    }
                    stored.updated_at = write.player.updated_at;
                    stored.id
                }
                None => {
                    let mut player = write.player.clone();
                    player.has_left_realm = false;
                    player.left_realm_at = None;
                    let id = player.id;
                    state.players.insert(player.lord_id, player);
                    id
                }
            };

            if let Some(change) = &write.name_change {
                let mut change = change.clone();
                change.player_id = player_id;
                state.name_changes.push(change);
            }
            if let Some(change) = &write.alliance_change {
                let mut change = change.clone();
                change.player_id = player_id;
                state.alliance_changes.push(change);
            }

            let mut row = write.row.clone();
            row.player_id = player_id;
            state.rows.push(row);
        }

        debug!("Batch committed");
        Ok(())
    }

    async fn count_rows(&self, snapshot_id: Snowflake) -> RepoResult<i64> {
        let state = self.state.read();
        Ok(state.rows.iter().filter(|r| r.snapshot_id == snapshot_id).count() as i64)
    }

    async fn find_rows(
        &self,
        snapshot_id: Snowflake,
        filter: &SnapshotRowFilter,
    ) -> RepoResult<Vec<(PlayerSnapshot, Player)>> {
        let state = self.state.read();
        let mut matching: Vec<(PlayerSnapshot, Player)> = state
            .rows
            .iter()
            .filter(|row| row.snapshot_id == snapshot_id)
            .filter(|row| filter.alliance.is_none() || row.alliance == filter.alliance)
            .filter_map(|row| {
                let player = state.players.get(&row.lord_id)?;
                let wanted = filter
                    .left_realm
                    .is_none_or(|left| player.has_left_realm == left);
                wanted.then(|| (row.clone(), player.clone()))
            })
            .collect();
        matching.sort_by(|(a, _), (b, _)| {
            b.stats
                .power
                .cmp(&a.stats.power)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(page(matching.into_iter(), filter.limit, filter.offset))
    }

    async fn find_rows_by_player(&self, lord_id: LordId, limit: i64) -> RepoResult<Vec<PlayerSnapshot>> {
        let state = self.state.read();
        let mut rows: Vec<PlayerSnapshot> = state
            .rows
            .iter()
            .filter(|row| row.lord_id == lord_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| (row.captured_at, row.id));

        let keep = usize::try_from(limit).unwrap_or(0);
        let skip = rows.len().saturating_sub(keep);
        Ok(rows.split_off(skip))
    }
}

#[async_trait]
impl PlayerRepository for MemoryStore {
    async fn find_by_lord_id(&self, lord_id: LordId) -> RepoResult<Option<Player>> {
        Ok(self.state.read().players.get(&lord_id).cloned())
    }

    async fn find_by_lord_ids(&self, lord_ids: &[LordId]) -> RepoResult<Vec<Player>> {
        let state = self.state.read();
        Ok(lord_ids
            .iter()
            .filter_map(|id| state.players.get(id))
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &PlayerFilter) -> RepoResult<Vec<Player>> {
        let state = self.state.read();
        let matching = state
            .players
            .values()
            .filter(|p| filter.left_realm.is_none_or(|left| p.has_left_realm == left))
            .filter(|p| filter.alliance.is_none() || p.current_alliance == filter.alliance)
            .cloned();

        Ok(page(matching, filter.limit, filter.offset))
    }

    async fn mark_left_realm(&self, lord_id: LordId, at: DateTime<Utc>, now: DateTime<Utc>) -> RepoResult<bool> {
        let mut state = self.state.write();
        let player = state
            .players
            .get_mut(&lord_id)
            .ok_or(DomainError::PlayerNotFound(lord_id))?;
        Ok(player.mark_left_realm(at, now))
    }

    async fn clear_left_realm(&self, lord_id: LordId, now: DateTime<Utc>) -> RepoResult<bool> {
        let mut state = self.state.write();
        let player = state
            .players
            .get_mut(&lord_id)
            .ok_or(DomainError::PlayerNotFound(lord_id))?;
        Ok(player.clear_left_realm(now))
    }

    async fn realm_candidates(&self) -> RepoResult<Vec<RealmCandidate>> {
        let state = self.state.read();
        Ok(state
            .players
            .values()
            .map(|player| RealmCandidate {
                latest_power: latest_power(&state.rows, player.id),
                ..RealmCandidate::from(player)
            })
            .collect())
    }
}

#[async_trait]
impl HistoryRepository for MemoryStore {
    async fn name_changes(&self, lord_id: LordId) -> RepoResult<Vec<NameChange>> {
        let state = self.state.read();
        let mut changes: Vec<NameChange> = state
            .name_changes
            .iter()
            .filter(|c| c.lord_id == lord_id)
            .cloned()
            .collect();
        changes.sort_by_key(|c| (c.detected_at, c.id));
        Ok(changes)
    }

    async fn alliance_changes(&self, lord_id: LordId) -> RepoResult<Vec<AllianceChange>> {
        let state = self.state.read();
        let mut changes: Vec<AllianceChange> = state
            .alliance_changes
            .iter()
            .filter(|c| c.lord_id == lord_id)
            .cloned()
            .collect();
        changes.sort_by_key(|c| (c.detected_at, c.id));
        Ok(changes)
    }
}

#[async_trait]
impl UploadRepository for MemoryStore {
    async fn create(&self, upload: &Upload) -> RepoResult<()> {
        self.state.write().uploads.insert(upload.id, upload.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Upload>> {
        Ok(self.state.read().uploads.get(&id).cloned())
    }

    async fn list_recent(&self, limit: i64) -> RepoResult<Vec<Upload>> {
        let state = self.state.read();
        let mut uploads: Vec<&Upload> = state.uploads.values().collect();
        uploads.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(page(uploads.into_iter().cloned(), limit, 0))
    }

    async fn list_processing(&self) -> RepoResult<Vec<Upload>> {
        let state = self.state.read();
        let mut uploads: Vec<Upload> = state
            .uploads
            .values()
            .filter(|u| !u.status.is_terminal())
            .cloned()
            .collect();
        uploads.sort_by_key(|u| (u.created_at, u.id));
        Ok(uploads)
    }

    async fn finish(&self, upload: &Upload) -> RepoResult<()> {
        let mut state = self.state.write();
        let stored = state
            .uploads
            .get_mut(&upload.id)
            .ok_or(DomainError::UploadNotFound(upload.id))?;
        if stored.status.is_terminal() {
            return Err(DomainError::InvalidUploadTransition {
                from: stored.status,
                to: upload.status,
            });
        }
        *stored = upload.clone();
        Ok(())
    }
}

#[async_trait]
impl SeasonRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Season>> {
        Ok(self.state.read().seasons.get(&id).cloned())
    }

    async fn list(&self, kingdom: Option<&str>) -> RepoResult<Vec<Season>> {
        let state = self.state.read();
        let mut seasons: Vec<Season> = state
            .seasons
            .values()
            .filter(|s| kingdom.is_none_or(|k| s.kingdom == k))
            .cloned()
            .collect();
        seasons.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(seasons)
    }

    async fn create(&self, season: &Season) -> RepoResult<()> {
        self.state.write().seasons.insert(season.id, season.clone());
        Ok(())
    }
}
