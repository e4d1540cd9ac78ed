//! Left-realm inference
//!
//! Two rules share one power floor:
//! - Rule A marks an unflagged player whose last appearance is older than the
//!   staleness cutoff and whose latest power is at or above the floor.
//! - Rule B clears a flagged player whose latest power is below the floor.
//!
//! Stale low-power accounts are treated as inactive farms or merged accounts,
//! not as departures. A player hovering exactly around the floor can flip
//! between runs; there is intentionally no buffer zone.

use chrono::{DateTime, Duration, Utc};

use crate::entities::RealmCandidate;

/// Power at or above which a stale player counts as having left
pub const DEFAULT_POWER_FLOOR: i64 = 10_000_000;

/// Days without an appearance before a player is considered stale
pub const DEFAULT_STALE_DAYS: i64 = 7;

/// Largest accepted staleness window, about a century
pub const MAX_STALE_DAYS: i64 = 36_500;

/// Outcome of evaluating one player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealmDecision {
    /// Rule A fired: flag the player, stamping the evaluation time
    MarkLeft { at: DateTime<Utc> },
    /// Rule B fired: the flag was wrong, reset it
    Clear,
    Unchanged,
}

/// Thresholds for the left-realm heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealmPolicy {
    pub power_floor: i64,
    pub stale_after: Duration,
}

impl Default for RealmPolicy {
    fn default() -> Self {
        Self {
            power_floor: DEFAULT_POWER_FLOOR,
            stale_after: Duration::days(DEFAULT_STALE_DAYS),
        }
    }
}

impl RealmPolicy {
    /// `None` unless `stale_days` is within `1..=MAX_STALE_DAYS`
    pub fn new(power_floor: i64, stale_days: i64) -> Option<Self> {
        if !(1..=MAX_STALE_DAYS).contains(&stale_days) {
            return None;
        }
        Duration::try_days(stale_days).map(|stale_after| Self {
            power_floor,
            stale_after,
        })
    }

    /// Instant before which a last appearance counts as stale
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.stale_after
    }

    /// Apply rules A and B to one player
    ///
    /// A player with no recorded power is left alone by both rules, as is an
    /// unflagged player that has never been seen.
    pub fn evaluate(&self, candidate: &RealmCandidate, now: DateTime<Utc>) -> RealmDecision {
        let Some(power) = candidate.latest_power else {
            return RealmDecision::Unchanged;
        };

        if candidate.has_left_realm {
            if power < self.power_floor {
                return RealmDecision::Clear;
            }
            return RealmDecision::Unchanged;
        }

        let stale = candidate
            .last_seen_at
            .is_some_and(|seen| seen < self.cutoff(now));

        if stale && power >= self.power_floor {
            RealmDecision::MarkLeft { at: now }
        } else {
            RealmDecision::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::LordId;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn candidate(power: Option<i64>, seen: Option<DateTime<Utc>>, left: bool) -> RealmCandidate {
        RealmCandidate {
            lord_id: LordId::new(1),
            has_left_realm: left,
            last_seen_at: seen,
            left_realm_at: left.then(t0),
            latest_power: power,
        }
    }

    #[test]
    fn test_stale_days_outside_range_are_rejected() {
        assert!(RealmPolicy::new(DEFAULT_POWER_FLOOR, 0).is_none());
        assert!(RealmPolicy::new(DEFAULT_POWER_FLOOR, -3).is_none());
        assert!(RealmPolicy::new(DEFAULT_POWER_FLOOR, MAX_STALE_DAYS + 1).is_none());
        assert!(RealmPolicy::new(DEFAULT_POWER_FLOOR, i64::MAX).is_none());

        let widest = RealmPolicy::new(DEFAULT_POWER_FLOOR, MAX_STALE_DAYS).unwrap();
        assert_eq!(widest.stale_after, Duration::days(MAX_STALE_DAYS));
        assert_eq!(RealmPolicy::new(DEFAULT_POWER_FLOOR, DEFAULT_STALE_DAYS), Some(RealmPolicy::default()));
    }

    #[test]
    fn test_low_power_stale_player_is_not_marked() {
        let policy = RealmPolicy::default();
        let c = candidate(Some(5_000_000), Some(t0()), false);
        assert_eq!(policy.evaluate(&c, t0() + Duration::days(8)), RealmDecision::Unchanged);
    }

    #[test]
    fn test_high_power_stale_player_is_marked() {
        let policy = RealmPolicy::default();
        let now = t0() + Duration::days(8);
        let c = candidate(Some(50_000_000), Some(t0()), false);
        assert_eq!(policy.evaluate(&c, now), RealmDecision::MarkLeft { at: now });
    }

    #[test]
    fn test_recent_high_power_player_is_not_marked() {
        let policy = RealmPolicy::default();
        let c = candidate(Some(50_000_000), Some(t0()), false);
        assert_eq!(policy.evaluate(&c, t0() + Duration::days(6)), RealmDecision::Unchanged);
        // exactly at the cutoff is not older than it
        assert_eq!(policy.evaluate(&c, t0() + Duration::days(7)), RealmDecision::Unchanged);
    }

    #[test]
    fn test_power_exactly_at_floor_counts_as_above() {
        let policy = RealmPolicy::default();
        let now = t0() + Duration::days(8);
        let c = candidate(Some(DEFAULT_POWER_FLOOR), Some(t0()), false);
        assert_eq!(policy.evaluate(&c, now), RealmDecision::MarkLeft { at: now });

        let flagged = candidate(Some(DEFAULT_POWER_FLOOR), Some(t0()), true);
        assert_eq!(policy.evaluate(&flagged, now), RealmDecision::Unchanged);
    }

    #[test]
    fn test_flagged_low_power_player_is_cleared() {
        let policy = RealmPolicy::default();
        let c = candidate(Some(2_000_000), Some(t0()), true);
        assert_eq!(policy.evaluate(&c, t0() + Duration::days(30)), RealmDecision::Clear);
    }

    #[test]
    fn test_missing_data_leaves_player_alone() {
        let policy = RealmPolicy::default();
        let now = t0() + Duration::days(30);
        assert_eq!(
            policy.evaluate(&candidate(None, Some(t0()), false), now),
            RealmDecision::Unchanged
        );
        assert_eq!(
            policy.evaluate(&candidate(None, Some(t0()), true), now),
            RealmDecision::Unchanged
        );
        assert_eq!(
            policy.evaluate(&candidate(Some(50_000_000), None, false), now),
            RealmDecision::Unchanged
        );
    }

    #[test]
    fn test_decisions_reach_fixed_point() {
        let policy = RealmPolicy::default();
        let now = t0() + Duration::days(8);
        let mut c = candidate(Some(50_000_000), Some(t0()), false);

        if let RealmDecision::MarkLeft { at } = policy.evaluate(&c, now) {
            c.has_left_realm = true;
            c.left_realm_at = Some(at);
        }
        assert_eq!(policy.evaluate(&c, now), RealmDecision::Unchanged);
    }
}
