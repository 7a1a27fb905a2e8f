//! Matchmaking queue: oldest-entry-first scan, rating spread grows with
//! wait time, queue timeout drops a stale entry with a notification.

use mmo_ecs::prelude::EntityId;
use serde::{Deserialize, Serialize};

/// Scan cadence at the reference 20Hz tick rate (~5s).
pub const SCAN_INTERVAL_TICKS: u64 = 100;
pub const QUEUE_TIMEOUT_TICKS: u64 = 300 * 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchTypeId(pub u32);

/// Deployment-configurable; a host process loads a table of these from its
/// own config alongside `SimConfig` and registers each with `SimServer`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MatchTypeConfig {
    pub id: MatchTypeId,
    pub team_count: usize,
    pub team_size: usize,
}

impl MatchTypeConfig {
    pub fn roster_size(&self) -> usize {
        self.team_count * self.team_size
    }
}

#[derive(Clone, Debug)]
pub struct QueueEntry {
    pub player: EntityId,
    pub rating: f32,
    pub joined_at_tick: u64,
    pub group_members: Vec<EntityId>,
}

#[derive(Clone, Debug)]
pub struct FormedMatch {
    pub match_type: MatchTypeId,
    /// One roster per team, in formation order.
    pub teams: Vec<Vec<EntityId>>,
}

/// `200 + 50 * floor(wait_s / 30)`, per the matchmaker's stated growth rule.
pub fn rating_spread(wait_s: f64) -> f32 {
    200.0 + 50.0 * (wait_s / 30.0).floor() as f32
}

pub struct MatchmakingQueue {
    pub config: MatchTypeConfig,
    entries: Vec<QueueEntry>,
    tick_hz: u32,
}

impl MatchmakingQueue {
    pub fn new(config: MatchTypeConfig, tick_hz: u32) -> Self {
        Self { config, entries: Vec::new(), tick_hz }
    }

    pub fn enqueue(&mut self, player: EntityId, rating: f32, now_tick: u64, group_members: Vec<EntityId>) {
        self.entries.push(QueueEntry { player, rating, joined_at_tick: now_tick, group_members });
    }

    pub fn leave(&mut self, player: EntityId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.player != player);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn wait_seconds(&self, entry: &QueueEntry, now_tick: u64) -> f64 {
        now_tick.saturating_sub(entry.joined_at_tick) as f64 / self.tick_hz as f64
    }

    /// Drops entries that have waited past `QUEUE_TIMEOUT_TICKS`, returning
    /// the dropped players so the caller can notify them.
    pub fn drop_timed_out(&mut self, now_tick: u64) -> Vec<EntityId> {
        let mut dropped = Vec::new();
        self.entries.retain(|e| {
            if now_tick.saturating_sub(e.joined_at_tick) >= QUEUE_TIMEOUT_TICKS {
                dropped.push(e.player);
                false
            } else {
                true
            }
        });
        dropped
    }

    /// Forms as many matches as the current pool allows in one scan pass,
    /// oldest entry first. Within-match teams are split by alternating
    /// sorted rating so they start roughly balanced.
    pub fn scan(&mut self, now_tick: u64) -> Vec<FormedMatch> {
        let mut formed = Vec::new();
        let roster_size = self.config.roster_size();

        loop {
            if self.entries.is_empty() {
                break;
            }
            let oldest_idx = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, e)| e.joined_at_tick)
                .map(|(i, _)| i)
                .unwrap();
            let oldest_rating = self.entries[oldest_idx].rating;
            let spread = rating_spread(self.wait_seconds(&self.entries[oldest_idx], now_tick));

            let mut candidate_idxs: Vec<usize> = self
                .entries
                .iter()
                .enumerate()
                .filter(|(i, e)| *i == oldest_idx || (e.rating - oldest_rating).abs() <= spread)
                .map(|(i, _)| i)
                .collect();

            if candidate_idxs.len() < roster_size {
                break;
            }

            candidate_idxs.sort_by(|&a, &b| self.entries[a].rating.partial_cmp(&self.entries[b].rating).unwrap());
            candidate_idxs.truncate(roster_size);

            let mut roster: Vec<QueueEntry> = candidate_idxs
                .iter()
                .rev()
                .map(|&i| self.entries.remove(i))
                .collect();
            roster.reverse();

            let mut teams = vec![Vec::new(); self.config.team_count];
            for (i, entry) in roster.into_iter().enumerate() {
                let team = i % self.config.team_count;
                teams[team].push(entry.player);
            }

            formed.push(FormedMatch { match_type: self.config.id, teams });
        }

        formed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MatchTypeConfig {
        MatchTypeConfig { id: MatchTypeId(1), team_count: 2, team_size: 1 }
    }

    #[test]
    fn rating_spread_grows_every_30_seconds() {
        assert_eq!(rating_spread(0.0), 200.0);
        assert_eq!(rating_spread(29.9), 200.0);
        assert_eq!(rating_spread(30.0), 250.0);
        assert_eq!(rating_spread(65.0), 300.0);
    }

    #[test]
    fn scenario_s5_queue_formation_timing() {
        let tick_hz = 20;
        let mut queue = MatchmakingQueue::new(config(), tick_hz);
        let a = EntityId::new(1, 0);
        let b = EntityId::new(2, 0);
        let c = EntityId::new(3, 0);
        let d = EntityId::new(4, 0);

        queue.enqueue(a, 1500.0, 0, vec![]);
        queue.enqueue(b, 1520.0, 0, vec![]);
        queue.enqueue(c, 1900.0, 0, vec![]);

        let formed_at_t5 = queue.scan(5 * tick_hz as u64);
        assert_eq!(formed_at_t5.len(), 1);
        let roster: Vec<EntityId> = formed_at_t5[0].teams.iter().flatten().copied().collect();
        assert!(roster.contains(&a) && roster.contains(&b));
        assert_eq!(queue.len(), 1);

        queue.enqueue(d, 1700.0, 35 * tick_hz as u64, vec![]);
        let formed_at_t35 = queue.scan(35 * tick_hz as u64);
        assert_eq!(formed_at_t35.len(), 1);
        let roster2: Vec<EntityId> = formed_at_t35[0].teams.iter().flatten().copied().collect();
        assert!(roster2.contains(&c) && roster2.contains(&d));
    }

    #[test]
    fn stale_entry_drops_after_timeout() {
        let mut queue = MatchmakingQueue::new(config(), 20);
        let a = EntityId::new(1, 0);
        queue.enqueue(a, 1500.0, 0, vec![]);
        assert!(queue.drop_timed_out(QUEUE_TIMEOUT_TICKS - 1).is_empty());
        let dropped = queue.drop_timed_out(QUEUE_TIMEOUT_TICKS);
        assert_eq!(dropped, vec![a]);
        assert!(queue.is_empty());
    }

    #[test]
    fn too_small_a_pool_never_forms_a_match() {
        let mut queue = MatchmakingQueue::new(config(), 20);
        queue.enqueue(EntityId::new(1, 0), 1500.0, 0, vec![]);
        assert!(queue.scan(10).is_empty());
    }
}
