//! Match lifecycle state machine and instance isolation: the state machine
//! is shared by arenas and guild wars; isolation stashes a joining player's
//! world transform and rejects interactions that cross instance boundaries.

use crate::error::MatchError;
use crate::queue::MatchTypeId;
use mmo_ecs::prelude::{EntityId, MatchMembership, Transform, Vec3, World};
use std::collections::HashMap;

pub const STARTING_COUNTDOWN_TICKS: u64 = 10 * 20;
pub const OBSERVATION_WINDOW_TICKS: u64 = 5 * 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    WaitingForPlayers,
    Starting,
    InProgress,
    Overtime,
    Ending,
    Completed,
}

#[derive(Clone, Copy, Debug)]
pub struct VictoryCondition {
    pub score_limit: Option<u32>,
    pub kill_limit: Option<u32>,
    pub max_duration_ticks: u64,
}

#[derive(Clone, Debug, Default)]
pub struct TeamState {
    pub roster: Vec<EntityId>,
    pub score: u32,
    pub kills: u32,
    pub disconnected: Vec<EntityId>,
}

impl TeamState {
    fn alive_count(&self) -> usize {
        self.roster.iter().filter(|e| !self.disconnected.contains(e)).count()
    }
}

pub struct MatchInstance {
    pub id: u64,
    pub match_type: MatchTypeId,
    pub zone_id: u32,
    pub phase: MatchPhase,
    pub teams: Vec<TeamState>,
    pub victory: VictoryCondition,
    phase_entered_tick: u64,
    stashed_transforms: HashMap<EntityId, Transform>,
}

impl MatchInstance {
    pub fn new(id: u64, match_type: MatchTypeId, zone_id: u32, teams: Vec<Vec<EntityId>>, victory: VictoryCondition, now_tick: u64) -> Self {
        Self {
            id,
            match_type,
            zone_id,
            phase: MatchPhase::WaitingForPlayers,
            teams: teams.into_iter().map(|roster| TeamState { roster, ..Default::default() }).collect(),
            victory,
            phase_entered_tick: now_tick,
            stashed_transforms: HashMap::new(),
        }
    }

    fn enter(&mut self, phase: MatchPhase, now_tick: u64) {
        self.phase = phase;
        self.phase_entered_tick = now_tick;
    }

    /// Stashes `player`'s world transform and teleports them into the
    /// instance at `spawn_point`, tagged with this match's id and team.
    pub fn join(&mut self, world: &mut World, player: EntityId, team_id: u32, spawn_point: Vec3) -> Result<(), MatchError> {
        let previous = world.get::<Transform>(player).ok().cloned().unwrap_or(Transform { position: Vec3::ZERO, facing: 0.0, zone_id: 0 });
        self.stashed_transforms.insert(player, previous);
        set_transform(world, player, Transform { position: spawn_point, facing: 0.0, zone_id: self.zone_id });
        world.remove::<MatchMembership>(player).ok();
        world.add(player, MatchMembership { match_id: self.id, team_id }).ok();
        Ok(())
    }

    /// Restores `player`'s pre-match transform and clears their membership.
    pub fn leave(&mut self, world: &mut World, player: EntityId) {
        world.remove::<MatchMembership>(player).ok();
        if let Some(previous) = self.stashed_transforms.remove(&player) {
            set_transform(world, player, previous);
        }
    }

    pub fn roster_full(&self) -> bool {
        self.teams.iter().all(|t| !t.roster.is_empty())
    }

    pub fn begin_countdown(&mut self, now_tick: u64) {
        if self.phase == MatchPhase::WaitingForPlayers && self.roster_full() {
            self.enter(MatchPhase::Starting, now_tick);
        }
    }

    pub fn record_kill(&mut self, killing_team: usize) {
        if let Some(team) = self.teams.get_mut(killing_team) {
            team.kills += 1;
        }
    }

    pub fn record_score(&mut self, scoring_team: usize, amount: u32) {
        if let Some(team) = self.teams.get_mut(scoring_team) {
            team.score += amount;
        }
        if self.phase == MatchPhase::Overtime {
            // First score change during overtime ends it immediately.
            self.phase = MatchPhase::Ending;
        }
    }

    pub fn record_disconnect(&mut self, team: usize, player: EntityId) {
        if let Some(t) = self.teams.get_mut(team) {
            if !t.disconnected.contains(&player) {
                t.disconnected.push(player);
            }
        }
    }

    fn check_victory(&self) -> Option<usize> {
        for (idx, team) in self.teams.iter().enumerate() {
            if let Some(limit) = self.victory.score_limit {
                if team.score >= limit {
                    return Some(idx);
                }
            }
            if let Some(limit) = self.victory.kill_limit {
                if team.kills >= limit {
                    return Some(idx);
                }
            }
        }
        let alive_teams: Vec<usize> = self
            .teams
            .iter()
            .enumerate()
            .filter(|(_, t)| t.alive_count() > 0)
            .map(|(i, _)| i)
            .collect();
        if alive_teams.len() == 1 {
            return Some(alive_teams[0]);
        }
        None
    }

    /// Advances the phase based on elapsed ticks and current scores; returns
    /// the winning team index once the match reaches `Completed`.
    pub fn advance(&mut self, now_tick: u64) -> Option<usize> {
        match self.phase {
            MatchPhase::WaitingForPlayers => {
                self.begin_countdown(now_tick);
                None
            }
            MatchPhase::Starting => {
                if now_tick.saturating_sub(self.phase_entered_tick) >= STARTING_COUNTDOWN_TICKS {
                    self.enter(MatchPhase::InProgress, now_tick);
                }
                None
            }
            MatchPhase::InProgress => {
                if let Some(_winner) = self.check_victory() {
                    self.enter(MatchPhase::Ending, now_tick);
                } else if now_tick.saturating_sub(self.phase_entered_tick) >= self.victory.max_duration_ticks {
                    self.enter(MatchPhase::Overtime, now_tick);
                }
                None
            }
            MatchPhase::Overtime => None,
            MatchPhase::Ending => {
                if now_tick.saturating_sub(self.phase_entered_tick) >= OBSERVATION_WINDOW_TICKS {
                    self.enter(MatchPhase::Completed, now_tick);
                    return self.check_victory().or_else(|| self.teams.iter().enumerate().max_by_key(|(_, t)| t.score).map(|(i, _)| i));
                }
                None
            }
            MatchPhase::Completed => None,
        }
    }
}

fn set_transform(world: &mut World, entity: EntityId, value: Transform) {
    if let Ok(existing) = world.get_mut::<Transform>(entity) {
        *existing = value;
    } else {
        world.add(entity, value).ok();
    }
}

/// Damage/heal between entities in different match instances (or one
/// inside an instance and one outside) must be rejected outright.
pub fn same_instance(world: &World, a: EntityId, b: EntityId) -> bool {
    let match_a = world.get::<MatchMembership>(a).ok().map(|m| m.match_id);
    let match_b = world.get::<MatchMembership>(b).ok().map(|m| m.match_id);
    match_a == match_b
}
