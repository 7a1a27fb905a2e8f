//! Guild war: declare -> accept -> prep -> active, then shares the same
//! match state machine as an arena with a fortress map and larger roster cap.

use crate::error::MatchError;
use crate::lifecycle::{MatchInstance, VictoryCondition};
use crate::queue::MatchTypeId;
use mmo_ecs::prelude::EntityId;

pub const DECLARATION_TIMEOUT_TICKS: u64 = 3600 * 20;
pub const PREP_TICKS: u64 = 5 * 60 * 20;
pub const ACTIVE_MAX_TICKS: u64 = 3600 * 20;
pub const WAR_ROSTER_CAP: usize = 100;
pub const WAR_SCORE_LIMIT: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarPhase {
    Declared,
    Accepted,
    Prep,
    Active,
    Expired,
}

pub struct WarDeclaration {
    pub id: u64,
    pub declaring_guild: u64,
    pub defending_guild: u64,
    pub phase: WarPhase,
    phase_entered_tick: u64,
}

impl WarDeclaration {
    pub fn declare(id: u64, declaring_guild: u64, defending_guild: u64, now_tick: u64) -> Self {
        Self { id, declaring_guild, defending_guild, phase: WarPhase::Declared, phase_entered_tick: now_tick }
    }

    pub fn accept(&mut self, now_tick: u64) -> Result<(), MatchError> {
        if self.phase != WarPhase::Declared {
            return Err(MatchError::NotEligible { reason: "war is not awaiting acceptance" });
        }
        if now_tick.saturating_sub(self.phase_entered_tick) > DECLARATION_TIMEOUT_TICKS {
            self.phase = WarPhase::Expired;
            return Err(MatchError::NotEligible { reason: "declaration window expired" });
        }
        self.phase = WarPhase::Accepted;
        self.phase_entered_tick = now_tick;
        Ok(())
    }

    /// Advances `Accepted -> Prep -> Active`; once `Active` fires, the
    /// caller should spawn the `MatchInstance` and start feeding rosters.
    pub fn advance(&mut self, now_tick: u64) -> WarPhase {
        match self.phase {
            WarPhase::Accepted => {
                self.phase = WarPhase::Prep;
                self.phase_entered_tick = now_tick;
            }
            WarPhase::Prep => {
                if now_tick.saturating_sub(self.phase_entered_tick) >= PREP_TICKS {
                    self.phase = WarPhase::Active;
                    self.phase_entered_tick = now_tick;
                }
            }
            _ => {}
        }
        self.phase
    }
}

/// Builds the `MatchInstance` for an active guild war: fortress map
/// (`zone_id`), two rosters capped at `WAR_ROSTER_CAP`, score limit 1000,
/// bounded by `ACTIVE_MAX_TICKS`.
pub fn build_war_instance(
    match_id: u64,
    zone_id: u32,
    attackers: Vec<EntityId>,
    defenders: Vec<EntityId>,
    now_tick: u64,
) -> MatchInstance {
    let mut attackers = attackers;
    let mut defenders = defenders;
    attackers.truncate(WAR_ROSTER_CAP);
    defenders.truncate(WAR_ROSTER_CAP);
    MatchInstance::new(
        match_id,
        MatchTypeId(u32::MAX),
        zone_id,
        vec![attackers, defenders],
        VictoryCondition { score_limit: Some(WAR_SCORE_LIMIT), kill_limit: None, max_duration_ticks: ACTIVE_MAX_TICKS },
        now_tick,
    )
}
