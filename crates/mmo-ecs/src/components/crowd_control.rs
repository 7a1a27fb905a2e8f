use crate::entity::EntityId;
use crate::storage::Component;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

bitflags::bitflags! {
    /// Crowd-control capability mask. Each bit is independently tracked for
    /// diminishing returns and post-removal immunity.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CcType: u32 {
        const STUN      = 1 << 0;
        const ROOT      = 1 << 1;
        const SILENCE   = 1 << 2;
        const DISARM    = 1 << 3;
        const FEAR      = 1 << 4;
        const CHARM     = 1 << 5;
        const SLEEP     = 1 << 6;
        const POLYMORPH = 1 << 7;
        const SLOW      = 1 << 8;
        const SNARE     = 1 << 9;
        const BLIND     = 1 << 10;
        const CONFUSE   = 1 << 11;
        const TAUNT     = 1 << 12;
        const PACIFY    = 1 << 13;
        const BANISH    = 1 << 14;
        const FREEZE    = 1 << 15;
        const KNOCKBACK = 1 << 16;
        const KNOCKUP   = 1 << 17;
        const SUPPRESS  = 1 << 18;
        const GROUNDED  = 1 << 19;
    }
}

impl CcType {
    /// Every set bit as its own single-bit flag, for per-type DR/immunity
    /// bookkeeping.
    pub fn iter_bits(self) -> impl Iterator<Item = CcType> {
        self.iter()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakPolicy {
    None,
    Damage,
    DamageThreshold,
    Movement,
    Action,
    TimerOnly,
}

pub type CcEffectId = u64;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CcEffect {
    pub cc_type: CcType,
    pub source: EntityId,
    pub start_tick: u64,
    pub end_tick: u64,
    pub break_policy: BreakPolicy,
    pub damage_threshold: Option<i32>,
    pub damage_taken: i32,
    pub slow_pct: f32,
    pub snare_pct: f32,
    pub hard: bool,
    pub cleanse_tier: u8,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct DrState {
    pub stack_count: u32,
    pub last_applied_tick: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CrowdControl {
    pub effects: HashMap<CcEffectId, CcEffect>,
    pub dr_state: HashMap<u32, DrState>,
    /// Single-bit-keyed immunity expiry, granted on hard-CC removal.
    pub immune_until: HashMap<u32, u64>,
}

/// DR index -> duration multiplier, per the design constant table.
pub const DR_MULTIPLIERS: [f32; 4] = [1.0, 0.5, 0.25, 0.0];

impl CrowdControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_mask(&self, now: u64) -> CcType {
        let mut mask = CcType::empty();
        for effect in self.effects.values() {
            if effect.end_tick > now {
                mask |= effect.cc_type;
            }
        }
        mask
    }

    pub fn can_move(&self, now: u64) -> bool {
        !self
            .active_mask(now)
            .intersects(CcType::STUN | CcType::ROOT | CcType::FEAR | CcType::SLEEP | CcType::FREEZE | CcType::SUPPRESS)
    }

    pub fn can_cast(&self, now: u64) -> bool {
        !self
            .active_mask(now)
            .intersects(CcType::STUN | CcType::SILENCE | CcType::FEAR | CcType::SLEEP | CcType::POLYMORPH | CcType::SUPPRESS)
    }

    pub fn can_attack(&self, now: u64) -> bool {
        !self
            .active_mask(now)
            .intersects(CcType::STUN | CcType::DISARM | CcType::FEAR | CcType::SLEEP | CcType::POLYMORPH | CcType::PACIFY | CcType::SUPPRESS)
    }

    pub fn can_use_ability(&self, now: u64) -> bool {
        self.can_cast(now)
    }

    /// Multiplicative aggregate of every active slow/snare percentage.
    pub fn movement_multiplier(&self, now: u64) -> f32 {
        let mut mult = 1.0f32;
        for effect in self.effects.values() {
            if effect.end_tick <= now {
                continue;
            }
            if effect.cc_type.intersects(CcType::SLOW | CcType::SNARE) {
                mult *= 1.0 - effect.slow_pct.max(effect.snare_pct);
            }
        }
        mult.max(0.0)
    }

    pub fn attack_speed_multiplier(&self, now: u64) -> f32 {
        self.movement_multiplier(now)
    }

    /// DR index for a single-bit type based on recent application count.
    pub fn dr_index(&self, bit: CcType, now: u64, dr_window_ticks: u64) -> usize {
        let key = bit.bits();
        match self.dr_state.get(&key) {
            Some(state) if now.saturating_sub(state.last_applied_tick) <= dr_window_ticks => {
                (state.stack_count as usize).min(DR_MULTIPLIERS.len() - 1)
            }
            _ => 0,
        }
    }

    pub fn record_application(&mut self, bit: CcType, now: u64) {
        let key = bit.bits();
        let entry = self.dr_state.entry(key).or_default();
        entry.stack_count += 1;
        entry.last_applied_tick = now;
    }

    pub fn is_immune(&self, bit: CcType, now: u64) -> bool {
        self.immune_until.get(&bit.bits()).map(|t| *t > now).unwrap_or(false)
    }

    pub fn grant_immunity(&mut self, bit: CcType, now: u64, immunity_ticks: u64) {
        self.immune_until.insert(bit.bits(), now + immunity_ticks);
    }

    pub fn on_damage_taken(&mut self, amount: i32, now: u64) -> Vec<CcEffectId> {
        let mut broken = Vec::new();
        for (id, effect) in self.effects.iter_mut() {
            if effect.end_tick <= now {
                continue;
            }
            let breaks = match effect.break_policy {
                BreakPolicy::Damage => true,
                BreakPolicy::DamageThreshold => {
                    effect.damage_taken += amount;
                    effect
                        .damage_threshold
                        .map(|t| effect.damage_taken >= t)
                        .unwrap_or(false)
                }
                _ => false,
            };
            if breaks {
                broken.push(*id);
            }
        }
        for id in &broken {
            self.effects.remove(id);
        }
        broken
    }
}

impl Component for CrowdControl {
    const NAME: &'static str = "CrowdControl";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_source() -> EntityId {
        EntityId::new(1, 0)
    }

    #[test]
    fn dr_index_resets_after_window() {
        let mut cc = CrowdControl::new();
        assert_eq!(cc.dr_index(CcType::STUN, 0, 360), 0);
        cc.record_application(CcType::STUN, 0);
        assert_eq!(cc.dr_index(CcType::STUN, 10, 360), 1);
        cc.record_application(CcType::STUN, 10);
        assert_eq!(cc.dr_index(CcType::STUN, 20, 360), 2);
        assert_eq!(cc.dr_index(CcType::STUN, 400, 360), 0);
    }

    #[test]
    fn stun_blocks_move_cast_attack() {
        let mut cc = CrowdControl::new();
        cc.effects.insert(
            1,
            CcEffect {
                cc_type: CcType::STUN,
                source: dummy_source(),
                start_tick: 0,
                end_tick: 100,
                break_policy: BreakPolicy::TimerOnly,
                damage_threshold: None,
                damage_taken: 0,
                slow_pct: 0.0,
                snare_pct: 0.0,
                hard: true,
                cleanse_tier: 0,
            },
        );
        assert!(!cc.can_move(50));
        assert!(!cc.can_cast(50));
        assert!(!cc.can_attack(50));
        assert!(cc.can_move(150));
    }

    #[test]
    fn damage_threshold_breaks_root() {
        let mut cc = CrowdControl::new();
        cc.effects.insert(
            7,
            CcEffect {
                cc_type: CcType::ROOT,
                source: dummy_source(),
                start_tick: 0,
                end_tick: 1000,
                break_policy: BreakPolicy::DamageThreshold,
                damage_threshold: Some(100),
                damage_taken: 0,
                slow_pct: 0.0,
                snare_pct: 0.0,
                hard: true,
                cleanse_tier: 0,
            },
        );
        assert!(cc.on_damage_taken(30, 1).is_empty());
        assert!(cc.on_damage_taken(40, 2).is_empty());
        let broken = cc.on_damage_taken(40, 3);
        assert_eq!(broken, vec![7]);
        assert!(cc.effects.is_empty());
    }

    #[test]
    fn slow_and_snare_stack_multiplicatively() {
        let mut cc = CrowdControl::new();
        cc.effects.insert(
            1,
            CcEffect {
                cc_type: CcType::SLOW,
                source: dummy_source(),
                start_tick: 0,
                end_tick: 100,
                break_policy: BreakPolicy::TimerOnly,
                damage_threshold: None,
                damage_taken: 0,
                slow_pct: 0.3,
                snare_pct: 0.0,
                hard: false,
                cleanse_tier: 0,
            },
        );
        cc.effects.insert(
            2,
            CcEffect {
                cc_type: CcType::SNARE,
                source: dummy_source(),
                start_tick: 0,
                end_tick: 100,
                break_policy: BreakPolicy::TimerOnly,
                damage_threshold: None,
                damage_taken: 0,
                slow_pct: 0.0,
                snare_pct: 0.5,
                hard: false,
                cleanse_tier: 0,
            },
        );
        let mult = cc.movement_multiplier(10);
        assert!((mult - 0.35).abs() < 1e-5);
    }
}
