use crate::components::skills::DamageSchool;
use crate::entity::EntityId;
use crate::storage::Component;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackingMode {
    None,
    StackDamage,
    StackDuration,
    StackBoth,
    UniqueSource,
    ReplaceWeaker,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadPolicy {
    None,
    OnDeath,
    OnDamage,
    OnProximity,
    Pandemic,
}

pub type PeriodicInstanceId = u64;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DotInstance {
    pub effect_id: u32,
    pub source: EntityId,
    pub sp_snapshot: f32,
    pub ap_snapshot: f32,
    pub school: DamageSchool,
    pub physical: bool,
    pub tick_interval: u64,
    pub next_tick: u64,
    pub remaining_ticks: u32,
    pub stacks: u32,
    pub stacking_mode: StackingMode,
    pub spread_policy: SpreadPolicy,
    pub total_damage: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DamageOverTime {
    pub instances: HashMap<PeriodicInstanceId, DotInstance>,
}

impl Component for DamageOverTime {
    const NAME: &'static str = "DamageOverTime";
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HotInstance {
    pub effect_id: u32,
    pub source: EntityId,
    pub sp_snapshot: f32,
    pub ap_snapshot: f32,
    pub tick_interval: u64,
    pub next_tick: u64,
    pub remaining_ticks: u32,
    pub stacks: u32,
    pub stacking_mode: StackingMode,
    /// Pandemic refresh adds `extension_ratio * remaining` to a fresh
    /// application's duration.
    pub extension_ratio: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HealingOverTime {
    pub instances: HashMap<PeriodicInstanceId, HotInstance>,
}

impl Component for HealingOverTime {
    const NAME: &'static str = "HealingOverTime";
}

/// Design constant: pandemic refresh bonus ratio applied to carried-over
/// remaining duration.
pub const PANDEMIC_EXTENSION_RATIO: f32 = 0.3;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Shield {
    pub caster: EntityId,
    pub spell_id: u32,
    pub max: f32,
    pub remaining: f32,
    pub school: Option<DamageSchool>,
    pub physical_only: Option<bool>,
    pub expires_tick: u64,
}

impl Shield {
    pub fn accepts(&self, physical: bool, school: DamageSchool) -> bool {
        if let Some(want_physical) = self.physical_only {
            if want_physical != physical {
                return false;
            }
        }
        if let Some(want_school) = self.school {
            if want_school != school {
                return false;
            }
        }
        true
    }
}

/// Ordered newest-first; absorption walks from the front.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Absorb {
    pub shields: Vec<Shield>,
}

impl Absorb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_newest(&mut self, shield: Shield) {
        self.shields.insert(0, shield);
    }

    /// Consumes shield capacity against `damage`, newest-first, for the
    /// first shields whose filter accepts this damage kind. Returns the
    /// residual damage after absorption.
    pub fn absorb(&mut self, mut damage: f32, physical: bool, school: DamageSchool, now_tick: u64) -> f32 {
        self.shields.retain(|s| s.expires_tick > now_tick && s.remaining > 0.0);
        for shield in self.shields.iter_mut() {
            if damage <= 0.0 {
                break;
            }
            if !shield.accepts(physical, school) {
                continue;
            }
            let absorbed = damage.min(shield.remaining);
            shield.remaining -= absorbed;
            damage -= absorbed;
        }
        self.shields.retain(|s| s.remaining > 0.0);
        damage
    }
}

impl Component for Absorb {
    const NAME: &'static str = "Absorb";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> EntityId {
        EntityId::new(1, 0)
    }

    #[test]
    fn absorb_consumes_newest_shield_first() {
        let mut absorb = Absorb::new();
        absorb.push_newest(Shield {
            caster: source(),
            spell_id: 1,
            max: 50.0,
            remaining: 50.0,
            school: None,
            physical_only: None,
            expires_tick: 1000,
        });
        absorb.push_newest(Shield {
            caster: source(),
            spell_id: 2,
            max: 30.0,
            remaining: 30.0,
            school: None,
            physical_only: None,
            expires_tick: 1000,
        });
        let residual = absorb.absorb(40.0, true, DamageSchool::Physical, 0);
        assert_eq!(residual, 0.0);
        assert_eq!(absorb.shields.len(), 2);
        assert_eq!(absorb.shields[0].remaining, 0.0);
        assert_eq!(absorb.shields[1].remaining, 40.0);
    }

    #[test]
    fn absorb_respects_school_filter() {
        let mut absorb = Absorb::new();
        absorb.push_newest(Shield {
            caster: source(),
            spell_id: 1,
            max: 50.0,
            remaining: 50.0,
            school: Some(DamageSchool::Fire),
            physical_only: None,
            expires_tick: 1000,
        });
        let residual = absorb.absorb(40.0, true, DamageSchool::Physical, 0);
        assert_eq!(residual, 40.0);
    }

    #[test]
    fn expired_shields_are_pruned() {
        let mut absorb = Absorb::new();
        absorb.push_newest(Shield {
            caster: source(),
            spell_id: 1,
            max: 50.0,
            remaining: 50.0,
            school: None,
            physical_only: None,
            expires_tick: 5,
        });
        let residual = absorb.absorb(10.0, true, DamageSchool::Physical, 10);
        assert_eq!(residual, 10.0);
        assert!(absorb.shields.is_empty());
    }
}
