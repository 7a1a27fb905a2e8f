use crate::components::transform::Vec3;
use crate::entity::EntityId;
use crate::storage::Component;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type SkillId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSchool {
    Physical,
    Fire,
    Frost,
    Arcane,
    Nature,
    Shadow,
    Holy,
}

/// How a skill is delivered. Targeted-mode skills (`Instant`/`Targeted`/
/// `Channeled`) resolve against `Target::current_target`; action-mode
/// skills (`Skillshot`/`Area`/`MeleeSwing`) need no locked target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillDelivery {
    Instant,
    Targeted,
    Channeled,
    Skillshot,
    Area,
    MeleeSwing,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SkillDef {
    pub delivery: SkillDelivery,
    pub resource_cost: i32,
    pub cooldown_ticks: u64,
    pub cast_time_ticks: u64,
    pub range: f32,
    pub radius: f32,
    pub base_damage: f32,
    pub power_coef: f32,
    pub physical: bool,
    pub school: DamageSchool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SkillRuntime {
    pub def: SkillDef,
    pub ready_tick: u64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum CastAim {
    Target(EntityId),
    Direction(Vec3),
    GroundPoint(Vec3),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CastState {
    pub skill_id: SkillId,
    pub end_tick: u64,
    pub aim: CastAim,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Skills {
    pub known: HashMap<SkillId, SkillRuntime>,
    pub global_cooldown_ready_tick: u64,
    pub current_cast: Option<CastState>,
}

impl Skills {
    pub fn new() -> Self {
        Self {
            known: HashMap::new(),
            global_cooldown_ready_tick: 0,
            current_cast: None,
        }
    }

    pub fn is_on_cooldown(&self, skill_id: SkillId, now: u64) -> bool {
        self.known
            .get(&skill_id)
            .map(|r| r.ready_tick > now)
            .unwrap_or(false)
    }

    pub fn is_on_global_cooldown(&self, now: u64) -> bool {
        self.global_cooldown_ready_tick > now
    }

    pub fn start_cooldown(&mut self, skill_id: SkillId, now: u64, gcd_ticks: u64) {
        if let Some(runtime) = self.known.get_mut(&skill_id) {
            runtime.ready_tick = now + runtime.def.cooldown_ticks;
        }
        self.global_cooldown_ready_tick = now + gcd_ticks;
    }

    pub fn cancel_cast(&mut self) -> Option<CastState> {
        self.current_cast.take()
    }
}

impl Default for Skills {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Skills {
    const NAME: &'static str = "Skills";
}
