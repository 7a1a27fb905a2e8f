//! Outbound event types describing combat outcomes. These are plain data
//! the composition root serializes and hands to `mmo-net`; nothing in this
//! crate sends them anywhere.

use mmo_ecs::prelude::{CcType, DamageSchool, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CombatEvent {
    DamageDealt {
        attacker: EntityId,
        target: EntityId,
        amount: f32,
        physical: bool,
        school: DamageSchool,
        crit: bool,
        tick: u64,
    },
    Healed {
        caster: EntityId,
        target: EntityId,
        amount: f32,
        overheal: f32,
        crit: bool,
        tick: u64,
    },
    EntityDied {
        entity: EntityId,
        killer: Option<EntityId>,
        tick: u64,
    },
    StatusApplied {
        target: EntityId,
        source: EntityId,
        cc_type: CcType,
        duration_ticks: u64,
        tick: u64,
    },
    StatusExpired {
        target: EntityId,
        cc_type: CcType,
        tick: u64,
    },
    DotTick {
        target: EntityId,
        effect_id: u32,
        amount: f32,
        tick: u64,
    },
    HotTick {
        target: EntityId,
        effect_id: u32,
        amount: f32,
        tick: u64,
    },
    ShieldChanged {
        target: EntityId,
        spell_id: u32,
        remaining: f32,
        tick: u64,
    },
    CastStarted {
        caster: EntityId,
        skill_id: u32,
        end_tick: u64,
    },
    CastFinished {
        caster: EntityId,
        skill_id: u32,
        tick: u64,
    },
    CastCancelled {
        caster: EntityId,
        skill_id: u32,
        tick: u64,
    },
    ThreatChanged {
        holder: EntityId,
        new_target: Option<EntityId>,
        tick: u64,
    },
}
