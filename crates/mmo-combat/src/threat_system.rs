//! Wires `Threat` updates into the tick and resolves the current aggro
//! target, mirroring the combat crate's other "system" functions that a
//! composition root wires directly into a `TickLoop` stage.

use mmo_ecs::prelude::{EntityId, Threat, ThreatKind, World};

pub fn record_threat(world: &mut World, target: EntityId, attacker: EntityId, kind: ThreatKind, amount: f32, class_mult: f32, now: u64) {
    if let Ok(threat) = world.get_mut::<Threat>(target) {
        threat.update(attacker, kind, amount, class_mult, now);
    }
}

/// Healing `healed` generates threat for `healer` on every NPC currently
/// threatening `healed` (its table holds an entry keyed by `healed`) — the
/// raw effective heal is passed through; `ThreatKind::Healing`'s own 0.5x
/// coefficient inside `Threat::update` does the halving.
pub fn generate_heal_threat(world: &mut World, healed: EntityId, healer: EntityId, effective_heal: f32, now: u64) {
    let threatening_npcs: Vec<EntityId> = world
        .iter::<Threat>()
        .filter(|(_, threat)| threat.table.contains_key(&healed))
        .map(|(id, _)| id)
        .collect();
    for npc in threatening_npcs {
        record_threat(world, npc, healer, ThreatKind::Healing, effective_heal, 1.0, now);
    }
}

pub fn taunt(world: &mut World, target: EntityId, taunter: EntityId, until_tick: u64) {
    if let Ok(threat) = world.get_mut::<Threat>(target) {
        threat.extend_taunt(taunter, until_tick, until_tick);
    }
}

pub fn current_aggro_target(world: &World, holder: EntityId, now: u64) -> Option<EntityId> {
    world.get::<Threat>(holder).ok().and_then(|t| t.current_target(now))
}

/// Sweeps every `Threat` table, decaying idle entries; run in post-update.
pub fn decay_idle_threat_system(world: &mut World, now: u64, idle_ticks: u64) {
    let ids: Vec<EntityId> = world.iter::<Threat>().map(|(id, _)| id).collect();
    for id in ids {
        if let Ok(threat) = world.get_mut::<Threat>(id) {
            threat.decay_idle(now, idle_ticks);
        }
    }
}
