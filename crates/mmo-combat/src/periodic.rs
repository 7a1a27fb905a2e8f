//! Damage-over-time and healing-over-time ticking: stacking resolution on
//! apply, pandemic refresh, and per-tick damage/heal application.

use crate::apply::{apply_damage_to, apply_heal_to, combat_stats_or_default, DEFAULT_ARMOR_REDUCTION_FACTOR};
use crate::damage::{resolve_damage, resolve_heal, DamageInput, HealInput};
use mmo_ecs::prelude::{
    DamageOverTime, DamageSchool, DotInstance, EntityId, HealingOverTime, HotInstance, PeriodicInstanceId,
    StackingMode, World, PANDEMIC_EXTENSION_RATIO,
};
use rand::Rng;

/// Resolves how a new DoT application interacts with an existing instance
/// for the same `(target, effect_id, source)`, per spec.md §4.4's stacking
/// modes. Returns the instance to store (which may be the merged/refreshed
/// existing one) or `None` if the new application should be rejected
/// (weaker than an existing `replace_weaker` occupant).
pub fn resolve_dot_stacking(existing: Option<&DotInstance>, mut incoming: DotInstance, pandemic_ratio: f32) -> Option<DotInstance> {
    let Some(existing) = existing else {
        return Some(incoming);
    };
    match incoming.stacking_mode {
        StackingMode::None => {
            if existing.spread_policy == mmo_ecs::prelude::SpreadPolicy::Pandemic {
                let carry = (existing.remaining_ticks as f32 * pandemic_ratio) as u32;
                incoming.remaining_ticks += carry;
            }
            Some(incoming)
        }
        StackingMode::StackDamage => {
            incoming.stacks = existing.stacks + 1;
            Some(incoming)
        }
        StackingMode::StackDuration => {
            incoming.remaining_ticks += existing.remaining_ticks;
            Some(incoming)
        }
        StackingMode::StackBoth => {
            incoming.stacks = existing.stacks + 1;
            incoming.remaining_ticks += existing.remaining_ticks;
            Some(incoming)
        }
        StackingMode::UniqueSource => {
            // `apply_dot` keys unique-source instances by `(instance_id,
            // source)`, so a different source never reaches this branch as
            // `existing` — it lands in its own map slot instead. This branch
            // only sees a same-source reapplication, which refreshes in
            // place (with pandemic carry, same as `None`).
            if existing.spread_policy == mmo_ecs::prelude::SpreadPolicy::Pandemic {
                let carry = (existing.remaining_ticks as f32 * pandemic_ratio) as u32;
                incoming.remaining_ticks += carry;
            }
            Some(incoming)
        }
        StackingMode::ReplaceWeaker => {
            if incoming.total_damage >= existing.total_damage {
                Some(incoming)
            } else {
                None
            }
        }
    }
}

/// `UniqueSource` instances are keyed by `(instance_id, source)` instead of
/// `instance_id` alone, so two sources applying the same effect each get
/// their own slot and coexist rather than overwriting one another.
fn storage_key(instance_id: PeriodicInstanceId, instance: &DotInstance) -> PeriodicInstanceId {
    if instance.stacking_mode == StackingMode::UniqueSource {
        instance_id ^ instance.source.to_raw().wrapping_mul(0x9E3779B97F4A7C15)
    } else {
        instance_id
    }
}

pub fn apply_dot(world: &mut World, target: EntityId, instance_id: PeriodicInstanceId, instance: DotInstance) {
    if let Ok(dot) = world.get_mut::<DamageOverTime>(target) {
        let key = storage_key(instance_id, &instance);
        let existing = dot.instances.get(&key).cloned();
        if let Some(resolved) = resolve_dot_stacking(existing.as_ref(), instance, PANDEMIC_EXTENSION_RATIO) {
            dot.instances.insert(key, resolved);
        }
    }
}

/// Ticks every due DoT instance on `target`, routing the snapshotted
/// per-tick damage through the full damage pipeline (armor/magic-resist
/// mitigation, crit, level-delta, global modifiers) so a tick mitigates and
/// crits the same as any other hit. The power-scaling step is skipped here
/// since `sp_snapshot`/`ap_snapshot` already fold the caster's power in at
/// cast time — the attacker stats passed to `resolve_damage` zero out
/// `atk_power`/`spell_power` for that reason. Each tick rolls its own crit
/// against the source's live `crit_chance` rather than a cast-time snapshot.
pub fn tick_dots(world: &mut World, target: EntityId, now: u64, rng: &mut impl Rng) {
    let due: Vec<(PeriodicInstanceId, DotInstance)> = match world.get::<DamageOverTime>(target) {
        Ok(dot) => dot
            .instances
            .iter()
            .filter(|(_, inst)| inst.next_tick <= now && inst.remaining_ticks > 0)
            .map(|(id, inst)| (*id, *inst))
            .collect(),
        Err(_) => return,
    };

    for (instance_id, inst) in due {
        let base = (inst.sp_snapshot + inst.ap_snapshot).max(0.0);
        let mut attacker_stats = combat_stats_or_default(world, inst.source);
        attacker_stats.atk_power = 0.0;
        attacker_stats.spell_power = 0.0;
        let defender_stats = combat_stats_or_default(world, target);
        let out = resolve_damage(
            &attacker_stats,
            &defender_stats,
            DamageInput {
                base,
                physical: inst.physical,
                armor_reduction_factor: DEFAULT_ARMOR_REDUCTION_FACTOR,
                forced_crit: None,
            },
            rng,
        );
        let _ = apply_damage_to(world, target, out.amount, inst.physical, inst.school, now);

        if let Ok(dot) = world.get_mut::<DamageOverTime>(target) {
            if let Some(stored) = dot.instances.get_mut(&instance_id) {
                stored.next_tick = now + stored.tick_interval;
                stored.remaining_ticks = stored.remaining_ticks.saturating_sub(1);
                stored.total_damage += out.amount;
                if stored.remaining_ticks == 0 {
                    dot.instances.remove(&instance_id);
                }
            }
        }
    }
}

pub fn apply_hot(world: &mut World, target: EntityId, instance_id: PeriodicInstanceId, mut instance: HotInstance) {
    if let Ok(hot) = world.get_mut::<HealingOverTime>(target) {
        if let Some(existing) = hot.instances.get(&instance_id) {
            match instance.stacking_mode {
                StackingMode::StackDuration | StackingMode::StackBoth => {
                    instance.remaining_ticks += existing.remaining_ticks;
                }
                StackingMode::None => {
                    let carry = (existing.remaining_ticks as f32 * instance.extension_ratio) as u32;
                    instance.remaining_ticks += carry;
                }
                _ => {}
            }
        }
        hot.instances.insert(instance_id, instance);
    }
}

/// Ticks every due HoT instance on `target`, routing the snapshotted
/// per-tick heal through `resolve_heal` (crit against the source's live
/// stats; no per-effect school modifier since `HotInstance` carries none)
/// and through `apply_heal_to`, which generates heal threat for the source
/// on any NPC currently threatening `target`.
pub fn tick_hots(world: &mut World, target: EntityId, now: u64, rng: &mut impl Rng) {
    let due: Vec<(PeriodicInstanceId, HotInstance)> = match world.get::<HealingOverTime>(target) {
        Ok(hot) => hot
            .instances
            .iter()
            .filter(|(_, inst)| inst.next_tick <= now && inst.remaining_ticks > 0)
            .map(|(id, inst)| (*id, *inst))
            .collect(),
        Err(_) => return,
    };

    for (instance_id, inst) in due {
        let base = (inst.sp_snapshot + inst.ap_snapshot).max(0.0);
        let caster_stats = combat_stats_or_default(world, inst.source);
        let out = resolve_heal(
            &caster_stats,
            HealInput {
                base,
                sp_coef: 0.0,
                ap_coef: 0.0,
                school_modifier: 1.0,
                forced_crit: None,
            },
            rng,
        );
        let _ = apply_heal_to(world, target, out.amount, inst.source, now);

        if let Ok(hot) = world.get_mut::<HealingOverTime>(target) {
            if let Some(stored) = hot.instances.get_mut(&instance_id) {
                stored.next_tick = now + stored.tick_interval;
                stored.remaining_ticks = stored.remaining_ticks.saturating_sub(1);
                if stored.remaining_ticks == 0 {
                    hot.instances.remove(&instance_id);
                }
            }
        }
    }
}
