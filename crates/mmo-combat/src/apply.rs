//! Applying resolved damage/heal to a defender: dodge check, absorb chain,
//! health mutation, CC on-damage-taken notification, death handling.

use mmo_ecs::prelude::{Absorb, CombatStats, CrowdControl, DamageSchool, Dodge, EntityId, Health, World};

pub struct AppliedDamage {
    pub residual: f32,
    pub cc_broken: Vec<u64>,
    pub killed: bool,
}

/// Runs the post-pipeline application step from spec.md §4.4: dodge check,
/// newest-first absorb chain, residual HP reduction, CC on-damage-taken
/// notification, death bookkeeping. Does not emit outbound events; callers
/// translate the result into `DamageDealt`/`EntityDied`.
pub fn apply_damage_to(world: &mut World, defender: EntityId, amount: f32, physical: bool, school: DamageSchool, now: u64) -> Result<AppliedDamage, mmo_ecs::prelude::EcsError> {
    if let Ok(dodge) = world.get::<Dodge>(defender) {
        if dodge.active && dodge.end_tick > now {
            return Ok(AppliedDamage {
                residual: 0.0,
                cc_broken: Vec::new(),
                killed: false,
            });
        }
    }

    let residual = if let Ok(absorb) = world.get_mut::<Absorb>(defender) {
        absorb.absorb(amount, physical, school, now)
    } else {
        amount
    };

    let residual_i = residual.round() as i32;
    let health = world.get_mut::<Health>(defender)?;
    let was_dead = health.dead;
    health.apply_damage(residual_i, now);
    let killed = !was_dead && health.dead;

    let cc_broken = if let Ok(cc) = world.get_mut::<CrowdControl>(defender) {
        cc.on_damage_taken(residual_i, now)
    } else {
        Vec::new()
    };

    Ok(AppliedDamage {
        residual,
        cc_broken,
        killed,
    })
}

/// Heals `target` and, on effective healing, generates threat for `healer`
/// on every NPC currently threatening `target` (spec.md §4.4: healing
/// generates threat at roughly half the effective-heal coefficient, applied
/// via `ThreatKind::Healing`'s own coefficient inside `Threat::update`).
pub fn apply_heal_to(world: &mut World, target: EntityId, amount: f32, healer: EntityId, now: u64) -> Result<(i32, i32), mmo_ecs::prelude::EcsError> {
    let result = {
        let health = world.get_mut::<Health>(target)?;
        health.apply_heal(amount.round() as i32)
    };
    if result.0 > 0 {
        crate::threat_system::generate_heal_threat(world, target, healer, result.0 as f32, now);
    }
    Ok(result)
}

/// Armor/magic-resist scaling factor applied in the damage pipeline;
/// process-configurable, default matches scenario S1 (`armor_k = 0.01`).
pub const DEFAULT_ARMOR_REDUCTION_FACTOR: f32 = 0.01;

pub fn combat_stats_or_default(world: &World, id: EntityId) -> CombatStats {
    world.get::<CombatStats>(id).copied().unwrap_or(CombatStats {
        level: 1,
        atk_power: 0.0,
        spell_power: 0.0,
        armor: 0.0,
        magic_resist: 0.0,
        crit_chance: 0.0,
        crit_mult: 1.5,
        dmg_inc: 0.0,
        dmg_red: 0.0,
        attack_speed: 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_ecs::prelude::{Shield, Threat, ThreatKind};

    #[test]
    fn dodge_absorbs_everything() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, Health::new(100, 0)).unwrap();
        world
            .add(
                id,
                Dodge {
                    active: true,
                    direction: mmo_ecs::prelude::Vec3::ZERO,
                    end_tick: 100,
                },
            )
            .unwrap();
        let result = apply_damage_to(&mut world, id, 50.0, true, DamageSchool::Physical, 0).unwrap();
        assert_eq!(result.residual, 0.0);
        assert_eq!(world.get::<Health>(id).unwrap().current_hp, 100);
    }

    #[test]
    fn shields_absorb_before_health() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, Health::new(100, 0)).unwrap();
        world
            .add(
                id,
                Absorb {
                    shields: vec![Shield {
                        caster: id,
                        spell_id: 1,
                        max: 30.0,
                        remaining: 30.0,
                        school: None,
                        physical_only: None,
                        expires_tick: 100,
                    }],
                },
            )
            .unwrap();
        apply_damage_to(&mut world, id, 50.0, true, DamageSchool::Physical, 0).unwrap();
        assert_eq!(world.get::<Health>(id).unwrap().current_hp, 80);
    }

    #[test]
    fn lethal_damage_sets_dead_and_reports_killed() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, Health::new(10, 0)).unwrap();
        let result = apply_damage_to(&mut world, id, 50.0, true, DamageSchool::Physical, 0).unwrap();
        assert!(result.killed);
        assert!(world.get::<Health>(id).unwrap().dead);
    }

    #[test]
    fn healing_generates_threat_on_npcs_already_threatening_the_healed_target() {
        let mut world = World::new();
        let healed = world.create();
        let healer = world.create();
        let mob = world.create();
        world.add(healed, Health::new(100, 0)).unwrap();
        world.get_mut::<Health>(healed).unwrap().apply_damage(50, 0);
        world.add(mob, Threat::new()).unwrap();
        world.get_mut::<Threat>(mob).unwrap().update(healed, ThreatKind::Damage, 100.0, 1.0, 0);

        apply_heal_to(&mut world, healed, 20.0, healer, 1).unwrap();

        let value = world.get::<Threat>(mob).unwrap().table[&healer].value;
        assert_eq!(value, 10.0);
    }

    #[test]
    fn healing_generates_no_threat_when_overheal() {
        let mut world = World::new();
        let healed = world.create();
        let healer = world.create();
        let mob = world.create();
        world.add(healed, Health::new(100, 0)).unwrap();
        world.add(mob, Threat::new()).unwrap();
        world.get_mut::<Threat>(mob).unwrap().update(healed, ThreatKind::Damage, 100.0, 1.0, 0);

        apply_heal_to(&mut world, healed, 20.0, healer, 1).unwrap();

        assert!(!world.get::<Threat>(mob).unwrap().table.contains_key(&healer));
    }
}
