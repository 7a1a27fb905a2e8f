//! Skill-cast validation and resolution: cooldown/GCD/resource/CC checks on
//! start, targeted-mode and action-mode resolution on finish.

use crate::apply::{apply_damage_to, combat_stats_or_default};
use crate::damage::{resolve_damage, DamageInput};
use crate::error::CombatError;
use mmo_ecs::prelude::{CastAim, CastState, CrowdControl, EntityId, Health, SkillDelivery, SkillId, Skills, Target, TargetType, Transform, World};
use mmo_spatial::prelude::{SpatialGrid, TerrainMap};
use rand::Rng;

/// Design constant: global cooldown duration, independent of any skill's own
/// cooldown.
pub const GCD_TICKS: u64 = 10; // 0.5s at 20Hz

fn can_act(world: &World, caster: EntityId, now: u64) -> bool {
    world.get::<CrowdControl>(caster).map(|cc| cc.can_cast(now)).unwrap_or(true)
}

/// Validates every precondition from spec.md §4.4's cast rules and, if they
/// all pass, commits the resource cost and cooldowns. Returns the skill's
/// cast time so the caller can decide whether to resolve immediately
/// (`cast_time_ticks == 0`) or schedule a `CastState`.
pub fn try_start_cast(world: &mut World, caster: EntityId, skill_id: SkillId, aim: CastAim, now: u64) -> Result<u64, CombatError> {
    if !can_act(world, caster, now) {
        return Err(CombatError::CcForbids);
    }

    let skills = world
        .get::<Skills>(caster)
        .map_err(|_| CombatError::InvalidTarget { reason: "caster has no Skills component" })?;
    if skills.current_cast.is_some() {
        return Err(CombatError::CastInProgress);
    }
    if skills.is_on_global_cooldown(now) {
        return Err(CombatError::OnGlobalCooldown { ready_tick: skills.global_cooldown_ready_tick });
    }
    let runtime = skills
        .known
        .get(&skill_id)
        .ok_or(CombatError::InvalidTarget { reason: "unknown skill" })?;
    if runtime.ready_tick > now {
        return Err(CombatError::OnCooldown { ready_tick: runtime.ready_tick });
    }
    let def = runtime.def;

    let health = world.get::<Health>(caster).map_err(|_| CombatError::InvalidTarget { reason: "caster has no Health" })?;
    if health.current_mp < def.resource_cost {
        return Err(CombatError::InsufficientResource {
            cost: def.resource_cost,
            available: health.current_mp,
        });
    }

    {
        let health = world.get_mut::<Health>(caster).unwrap();
        health.current_mp -= def.resource_cost;
    }
    let skills = world.get_mut::<Skills>(caster).unwrap();
    skills.start_cooldown(skill_id, now, GCD_TICKS);

    if def.cast_time_ticks > 0 {
        skills.current_cast = Some(CastState {
            skill_id,
            end_tick: now + def.cast_time_ticks,
            aim,
        });
    }

    Ok(def.cast_time_ticks)
}

/// Validates a targeted-mode cast's resolved target per spec.md §4.4:
/// alive, in range, in line of sight, and faction permits (not friendly).
/// Range and line-of-sight are skipped when either entity has no
/// `Transform`, or when `terrain` is unavailable — callers without zone
/// context (unit tests, action-mode resolution elsewhere) still get the
/// unconditional alive/faction checks.
fn validate_targeted_target(world: &World, caster: EntityId, target: EntityId, range: f32, terrain: Option<&TerrainMap>) -> Result<(), CombatError> {
    if world.get::<Health>(target).map(|h| h.dead).unwrap_or(false) {
        return Err(CombatError::InvalidTarget { reason: "target is dead" });
    }

    if let (Ok(caster_pos), Ok(target_pos)) = (
        world.get::<Transform>(caster).map(|t| t.position),
        world.get::<Transform>(target).map(|t| t.position),
    ) {
        if caster_pos.distance(target_pos) > range {
            return Err(CombatError::InvalidTarget { reason: "target out of range" });
        }
        if let Some(terrain) = terrain {
            if !terrain.line_of_sight(caster_pos, target_pos) {
                return Err(CombatError::InvalidTarget { reason: "target out of line of sight" });
            }
        }
    }

    if let Some(TargetType::Friendly) = world.get::<Target>(target).ok().and_then(|t| t.target_type) {
        return Err(CombatError::InvalidTarget { reason: "target is friendly" });
    }

    Ok(())
}

/// Sweeps casters whose cast has finished, resolving the skill and clearing
/// `current_cast`. Run in post-update.
pub fn finish_casts_system(world: &mut World, now: u64, rng: &mut impl Rng, terrain: Option<&TerrainMap>) {
    let due: Vec<(EntityId, SkillId, CastAim)> = world
        .iter::<Skills>()
        .filter_map(|(id, skills)| {
            skills.current_cast.and_then(|cast| {
                if cast.end_tick <= now {
                    Some((id, cast.skill_id, cast.aim))
                } else {
                    None
                }
            })
        })
        .collect();

    for (caster, skill_id, aim) in due {
        if let Ok(skills) = world.get_mut::<Skills>(caster) {
            skills.cancel_cast();
        }
        let _ = resolve_skill(world, caster, skill_id, aim, now, rng, terrain);
    }
}

/// Resolves a skill's effect against its delivery mode: targeted modes
/// resolve against a single entity, action modes query the spatial grid for
/// everyone within range/cone/radius.
pub fn resolve_skill(world: &mut World, caster: EntityId, skill_id: SkillId, aim: CastAim, now: u64, rng: &mut impl Rng, terrain: Option<&TerrainMap>) -> Result<Vec<EntityId>, CombatError> {
    let def = world
        .get::<Skills>(caster)
        .map_err(|_| CombatError::InvalidTarget { reason: "caster has no Skills component" })?
        .known
        .get(&skill_id)
        .ok_or(CombatError::InvalidTarget { reason: "unknown skill" })?
        .def;

    let mut hits = Vec::new();
    match def.delivery {
        SkillDelivery::Instant | SkillDelivery::Targeted | SkillDelivery::Channeled => {
            let target = match aim {
                CastAim::Target(id) => id,
                _ => world.get::<Target>(caster).ok().and_then(|t| t.current_target).ok_or(CombatError::InvalidTarget { reason: "no locked target" })?,
            };
            validate_targeted_target(world, caster, target, def.range, terrain)?;
            hits.push(target);
        }
        SkillDelivery::Skillshot | SkillDelivery::Area | SkillDelivery::MeleeSwing => {
            // Action-mode skills need a spatial grid supplied by the caller's
            // zone; the sim composition root is expected to call
            // `resolve_action_skill` directly instead when a grid is
            // available. Without one, fall back to the locked target only.
            if let Ok(t) = world.get::<Target>(caster) {
                if let Some(target) = t.current_target {
                    hits.push(target);
                }
            }
        }
    }

    let attacker_stats = combat_stats_or_default(world, caster);
    let mut resolved = Vec::new();
    for target in hits {
        let defender_stats = combat_stats_or_default(world, target);
        let out = resolve_damage(
            &attacker_stats,
            &defender_stats,
            DamageInput {
                base: def.base_damage,
                physical: def.physical,
                armor_reduction_factor: crate::apply::DEFAULT_ARMOR_REDUCTION_FACTOR,
                forced_crit: None,
            },
            rng,
        );
        if apply_damage_to(world, target, out.amount, def.physical, def.school, now).is_ok() {
            resolved.push(target);
        }
    }
    Ok(resolved)
}

/// Resolves an action-mode (skillshot/area/melee) skill against a spatial
/// grid directly, for callers that have zone context available.
pub fn resolve_action_skill(world: &mut World, caster: EntityId, skill_id: SkillId, origin: mmo_ecs::prelude::Vec3, dir_unit: (f32, f32), grid: &SpatialGrid, now: u64, rng: &mut impl Rng) -> Result<Vec<EntityId>, CombatError> {
    let def = world
        .get::<Skills>(caster)
        .map_err(|_| CombatError::InvalidTarget { reason: "caster has no Skills component" })?
        .known
        .get(&skill_id)
        .ok_or(CombatError::InvalidTarget { reason: "unknown skill" })?
        .def;

    let candidates = match def.delivery {
        SkillDelivery::Area => grid.entities_in_radius(origin, def.radius.max(def.range)),
        SkillDelivery::Skillshot => grid.entities_in_cone(origin, dir_unit, def.range, std::f32::consts::FRAC_PI_8),
        SkillDelivery::MeleeSwing => grid.entities_in_cone(origin, dir_unit, def.range, std::f32::consts::FRAC_PI_4),
        _ => return Err(CombatError::InvalidTarget { reason: "not an action-mode skill" }),
    };

    let attacker_stats = combat_stats_or_default(world, caster);
    let mut resolved = Vec::new();
    for target in candidates {
        if target == caster {
            continue;
        }
        let defender_stats = combat_stats_or_default(world, target);
        let out = resolve_damage(
            &attacker_stats,
            &defender_stats,
            DamageInput {
                base: def.base_damage,
                physical: def.physical,
                armor_reduction_factor: crate::apply::DEFAULT_ARMOR_REDUCTION_FACTOR,
                forced_crit: None,
            },
            rng,
        );
        if apply_damage_to(world, target, out.amount, def.physical, def.school, now).is_ok() {
            resolved.push(target);
        }
    }
    Ok(resolved)
}
