//! Projectile travel and hit resolution: advances every live projectile by
//! `dt`, checks the spatial grid for entities within `radius` of its current
//! position, applies damage to the first (or, for piercing shots, every)
//! unvisited target, and despawns on range expiry or first non-piercing hit.

use crate::apply::{apply_damage_to, combat_stats_or_default};
use crate::damage::{resolve_damage, DamageInput};
use mmo_ecs::prelude::{EntityId, Projectile, Transform, World};
use mmo_spatial::prelude::SpatialGrid;
use rand::Rng;

pub struct ProjectileHit {
    pub projectile_owner: EntityId,
    pub target: EntityId,
    pub amount: f32,
}

/// Advances and resolves every `Projectile` in the world against `grid`,
/// mutating each projectile's `Transform` and `hit_set`, despawning spent
/// ones via the command buffer. Intended for the update stage, after the
/// movement system has placed the grid's positions for this tick.
pub fn tick_projectiles(world: &mut World, grid: &SpatialGrid, dt: f64, now: u64, rng: &mut impl Rng) -> Vec<ProjectileHit> {
    let ids: Vec<EntityId> = world.iter::<Projectile>().map(|(id, _)| id).collect();
    let mut hits = Vec::new();

    for id in ids {
        let Some(mut position) = world.get::<Transform>(id).map(|t| t.position) else {
            continue;
        };
        let Ok(projectile) = world.get_mut::<Projectile>(id) else {
            continue;
        };
        projectile.advance(dt as f32, &mut position);
        let expired = projectile.has_expired();
        let owner = projectile.owner;
        let piercing = projectile.piercing;
        let radius = projectile.radius;
        let physical = projectile.physical;
        let school = projectile.school;
        let damage = projectile.damage;
        let already_hit = projectile.hit_set.clone();

        if let Ok(transform) = world.get_mut::<Transform>(id) {
            transform.position = position;
        }

        let candidates = grid.entities_in_radius(position, radius);
        let mut despawn = expired;
        let attacker_stats = combat_stats_or_default(world, owner);

        for target in candidates {
            if target == owner || already_hit.contains(&target) {
                continue;
            }
            let defender_stats = combat_stats_or_default(world, target);
            let out = resolve_damage(
                &attacker_stats,
                &defender_stats,
                DamageInput {
                    base: damage,
                    physical,
                    armor_reduction_factor: crate::apply::DEFAULT_ARMOR_REDUCTION_FACTOR,
                    forced_crit: None,
                },
                rng,
            );
            if apply_damage_to(world, target, out.amount, physical, school, now).is_ok() {
                hits.push(ProjectileHit {
                    projectile_owner: owner,
                    target,
                    amount: out.amount,
                });
                if let Ok(p) = world.get_mut::<Projectile>(id) {
                    p.hit_set.insert(target);
                }
                if !piercing {
                    despawn = true;
                    break;
                }
            }
        }

        if despawn {
            world.command_buffer.destroy(id);
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_ecs::prelude::{CombatStats, DamageSchool, Health, Vec3};
    use mmo_spatial::prelude::GridConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    fn stats() -> CombatStats {
        CombatStats {
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
        }
    }

    #[test]
    fn projectile_hits_target_in_radius_and_despawns() {
        let mut world = World::new();
        let owner = world.create();
        let target = world.create();
        world.add(owner, stats()).unwrap();
        world.add(target, stats()).unwrap();
        world.add(target, Health::new(100, 0)).unwrap();

        let mut grid = SpatialGrid::new(GridConfig::default());
        grid.insert(target, Vec3::new(20.0, 0.0, 0.0));

        let projectile_id = world.create();
        world
            .add(
                projectile_id,
                Transform {
                    position: Vec3::ZERO,
                    facing: 0.0,
                    zone_id: 1,
                },
            )
            .unwrap();
        world
            .add(
                projectile_id,
                Projectile {
                    owner,
                    velocity: Vec3::new(20.0, 0.0, 0.0),
                    speed: 20.0,
                    range: 100.0,
                    traveled: 0.0,
                    damage: 30.0,
                    radius: 5.0,
                    physical: true,
                    school: DamageSchool::Physical,
                    piercing: false,
                    skill_id: 1,
                    hit_set: HashSet::new(),
                },
            )
            .unwrap();

        let mut rng = Pcg32::seed_from_u64(0);
        let hits = tick_projectiles(&mut world, &grid, 1.0, 0, &mut rng);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, target);
        assert!(world.get::<Health>(target).unwrap().current_hp < 100);
        world.apply_deferred();
        assert!(!world.is_alive(projectile_id));
    }
}
