//! Builds the periodic perception snapshot an NPC's decision tick reads:
//! enemies/allies/neutrals in aggro radius, highest-threat target, and
//! distances/health-percent used by leaf actions.

use mmo_ecs::prelude::{Ai, EntityId, Health, PerceptionSnapshot, Target, TargetType, Threat, World};
use mmo_spatial::prelude::SpatialGrid;

/// Design constant: perception refresh cadence, independent of the tick
/// step so aggro scanning does not run every single tick.
pub const PERCEPTION_REFRESH_TICKS: u64 = 4; // ~200ms at 20Hz
pub const DECISION_TICKS: u64 = 2; // ~100ms at 20Hz

pub fn should_refresh_perception(ai: &Ai, now: u64) -> bool {
    now.saturating_sub(ai.last_perception_tick) >= PERCEPTION_REFRESH_TICKS
}

pub fn should_run_decision(ai: &Ai, now: u64) -> bool {
    now.saturating_sub(ai.last_decision_tick) >= DECISION_TICKS
}

/// Rebuilds `self_id`'s perception snapshot from the spatial grid and the
/// world's combat components, classifying everyone within `aggro_range` by
/// target-type relation. Does not mutate `Ai`; the caller assigns the
/// result and stamps `last_perception_tick`.
pub fn build_perception(world: &World, grid: &SpatialGrid, self_id: EntityId, now: u64) -> PerceptionSnapshot {
    let mut snapshot = PerceptionSnapshot::default();

    let Some(ai) = world.get::<Ai>(self_id).ok() else {
        return snapshot;
    };
    let Some(position) = grid.position_of(self_id) else {
        return snapshot;
    };

    snapshot.distance_to_spawn = position.distance(ai.spawn_position);

    for nearby in grid.entities_in_radius(position, ai.aggro_range) {
        if nearby == self_id {
            continue;
        }
        let Some(relation) = world.get::<Target>(nearby).ok().and_then(|t| t.target_type) else {
            snapshot.neutrals.push(nearby);
            continue;
        };
        match relation {
            TargetType::Hostile => snapshot.enemies.push(nearby),
            TargetType::Friendly => snapshot.allies.push(nearby),
            TargetType::Neutral => snapshot.neutrals.push(nearby),
        }
    }

    if let Ok(threat) = world.get::<Threat>(self_id) {
        if let Some(target) = threat.current_target(now) {
            snapshot.highest_threat_target = Some(target);
            snapshot.highest_threat_value = threat.table.get(&target).map(|e| e.effective(now)).unwrap_or(0.0);
        }
    }

    if let Ok(health) = world.get::<Health>(self_id) {
        snapshot.hp_pct = if health.max_hp > 0 { health.current_hp as f32 / health.max_hp as f32 } else { 0.0 };
        snapshot.mp_pct = if health.max_mp > 0 { health.current_mp as f32 / health.max_mp as f32 } else { 0.0 };
    }

    snapshot.distance_to_leader = world
        .get::<Ai>(self_id)
        .ok()
        .and_then(|ai| ai.memory.last_known_positions.values().next().copied())
        .map(|leader_pos| position.distance(leader_pos))
        .unwrap_or(f32::INFINITY);

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_ecs::prelude::{BehaviorTreeId, Vec3};
    use mmo_spatial::prelude::GridConfig;

    #[test]
    fn perception_classifies_nearby_entities_by_target_type() {
        let mut world = World::new();
        let me = world.create();
        let enemy = world.create();
        let ally = world.create();
        world.add(me, Ai::new(BehaviorTreeId(1), Vec3::ZERO, 50.0, 100.0)).unwrap();
        world.add(enemy, Target { target_type: Some(TargetType::Hostile), ..Target::new() }).unwrap();
        world.add(ally, Target { target_type: Some(TargetType::Friendly), ..Target::new() }).unwrap();

        let mut grid = SpatialGrid::new(GridConfig::default());
        grid.insert(me, Vec3::ZERO);
        grid.insert(enemy, Vec3::new(10.0, 0.0, 0.0));
        grid.insert(ally, Vec3::new(-10.0, 0.0, 0.0));

        let snap = build_perception(&world, &grid, me, 0);
        assert_eq!(snap.enemies, vec![enemy]);
        assert_eq!(snap.allies, vec![ally]);
    }

    #[test]
    fn refresh_and_decision_cadences_gate_on_elapsed_ticks() {
        let ai = Ai::new(BehaviorTreeId(1), Vec3::ZERO, 50.0, 100.0);
        assert!(!should_refresh_perception(&ai, 1));
        assert!(should_refresh_perception(&ai, 4));
        assert!(!should_run_decision(&ai, 1));
        assert!(should_run_decision(&ai, 2));
    }
}
