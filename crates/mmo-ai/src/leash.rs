//! Aggro-range and leash-range state transitions: entities beyond
//! `aggro_range` are invisible for engagement purposes, and an in-combat
//! entity that drifts beyond `leash_range` from its spawn point gives up
//! and returns home, healing to full once it arrives.

use mmo_ecs::prelude::{Ai, AiState, EntityId, Health, Target, Transform, World};

/// Distance within which the entity is considered "home" and the return
/// trip ends.
const RETURN_ARRIVAL_THRESHOLD: f32 = 2.0;

/// Called once per decision tick after perception has been refreshed.
/// Drives the `Combat -> Returning -> Idle` transition and the reverse
/// `Idle/Patrol -> Combat` transition driven by perceived enemies.
pub fn update_leash_state(world: &mut World, entity: EntityId) {
    let Some(position) = world.get::<Transform>(entity).ok().map(|t| t.position) else {
        return;
    };

    let (state, distance_to_spawn, has_enemy, spawn_position) = {
        let Ok(ai) = world.get::<Ai>(entity) else { return };
        let has_enemy = !ai.perception.enemies.is_empty() || ai.perception.highest_threat_target.is_some();
        (ai.state, position.distance(ai.spawn_position), has_enemy, ai.spawn_position)
    };

    match state {
        AiState::Combat if distance_to_spawn > leash_range(world, entity) => {
            begin_return(world, entity);
        }
        AiState::Returning => {
            if position.distance(spawn_position) <= RETURN_ARRIVAL_THRESHOLD {
                complete_return(world, entity);
            }
        }
        AiState::Idle | AiState::Patrol | AiState::Alert if has_enemy => {
            if let Ok(ai) = world.get_mut::<Ai>(entity) {
                ai.state = AiState::Combat;
            }
        }
        _ => {}
    }
}

fn leash_range(world: &World, entity: EntityId) -> f32 {
    world.get::<Ai>(entity).map(|ai| ai.leash_range).unwrap_or(f32::INFINITY)
}

fn begin_return(world: &mut World, entity: EntityId) {
    if let Ok(ai) = world.get_mut::<Ai>(entity) {
        ai.state = AiState::Returning;
    }
    if let Ok(target) = world.get_mut::<Target>(entity) {
        target.clear_target();
    }
}

fn complete_return(world: &mut World, entity: EntityId) {
    if let Ok(ai) = world.get_mut::<Ai>(entity) {
        ai.state = AiState::Idle;
    }
    if let Ok(health) = world.get_mut::<Health>(entity) {
        health.current_hp = health.max_hp;
        health.current_mp = health.max_mp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_ecs::prelude::{BehaviorTreeId, Vec3};

    fn make_npc(world: &mut World, spawn: Vec3, leash: f32) -> EntityId {
        let id = world.create();
        world.add(id, Transform { position: spawn, facing: 0.0, zone_id: 1 }).unwrap();
        world.add(id, Ai::new(BehaviorTreeId(1), spawn, 30.0, leash)).unwrap();
        world.add(id, Health::new(100, 0)).unwrap();
        world.get_mut::<Health>(id).unwrap().current_hp = 10;
        world.add(id, Target::new()).unwrap();
        id
    }

    #[test]
    fn combat_npc_beyond_leash_begins_returning() {
        let mut world = World::new();
        let id = make_npc(&mut world, Vec3::ZERO, 20.0);
        world.get_mut::<Ai>(id).unwrap().state = AiState::Combat;
        world.get_mut::<Transform>(id).unwrap().position = Vec3::new(25.0, 0.0, 0.0);

        update_leash_state(&mut world, id);
        assert_eq!(world.get::<Ai>(id).unwrap().state, AiState::Returning);
    }

    #[test]
    fn returning_npc_heals_to_full_on_arrival() {
        let mut world = World::new();
        let id = make_npc(&mut world, Vec3::ZERO, 20.0);
        world.get_mut::<Ai>(id).unwrap().state = AiState::Returning;
        world.get_mut::<Transform>(id).unwrap().position = Vec3::new(1.0, 0.0, 0.0);

        update_leash_state(&mut world, id);
        let ai = world.get::<Ai>(id).unwrap();
        assert_eq!(ai.state, AiState::Idle);
        let health = world.get::<Health>(id).unwrap();
        assert_eq!(health.current_hp, health.max_hp);
    }

    #[test]
    fn idle_npc_with_perceived_enemy_enters_combat() {
        let mut world = World::new();
        let id = make_npc(&mut world, Vec3::ZERO, 20.0);
        let enemy = world.create();
        world.get_mut::<Ai>(id).unwrap().perception.enemies.push(enemy);

        update_leash_state(&mut world, id);
        assert_eq!(world.get::<Ai>(id).unwrap().state, AiState::Combat);
    }
}
