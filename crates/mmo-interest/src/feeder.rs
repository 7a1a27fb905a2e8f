//! Translates an `InterestDelta` plus the current component state into the
//! feed of per-observer updates `mmo-net` wraps into outbound wire events.
//! Entered entities get a full spawn snapshot; left entities get a despawn;
//! everything still visible gets its position/health/resource deltas.

use crate::interest_set::InterestDelta;
use mmo_ecs::prelude::{EntityId, Health, Transform, Vec3, World};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ObserverUpdate {
    Spawn { entity: EntityId, position: Vec3 },
    Despawn { entity: EntityId },
    Position { entity: EntityId, position: Vec3 },
    Health { entity: EntityId, current_hp: i32, max_hp: i32 },
    Resource { entity: EntityId, current_mp: i32, max_mp: i32 },
}

/// Builds the full set of updates an observer's client needs this refresh:
/// spawns for newly-entered entities, despawns for ones that left, and
/// fresh position/health/resource deltas for everything still visible.
pub fn build_updates(world: &World, delta: &InterestDelta, still_visible: &[EntityId]) -> Vec<ObserverUpdate> {
    let mut updates = Vec::with_capacity(delta.entered.len() + delta.left.len() + still_visible.len() * 2);

    for &entity in &delta.entered {
        if let Ok(transform) = world.get::<Transform>(entity) {
            updates.push(ObserverUpdate::Spawn { entity, position: transform.position });
        }
    }

    for &entity in &delta.left {
        updates.push(ObserverUpdate::Despawn { entity });
    }

    for &entity in still_visible {
        if let Ok(transform) = world.get::<Transform>(entity) {
            updates.push(ObserverUpdate::Position { entity, position: transform.position });
        }
        if let Ok(health) = world.get::<Health>(entity) {
            updates.push(ObserverUpdate::Health { entity, current_hp: health.current_hp, max_hp: health.max_hp });
            updates.push(ObserverUpdate::Resource { entity, current_mp: health.current_mp, max_mp: health.max_mp });
        }
    }

    updates
}
