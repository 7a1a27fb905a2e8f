//! Advances an entity along a resolved waypoint list, emitting
//! `PathComplete` when the last waypoint is reached within threshold.

use mmo_ecs::prelude::{EntityId, Movement, Transform, Vec3, World};

#[derive(Clone, Debug, Default)]
pub struct PathFollower {
    pub waypoints: Vec<Vec3>,
    pub index: usize,
    pub waypoint_threshold: f32,
}

impl PathFollower {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints, index: 0, waypoint_threshold: 1.0 }
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.waypoints.len()
    }

    pub fn current_target(&self) -> Option<Vec3> {
        self.waypoints.get(self.index).copied()
    }
}

pub enum FollowOutcome {
    Following,
    AdvancedWaypoint,
    PathComplete,
    NoActivePath,
}

/// Steers `entity`'s `Movement.velocity` toward the follower's current
/// waypoint at `speed_cap`, advancing the index when within threshold.
pub fn advance_follower(world: &mut World, entity: EntityId, follower: &mut PathFollower, speed_cap: f32) -> FollowOutcome {
    let Some(target) = follower.current_target() else {
        return FollowOutcome::NoActivePath;
    };
    let Ok(position) = world.get::<Transform>(entity).map(|t| t.position) else {
        return FollowOutcome::NoActivePath;
    };

    let mut outcome = FollowOutcome::Following;
    if position.distance(target) <= follower.waypoint_threshold {
        follower.index += 1;
        outcome = if follower.is_complete() { FollowOutcome::PathComplete } else { FollowOutcome::AdvancedWaypoint };
    }

    if let Ok(movement) = world.get_mut::<Movement>(entity) {
        if let Some(next_target) = follower.current_target() {
            let dx = next_target.x - position.x;
            let dy = next_target.y - position.y;
            let len = (dx * dx + dy * dy).sqrt();
            if len > f32::EPSILON {
                movement.velocity = Vec3::new(dx / len * speed_cap, dy / len * speed_cap, 0.0);
            } else {
                movement.velocity = Vec3::ZERO;
            }
        } else {
            movement.velocity = Vec3::ZERO;
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_ecs::prelude::MovementFlags;

    #[test]
    fn follower_advances_waypoint_within_threshold() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, Transform { position: Vec3::new(0.0, 0.0, 0.0), facing: 0.0, zone_id: 1 }).unwrap();
        world.add(id, Movement { velocity: Vec3::ZERO, speed_cap: 5.0, flags: MovementFlags::empty() }).unwrap();
        let mut follower = PathFollower::new(vec![Vec3::new(0.5, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)]);
        follower.waypoint_threshold = 1.0;

        let outcome = advance_follower(&mut world, id, &mut follower, 5.0);
        assert!(matches!(outcome, FollowOutcome::AdvancedWaypoint));
        assert_eq!(follower.index, 1);
    }

    #[test]
    fn follower_reports_completion_on_last_waypoint() {
        let mut world = World::new();
        let id = world.create();
        world.add(id, Transform { position: Vec3::new(9.5, 0.0, 0.0), facing: 0.0, zone_id: 1 }).unwrap();
        world.add(id, Movement { velocity: Vec3::ZERO, speed_cap: 5.0, flags: MovementFlags::empty() }).unwrap();
        let mut follower = PathFollower::new(vec![Vec3::new(10.0, 0.0, 0.0)]);

        let outcome = advance_follower(&mut world, id, &mut follower, 5.0);
        assert!(matches!(outcome, FollowOutcome::PathComplete));
    }
}
