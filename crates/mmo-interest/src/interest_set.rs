//! Per-observer visibility set maintained from the spatial index: refreshing
//! an observer's set against the current grid yields the entities that
//! entered and left its interest radius since the last refresh.

use mmo_ecs::prelude::EntityId;
use mmo_spatial::prelude::SpatialGrid;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Default)]
pub struct InterestDelta {
    pub entered: Vec<EntityId>,
    pub left: Vec<EntityId>,
}

impl InterestDelta {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

fn diff(previous: &HashSet<EntityId>, current: &HashSet<EntityId>) -> InterestDelta {
    InterestDelta {
        entered: current.difference(previous).copied().collect(),
        left: previous.difference(current).copied().collect(),
    }
}

/// Owns every observer's current visibility set; `mmo-sim` calls
/// `refresh` once per observer per interest-refresh cadence (not
/// necessarily every tick, matching the AI perception cadence).
#[derive(Default)]
pub struct InterestManager {
    pub radius: f32,
    sets: HashMap<EntityId, HashSet<EntityId>>,
}

impl InterestManager {
    pub fn new(radius: f32) -> Self {
        Self { radius, sets: HashMap::new() }
    }

    pub fn current_set(&self, observer: EntityId) -> Option<&HashSet<EntityId>> {
        self.sets.get(&observer)
    }

    pub fn refresh(&mut self, grid: &SpatialGrid, observer: EntityId) -> InterestDelta {
        let Some(position) = grid.position_of(observer) else {
            let previous = self.sets.remove(&observer).unwrap_or_default();
            return InterestDelta { entered: Vec::new(), left: previous.into_iter().collect() };
        };
        let current: HashSet<EntityId> = grid
            .entities_in_radius(position, self.radius)
            .into_iter()
            .filter(|&e| e != observer)
            .collect();
        let previous = self.sets.get(&observer).cloned().unwrap_or_default();
        let delta = diff(&previous, &current);
        self.sets.insert(observer, current);
        delta
    }

    pub fn drop_observer(&mut self, observer: EntityId) {
        self.sets.remove(&observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_ecs::prelude::Vec3;
    use mmo_spatial::prelude::GridConfig;

    #[test]
    fn refresh_reports_entered_entities_on_first_pass() {
        let mut grid = SpatialGrid::new(GridConfig::default());
        let observer = EntityId::new(1, 0);
        let other = EntityId::new(2, 0);
        grid.insert(observer, Vec3::ZERO);
        grid.insert(other, Vec3::new(5.0, 0.0, 0.0));

        let mut manager = InterestManager::new(50.0);
        let delta = manager.refresh(&grid, observer);
        assert_eq!(delta.entered, vec![other]);
        assert!(delta.left.is_empty());
    }

    #[test]
    fn refresh_reports_left_when_entity_moves_out_of_radius() {
        let mut grid = SpatialGrid::new(GridConfig::default());
        let observer = EntityId::new(1, 0);
        let other = EntityId::new(2, 0);
        grid.insert(observer, Vec3::ZERO);
        grid.insert(other, Vec3::new(5.0, 0.0, 0.0));

        let mut manager = InterestManager::new(50.0);
        manager.refresh(&grid, observer);

        grid.remove(other);
        grid.insert(other, Vec3::new(1000.0, 0.0, 0.0));
        let delta = manager.refresh(&grid, observer);
        assert_eq!(delta.left, vec![other]);
        assert!(delta.entered.is_empty());
    }

    #[test]
    fn unchanged_neighborhood_yields_empty_delta() {
        let mut grid = SpatialGrid::new(GridConfig::default());
        let observer = EntityId::new(1, 0);
        grid.insert(observer, Vec3::ZERO);

        let mut manager = InterestManager::new(50.0);
        manager.refresh(&grid, observer);
        let delta = manager.refresh(&grid, observer);
        assert!(delta.is_empty());
    }
}
