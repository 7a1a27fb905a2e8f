//! Uniform 2D grid spatial index. Cell membership is lazily updated: an
//! entity only moves cells when it crosses a cell boundary, gated by a
//! small movement threshold so jitter below that threshold is a no-op.

use mmo_ecs::prelude::{EntityId, Vec3};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundsMode {
    Clamp,
    Wrap,
}

#[derive(Clone, Copy, Debug)]
pub struct GridConfig {
    pub cell_size: f32,
    pub world_min: (f32, f32),
    pub world_max: (f32, f32),
    pub bounds_mode: BoundsMode,
    pub move_threshold: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 100.0,
            world_min: (-10_000.0, -10_000.0),
            world_max: (10_000.0, 10_000.0),
            bounds_mode: BoundsMode::Clamp,
            move_threshold: 0.1,
        }
    }
}

/// Result of inserting/updating a position against the grid's bounds.
#[derive(Debug, PartialEq)]
pub enum BoundsOutcome {
    Inside,
    Adjusted(Vec3),
    LeftGrid,
}

pub struct SpatialGrid {
    config: GridConfig,
    cells: HashMap<CellCoord, HashSet<EntityId>>,
    entity_cell: HashMap<EntityId, CellCoord>,
    entity_pos: HashMap<EntityId, Vec3>,
}

impl SpatialGrid {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            cells: HashMap::new(),
            entity_cell: HashMap::new(),
            entity_pos: HashMap::new(),
        }
    }

    fn cell_of(&self, pos: Vec3) -> CellCoord {
        CellCoord {
            x: (pos.x / self.config.cell_size).floor() as i32,
            y: (pos.y / self.config.cell_size).floor() as i32,
        }
    }

    fn apply_bounds(&self, pos: Vec3) -> (Vec3, BoundsOutcome) {
        let (min_x, min_y) = self.config.world_min;
        let (max_x, max_y) = self.config.world_max;
        let out_of_bounds = pos.x < min_x || pos.x > max_x || pos.y < min_y || pos.y > max_y;
        if !out_of_bounds {
            return (pos, BoundsOutcome::Inside);
        }
        match self.config.bounds_mode {
            BoundsMode::Clamp => {
                let clamped = Vec3::new(pos.x.clamp(min_x, max_x), pos.y.clamp(min_y, max_y), pos.z);
                (clamped, BoundsOutcome::Adjusted(clamped))
            }
            BoundsMode::Wrap => {
                let width = max_x - min_x;
                let height = max_y - min_y;
                let wrapped_x = min_x + (pos.x - min_x).rem_euclid(width);
                let wrapped_y = min_y + (pos.y - min_y).rem_euclid(height);
                let wrapped = Vec3::new(wrapped_x, wrapped_y, pos.z);
                (wrapped, BoundsOutcome::Adjusted(wrapped))
            }
        }
    }

    pub fn insert(&mut self, id: EntityId, pos: Vec3) -> BoundsOutcome {
        let (resolved, outcome) = self.apply_bounds(pos);
        let cell = self.cell_of(resolved);
        self.cells.entry(cell).or_default().insert(id);
        self.entity_cell.insert(id, cell);
        self.entity_pos.insert(id, resolved);
        outcome
    }

    pub fn remove(&mut self, id: EntityId) {
        if let Some(cell) = self.entity_cell.remove(&id) {
            if let Some(set) = self.cells.get_mut(&cell) {
                set.remove(&id);
                if set.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
        self.entity_pos.remove(&id);
    }

    /// Updates an entity's tracked position. No-op if movement is below the
    /// configured threshold and the cell would not change (the common
    /// case). In non-wrapping mode, a position that leaves the grid removes
    /// the entity and reports `LeftGrid` so the caller (movement system)
    /// can flag it.
    pub fn update(&mut self, id: EntityId, new_pos: Vec3) -> BoundsOutcome {
        if let Some(&old_pos) = self.entity_pos.get(&id) {
            if old_pos.distance(new_pos) < self.config.move_threshold {
                return BoundsOutcome::Inside;
            }
        }

        let (min_x, min_y) = self.config.world_min;
        let (max_x, max_y) = self.config.world_max;
        let out_of_bounds =
            new_pos.x < min_x || new_pos.x > max_x || new_pos.y < min_y || new_pos.y > max_y;
        if out_of_bounds && self.config.bounds_mode == BoundsMode::Clamp {
            self.remove(id);
            return BoundsOutcome::LeftGrid;
        }

        let (resolved, outcome) = self.apply_bounds(new_pos);
        let new_cell = self.cell_of(resolved);
        let old_cell = self.entity_cell.get(&id).copied();
        if old_cell != Some(new_cell) {
            if let Some(old_cell) = old_cell {
                if let Some(set) = self.cells.get_mut(&old_cell) {
                    set.remove(&id);
                    if set.is_empty() {
                        self.cells.remove(&old_cell);
                    }
                }
            }
            self.cells.entry(new_cell).or_default().insert(id);
            self.entity_cell.insert(id, new_cell);
        }
        self.entity_pos.insert(id, resolved);
        outcome
    }

    pub fn position_of(&self, id: EntityId) -> Option<Vec3> {
        self.entity_pos.get(&id).copied()
    }

    pub fn cell_of_entity(&self, id: EntityId) -> Option<CellCoord> {
        self.entity_cell.get(&id).copied()
    }

    fn cells_in_box(&self, min: (f32, f32), max: (f32, f32)) -> Vec<CellCoord> {
        let min_cell = CellCoord {
            x: (min.0 / self.config.cell_size).floor() as i32,
            y: (min.1 / self.config.cell_size).floor() as i32,
        };
        let max_cell = CellCoord {
            x: (max.0 / self.config.cell_size).floor() as i32,
            y: (max.1 / self.config.cell_size).floor() as i32,
        };
        let mut out = Vec::new();
        for cx in min_cell.x..=max_cell.x {
            for cy in min_cell.y..=max_cell.y {
                out.push(CellCoord { x: cx, y: cy });
            }
        }
        out
    }

    pub fn entities_in_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let bbox_min = (center.x - radius, center.y - radius);
        let bbox_max = (center.x + radius, center.y + radius);
        let r_sq = radius * radius;
        let mut out = Vec::new();
        for cell in self.cells_in_box(bbox_min, bbox_max) {
            if let Some(set) = self.cells.get(&cell) {
                for &id in set {
                    if let Some(pos) = self.entity_pos.get(&id) {
                        if center.distance_sq(*pos) <= r_sq {
                            out.push(id);
                        }
                    }
                }
            }
        }
        out
    }

    pub fn entities_in_box(&self, min: Vec3, max: Vec3) -> Vec<EntityId> {
        let mut out = Vec::new();
        for cell in self.cells_in_box((min.x, min.y), (max.x, max.y)) {
            if let Some(set) = self.cells.get(&cell) {
                for &id in set {
                    if let Some(pos) = self.entity_pos.get(&id) {
                        if pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y {
                            out.push(id);
                        }
                    }
                }
            }
        }
        out
    }

    pub fn entities_in_cone(&self, origin: Vec3, dir_unit: (f32, f32), range: f32, half_angle_rad: f32) -> Vec<EntityId> {
        let cos_half = half_angle_rad.cos();
        self.entities_in_radius(origin, range)
            .into_iter()
            .filter(|id| {
                let pos = self.entity_pos[id];
                let dx = pos.x - origin.x;
                let dy = pos.y - origin.y;
                let len = (dx * dx + dy * dy).sqrt();
                if len < f32::EPSILON {
                    return true;
                }
                let dot = (dx / len) * dir_unit.0 + (dy / len) * dir_unit.1;
                dot >= cos_half
            })
            .collect()
    }

    pub fn cell_size(&self) -> f32 {
        self.config.cell_size
    }

    #[cfg(test)]
    pub(crate) fn invariant_holds(&self) -> bool {
        for (&id, &cell) in &self.entity_cell {
            let in_cell = self.cells.get(&cell).map(|s| s.contains(&id)).unwrap_or(false);
            if !in_cell {
                return false;
            }
            for (other_cell, set) in &self.cells {
                if *other_cell != cell && set.contains(&id) {
                    return false;
                }
            }
        }
        true
    }
}
