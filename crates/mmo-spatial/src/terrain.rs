//! Per-zone terrain collision map and movement validation.

use mmo_ecs::prelude::{MovementFlags, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainType {
    Open,
    Water,
    Lava,
    Blocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageKind {
    None,
    Fire,
    Poison,
}

/// Authored offline as a per-zone terrain file and loaded at startup
/// alongside `SimConfig`; `TerrainMap` itself stays runtime-only state
/// (dynamic obstacles are not part of the authored data).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TerrainCell {
    pub terrain_type: TerrainType,
    pub movement_modifier: f32,
    pub height: f32,
    pub required_flags: MovementFlags,
    pub damage_per_sec: f32,
    pub damage_kind: DamageKind,
}

impl Default for TerrainCell {
    fn default() -> Self {
        Self {
            terrain_type: TerrainType::Open,
            movement_modifier: 1.0,
            height: 0.0,
            required_flags: MovementFlags::empty(),
            damage_per_sec: 0.0,
            damage_kind: DamageKind::None,
        }
    }
}

/// Design cap on walkable slope between adjacent cells.
pub const MAX_SLOPE_DEGREES: f32 = 45.0;

pub struct TerrainMap {
    pub cell_size: f32,
    width: i32,
    height: i32,
    cells: Vec<TerrainCell>,
    dynamic_obstacles: HashSet<(i32, i32)>,
}

impl TerrainMap {
    pub fn new(width: i32, height: i32, cell_size: f32) -> Self {
        Self {
            cell_size,
            width,
            height,
            cells: vec![TerrainCell::default(); (width * height).max(0) as usize],
            dynamic_obstacles: HashSet::new(),
        }
    }

    fn index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx < 0 || cy < 0 || cx >= self.width || cy >= self.height {
            None
        } else {
            Some((cy * self.width + cx) as usize)
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn world_to_cell(&self, pos: Vec3) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    pub fn set_cell(&mut self, cx: i32, cy: i32, cell: TerrainCell) {
        if let Some(i) = self.index(cx, cy) {
            self.cells[i] = cell;
        }
    }

    pub fn cell(&self, cx: i32, cy: i32) -> Option<&TerrainCell> {
        self.index(cx, cy).map(|i| &self.cells[i])
    }

    pub fn set_dynamic_obstacle(&mut self, cx: i32, cy: i32, blocked: bool) {
        if blocked {
            self.dynamic_obstacles.insert((cx, cy));
        } else {
            self.dynamic_obstacles.remove(&(cx, cy));
        }
    }

    pub fn is_blocked(&self, cx: i32, cy: i32) -> bool {
        if self.dynamic_obstacles.contains(&(cx, cy)) {
            return true;
        }
        match self.cell(cx, cy) {
            Some(cell) => cell.terrain_type == TerrainType::Blocked,
            None => true,
        }
    }

    fn passes_flag_requirements(&self, cell: &TerrainCell, entity_flags: MovementFlags) -> bool {
        if entity_flags.contains(MovementFlags::GHOST) {
            return true;
        }
        entity_flags.contains(cell.required_flags)
    }

    /// `can_move`: destination validity + flag requirements + slope cap +
    /// intermediate-cell sampling for long steps, with dynamic obstacles
    /// consulted last.
    pub fn can_move(&self, from: Vec3, to: Vec3, entity_flags: MovementFlags) -> bool {
        if entity_flags.contains(MovementFlags::GHOST) {
            return true;
        }

        let (tx, ty) = self.world_to_cell(to);
        if self.is_blocked(tx, ty) {
            return false;
        }
        let dest_cell = match self.cell(tx, ty) {
            Some(c) => c,
            None => return false,
        };
        if !self.passes_flag_requirements(dest_cell, entity_flags) {
            return false;
        }

        let (fx, fy) = self.world_to_cell(from);
        if let Some(src_cell) = self.cell(fx, fy) {
            let slope = (dest_cell.height - src_cell.height).atan2(self.cell_size).to_degrees().abs();
            if slope > MAX_SLOPE_DEGREES {
                return false;
            }
        }

        let distance = from.distance(to);
        let steps = (distance / self.cell_size).ceil().max(1.0) as i32;
        for step in 1..steps {
            let t = step as f32 / steps as f32;
            let sample = Vec3::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t, 0.0);
            let (sx, sy) = self.world_to_cell(sample);
            if self.is_blocked(sx, sy) {
                return false;
            }
            if let Some(cell) = self.cell(sx, sy) {
                if !self.passes_flag_requirements(cell, entity_flags) {
                    return false;
                }
            }
        }

        true
    }

    /// Spiral outward by cell ring to find the nearest walkable cell.
    pub fn nearest_walkable(&self, pos: Vec3, max_radius_cells: i32) -> Option<Vec3> {
        let (cx, cy) = self.world_to_cell(pos);
        if !self.is_blocked(cx, cy) {
            return Some(pos);
        }
        for r in 1..=max_radius_cells {
            for dx in -r..=r {
                for dy in -r..=r {
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    let (nx, ny) = (cx + dx, cy + dy);
                    if !self.is_blocked(nx, ny) {
                        return Some(Vec3::new(
                            (nx as f32 + 0.5) * self.cell_size,
                            (ny as f32 + 0.5) * self.cell_size,
                            0.0,
                        ));
                    }
                }
            }
        }
        None
    }

    /// Bresenham grid traversal; returns false on the first blocked cell.
    pub fn line_of_sight(&self, a: Vec3, b: Vec3) -> bool {
        let (mut x0, mut y0) = self.world_to_cell(a);
        let (x1, y1) = self.world_to_cell(b);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if self.is_blocked(x0, y0) {
                return false;
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with_blocked_column(blocked_x: i32) -> TerrainMap {
        let mut map = TerrainMap::new(20, 20, 1.0);
        for y in 0..20 {
            map.set_cell(
                blocked_x,
                y,
                TerrainCell {
                    terrain_type: TerrainType::Blocked,
                    ..TerrainCell::default()
                },
            );
        }
        map
    }

    #[test]
    fn can_move_rejects_blocked_destination() {
        let map = map_with_blocked_column(5);
        let from = Vec3::new(0.5, 0.5, 0.0);
        let to = Vec3::new(5.5, 0.5, 0.0);
        assert!(!map.can_move(from, to, MovementFlags::empty()));
    }

    #[test]
    fn ghost_bypasses_all_terrain() {
        let map = map_with_blocked_column(5);
        let from = Vec3::new(0.5, 0.5, 0.0);
        let to = Vec3::new(5.5, 0.5, 0.0);
        assert!(map.can_move(from, to, MovementFlags::GHOST));
    }

    #[test]
    fn flag_requirement_blocks_unflagged_entity() {
        let mut map = TerrainMap::new(5, 5, 1.0);
        map.set_cell(
            2,
            2,
            TerrainCell {
                terrain_type: TerrainType::Water,
                required_flags: MovementFlags::SWIM,
                ..TerrainCell::default()
            },
        );
        let from = Vec3::new(2.5, 1.5, 0.0);
        let to = Vec3::new(2.5, 2.5, 0.0);
        assert!(!map.can_move(from, to, MovementFlags::empty()));
        assert!(map.can_move(from, to, MovementFlags::SWIM));
    }

    #[test]
    fn nearest_walkable_spirals_outward() {
        let map = map_with_blocked_column(5);
        let pos = Vec3::new(5.5, 5.5, 0.0);
        let found = map.nearest_walkable(pos, 3).unwrap();
        let (cx, _) = map.world_to_cell(found);
        assert_ne!(cx, 5);
    }

    #[test]
    fn line_of_sight_blocked_by_wall() {
        let map = map_with_blocked_column(5);
        assert!(!map.line_of_sight(Vec3::new(0.5, 0.5, 0.0), Vec3::new(10.5, 0.5, 0.0)));
    }

    #[test]
    fn line_of_sight_clear_path() {
        let map = TerrainMap::new(10, 10, 1.0);
        assert!(map.line_of_sight(Vec3::new(0.5, 0.5, 0.0), Vec3::new(8.5, 8.5, 0.0)));
    }

    #[test]
    fn dynamic_obstacle_blocks_movement() {
        let mut map = TerrainMap::new(10, 10, 1.0);
        map.set_dynamic_obstacle(3, 3, true);
        assert!(map.is_blocked(3, 3));
        map.set_dynamic_obstacle(3, 3, false);
        assert!(!map.is_blocked(3, 3));
    }
}
