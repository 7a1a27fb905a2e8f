//! A* pathfinding over a zone's terrain map: 8-directional, corner-cut
//! prevention, Euclidean heuristic, step cost `1` orthogonal / `sqrt(2)`
//! diagonal scaled by the destination cell's terrain modifier. Exposes both
//! a synchronous call (small paths, NPC repath) and a request-queue API so
//! the tick thread is never blocked on a large search.

use crate::error::AiError;
use mmo_ecs::prelude::{MovementFlags, Vec3};
use mmo_spatial::prelude::TerrainMap;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Cell {
    x: i32,
    y: i32,
}

const NEIGHBORS: [(i32, i32); 8] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Copy, Clone, PartialEq)]
struct ScoredCell {
    cell: Cell,
    f_score: f32,
}

impl Eq for ScoredCell {}

impl Ord for ScoredCell {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap via reversed partial_cmp; NaN is never produced since
        // every contributing score is finite.
        other.f_score.partial_cmp(&self.f_score).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ScoredCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(a: Cell, b: Cell) -> f32 {
    (((a.x - b.x).pow(2) + (a.y - b.y).pow(2)) as f32).sqrt()
}

fn step_cost(dx: i32, dy: i32, terrain_modifier: f32) -> f32 {
    let base = if dx != 0 && dy != 0 { std::f32::consts::SQRT_2 } else { 1.0 };
    base * terrain_modifier
}

fn walkable(map: &TerrainMap, cell: Cell, flags: MovementFlags) -> bool {
    if map.is_blocked(cell.x, cell.y) {
        return false;
    }
    match map.cell(cell.x, cell.y) {
        Some(c) => flags.contains(MovementFlags::GHOST) || flags.contains(c.required_flags),
        None => false,
    }
}

/// Runs A* from `start` to `goal` (world coordinates), returning a waypoint
/// list in world coordinates including the goal but not necessarily the
/// start. `Err(NoPathFound)` if the goal is unreachable.
pub fn find_path(map: &TerrainMap, start: Vec3, goal: Vec3, flags: MovementFlags) -> Result<Vec<Vec3>, AiError> {
    let (sx, sy) = map.world_to_cell(start);
    let (gx, gy) = map.world_to_cell(goal);
    let start_cell = Cell { x: sx, y: sy };
    let goal_cell = Cell { x: gx, y: gy };

    if !walkable(map, goal_cell, flags) {
        return Err(AiError::NoPathFound);
    }

    let mut open = BinaryHeap::new();
    open.push(ScoredCell { cell: start_cell, f_score: heuristic(start_cell, goal_cell) });
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, f32> = HashMap::new();
    g_score.insert(start_cell, 0.0);

    while let Some(ScoredCell { cell: current, .. }) = open.pop() {
        if current == goal_cell {
            return Ok(reconstruct_path(map, &came_from, current));
        }

        for &(dx, dy) in &NEIGHBORS {
            let neighbor = Cell { x: current.x + dx, y: current.y + dy };
            if !walkable(map, neighbor, flags) {
                continue;
            }
            // Corner-cut prevention: a diagonal step requires both
            // orthogonal neighbors to be walkable too.
            if dx != 0 && dy != 0 {
                let ortho_a = Cell { x: current.x + dx, y: current.y };
                let ortho_b = Cell { x: current.x, y: current.y + dy };
                if !walkable(map, ortho_a, flags) || !walkable(map, ortho_b, flags) {
                    continue;
                }
            }

            let terrain_modifier = map.cell(neighbor.x, neighbor.y).map(|c| c.movement_modifier).unwrap_or(1.0);
            let tentative_g = g_score.get(&current).copied().unwrap_or(f32::INFINITY) + step_cost(dx, dy, terrain_modifier);

            if tentative_g < g_score.get(&neighbor).copied().unwrap_or(f32::INFINITY) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g);
                open.push(ScoredCell {
                    cell: neighbor,
                    f_score: tentative_g + heuristic(neighbor, goal_cell),
                });
            }
        }
    }

    Err(AiError::NoPathFound)
}

fn cell_to_world(map: &TerrainMap, cell: Cell) -> Vec3 {
    Vec3::new((cell.x as f32 + 0.5) * map.cell_size, (cell.y as f32 + 0.5) * map.cell_size, 0.0)
}

fn reconstruct_path(map: &TerrainMap, came_from: &HashMap<Cell, Cell>, mut current: Cell) -> Vec<Vec3> {
    let mut path = vec![cell_to_world(map, current)];
    while let Some(&prev) = came_from.get(&current) {
        path.push(cell_to_world(map, prev));
        current = prev;
    }
    path.reverse();
    smooth_by_line_of_sight(map, path)
}

/// Collapses collinear/LOS-clear runs of waypoints down to the turn points,
/// so a follower does not hug the grid on long open stretches.
fn smooth_by_line_of_sight(map: &TerrainMap, path: Vec<Vec3>) -> Vec<Vec3> {
    if path.len() <= 2 {
        return path;
    }
    let mut smoothed = vec![path[0]];
    let mut anchor = 0;
    let mut probe = 2;
    while probe < path.len() {
        if !map.line_of_sight(path[anchor], path[probe]) {
            smoothed.push(path[probe - 1]);
            anchor = probe - 1;
        }
        probe += 1;
    }
    smoothed.push(*path.last().unwrap());
    smoothed
}

/// A queued async pathfinding request, drained on the pathfinder pool's own
/// cadence rather than inline on the tick thread.
pub struct PathRequest {
    pub request_id: u64,
    pub priority: i32,
    pub start: Vec3,
    pub goal: Vec3,
    pub flags: MovementFlags,
}

pub struct PathResult {
    pub request_id: u64,
    pub waypoints: Result<Vec<Vec3>, AiError>,
}

/// Priority-ordered request queue; overflow drops the lowest-priority
/// pending request and reports it as dropped to the caller.
pub struct PathfinderQueue {
    pending: Vec<PathRequest>,
    capacity: usize,
}

impl PathfinderQueue {
    pub fn new(capacity: usize) -> Self {
        Self { pending: Vec::new(), capacity }
    }

    /// Returns the request_id of a dropped lower-priority request, if any.
    pub fn enqueue(&mut self, request: PathRequest) -> Option<u64> {
        self.pending.push(request);
        self.pending.sort_by(|a, b| b.priority.cmp(&a.priority));
        if self.pending.len() > self.capacity {
            self.pending.pop().map(|r| r.request_id)
        } else {
            None
        }
    }

    pub fn cancel(&mut self, request_id: u64) -> bool {
        let before = self.pending.len();
        self.pending.retain(|r| r.request_id != request_id);
        self.pending.len() != before
    }

    /// Pops and resolves up to `budget` pending requests against `map`.
    pub fn drain_resolve(&mut self, map: &TerrainMap, budget: usize) -> Vec<PathResult> {
        let take = budget.min(self.pending.len());
        self.pending
            .drain(..take)
            .map(|req| PathResult {
                request_id: req.request_id,
                waypoints: find_path(map, req.start, req.goal, req.flags),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
