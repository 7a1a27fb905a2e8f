use crate::components::transform::Vec3;
use crate::entity::EntityId;
use crate::storage::Component;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    Idle,
    Patrol,
    Alert,
    Combat,
    Fleeing,
    Returning,
    Dead,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PerceptionSnapshot {
    pub enemies: Vec<EntityId>,
    pub allies: Vec<EntityId>,
    pub neutrals: Vec<EntityId>,
    pub highest_threat_target: Option<EntityId>,
    pub highest_threat_value: f32,
    pub distance_to_spawn: f32,
    pub distance_to_leader: f32,
    pub hp_pct: f32,
    pub mp_pct: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AiMemory {
    pub last_known_positions: HashMap<EntityId, Vec3>,
    pub patrol_index: usize,
    pub patrol_forward: bool,
    pub flags: HashMap<String, f32>,
}

/// Opaque reference to a behavior tree owned by the AI crate's tree
/// registry; kept here rather than the tree itself so `mmo-ecs` does not
/// depend on `mmo-ai`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorTreeId(pub u32);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ai {
    pub personality: String,
    pub state: AiState,
    pub perception: PerceptionSnapshot,
    pub memory: AiMemory,
    pub tree: BehaviorTreeId,
    pub spawn_position: Vec3,
    pub aggro_range: f32,
    pub leash_range: f32,
    pub last_perception_tick: u64,
    pub last_decision_tick: u64,
}

impl Ai {
    pub fn new(tree: BehaviorTreeId, spawn_position: Vec3, aggro_range: f32, leash_range: f32) -> Self {
        Self {
            personality: String::new(),
            state: AiState::Idle,
            perception: PerceptionSnapshot::default(),
            memory: AiMemory::default(),
            tree,
            spawn_position,
            aggro_range,
            leash_range,
            last_perception_tick: 0,
            last_decision_tick: 0,
        }
    }
}

impl Component for Ai {
    const NAME: &'static str = "Ai";
}
