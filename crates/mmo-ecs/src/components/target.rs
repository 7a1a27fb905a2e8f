use crate::entity::EntityId;
use crate::storage::Component;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    Hostile,
    Friendly,
    Neutral,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Target {
    pub current_target: Option<EntityId>,
    pub target_type: Option<TargetType>,
    pub auto_attack: bool,
    pub next_auto_attack_tick: u64,
    /// Most recent targets first; bounded so it never grows unbounded.
    pub target_history: Vec<EntityId>,
}

impl Target {
    const HISTORY_CAP: usize = 8;

    pub fn new() -> Self {
        Self {
            current_target: None,
            target_type: None,
            auto_attack: false,
            next_auto_attack_tick: 0,
            target_history: Vec::new(),
        }
    }

    pub fn set_target(&mut self, target: EntityId, kind: TargetType) {
        self.current_target = Some(target);
        self.target_type = Some(kind);
        self.target_history.retain(|t| *t != target);
        self.target_history.insert(0, target);
        self.target_history.truncate(Self::HISTORY_CAP);
    }

    pub fn clear_target(&mut self) {
        self.current_target = None;
        self.target_type = None;
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Target {
    const NAME: &'static str = "Target";
}
