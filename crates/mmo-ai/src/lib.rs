//! NPC decision-making: behavior trees, perception, pathfinding, and the
//! aggro/leash state machine that sits above them.

pub mod behavior_tree;
pub mod error;
pub mod leash;
pub mod path_follower;
pub mod pathfinding;
pub mod perception;

pub mod prelude {
    pub use crate::behavior_tree::{tick_node, ActionKind, AiCommand, DecisionContext, Node, NodeStatus, Predicate, TreeRegistry};
    pub use crate::error::AiError;
    pub use crate::leash::update_leash_state;
    pub use crate::path_follower::{advance_follower, FollowOutcome, PathFollower};
    pub use crate::pathfinding::{find_path, PathRequest, PathResult, PathfinderQueue};
    pub use crate::perception::{build_perception, should_refresh_perception, should_run_decision, DECISION_TICKS, PERCEPTION_REFRESH_TICKS};
}
