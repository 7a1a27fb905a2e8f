use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no path exists between the requested points")]
    NoPathFound,
    #[error("pathfinder request queue is full, request dropped")]
    QueueFull,
    #[error("unknown behavior tree id {0:?}")]
    UnknownTree(mmo_ecs::prelude::BehaviorTreeId),
}
