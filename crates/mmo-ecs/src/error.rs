use crate::entity::EntityId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EcsError {
    #[error("entity {entity} has no component {component}")]
    MissingComponent { entity: EntityId, component: &'static str },

    #[error("entity {entity} already has component {component}")]
    DuplicateComponent { entity: EntityId, component: &'static str },

    #[error("entity {entity} is not alive")]
    StaleEntity { entity: EntityId },

    #[error("system ordering cycle detected starting at `{system}`")]
    SystemOrderCycle { system: String },

    #[error("system `{system}` declared `after: {after}` but no such system is registered")]
    UnknownSystemDependency { system: String, after: String },

    #[error("internal invariant broken in system `{system}` for entity {entity}: {details}")]
    InternalInvariantBroken {
        system: String,
        entity: EntityId,
        details: String,
    },
}
