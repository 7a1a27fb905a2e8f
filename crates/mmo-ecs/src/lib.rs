//! Entity-component store and fixed-step tick scheduler for the simulation
//! core: dense per-type component storage keyed by entity slot, a deferred
//! command buffer for structural mutation, and a four-stage tick loop.

pub mod command;
pub mod components;
pub mod entity;
pub mod error;
pub mod storage;
pub mod tick;
pub mod world;

pub mod prelude {
    pub use crate::command::CommandBuffer;
    pub use crate::components::*;
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::error::EcsError;
    pub use crate::storage::{Component, ComponentStore};
    pub use crate::tick::{TickConfig, TickDiagnostics, TickLoop, TickStage};
    pub use crate::world::{StoreAccess, World};
}
