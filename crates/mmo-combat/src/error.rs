use mmo_ecs::prelude::EntityId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CombatError {
    #[error("no valid target: {reason}")]
    InvalidTarget { reason: &'static str },
    #[error("insufficient resource: need {cost}, have {available}")]
    InsufficientResource { cost: i32, available: i32 },
    #[error("skill on cooldown until tick {ready_tick}")]
    OnCooldown { ready_tick: u64 },
    #[error("global cooldown active until tick {ready_tick}")]
    OnGlobalCooldown { ready_tick: u64 },
    #[error("crowd control forbids this action")]
    CcForbids,
    #[error("a cast is already in progress")]
    CastInProgress,
    #[error("internal invariant broken for entity {entity}: {details}")]
    InternalInvariantBroken { entity: EntityId, details: String },
}
