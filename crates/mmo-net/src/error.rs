use mmo_ai::prelude::AiError;
use mmo_combat::prelude::CombatError;
use mmo_ecs::prelude::EcsError;
use mmo_match::prelude::MatchError;
use thiserror::Error;

/// Union of every domain error an inbound command can surface to the
/// transport layer; each variant mirrors one domain crate's own taxonomy.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Ecs(#[from] EcsError),
    #[error(transparent)]
    Combat(#[from] CombatError),
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("malformed command: {reason}")]
    Malformed { reason: &'static str },
}
