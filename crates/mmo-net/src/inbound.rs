//! Inbound command types: one per client-originated action, deserialized
//! off the transport thread and pushed onto the tick thread's MPSC queue.

use mmo_ecs::prelude::{CastAim, EntityId, SkillId, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum InboundCommand {
    Authenticate { session_token: String },
    Move { direction: Vec3, running: bool },
    SetTarget { target: EntityId },
    ClearTarget,
    AutoAttack { enabled: bool },
    UseSkill { skill_id: SkillId, aim: CastAim },
    CancelCast,
    Dodge { direction: Vec3 },
    QueueForMatch { match_type: u32 },
    LeaveQueue,
    JoinWarInstance { war_id: u64 },
}

/// Envelope pairing a command with the connection/session it came from;
/// the transport thread stamps this before pushing onto the inbound queue.
#[derive(Clone, Debug)]
pub struct InboundEnvelope {
    pub session_id: u64,
    pub entity: Option<EntityId>,
    pub command: InboundCommand,
    pub received_tick: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_an_authenticated_entity_carries_none() {
        let envelope = InboundEnvelope { session_id: 1, entity: None, command: InboundCommand::ClearTarget, received_tick: 0 };
        assert!(envelope.entity.is_none());
    }
}
