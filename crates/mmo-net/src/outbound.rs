//! Outbound event types fed to the transport thread, tagged with the
//! reliability class the transport should send them under.

use mmo_combat::prelude::CombatEvent;
use mmo_ecs::prelude::{EntityId, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reliability {
    /// Unordered, unreliable: fine to drop or arrive out of order.
    Unreliable,
    /// Ordered, reliable: must arrive, in the order sent.
    Reliable,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum OutboundEvent {
    EntitySpawn { entity: EntityId, position: Vec3 },
    EntityDespawn { entity: EntityId },
    PositionDelta { entity: EntityId, position: Vec3 },
    HealthDelta { entity: EntityId, current_hp: i32, max_hp: i32 },
    ResourceDelta { entity: EntityId, current_mp: i32, max_mp: i32 },
    Combat(CombatEvent),
    MatchStateChanged { match_id: u64, phase: String },
    RatingChanged { entity: EntityId, new_rating: f32, delta: f32 },
    PathResult { request_id: u64, found: bool },
}

impl OutboundEvent {
    /// Position deltas are the one unreliable/unordered class; everything
    /// else (state transitions, combat, rating, match events) is reliable.
    pub fn reliability(&self) -> Reliability {
        match self {
            OutboundEvent::PositionDelta { .. } => Reliability::Unreliable,
            _ => Reliability::Reliable,
        }
    }
}
