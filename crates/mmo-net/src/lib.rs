//! Wire-level types for the simulation boundary: inbound commands,
//! outbound events with reliability classes, the unified command error,
//! and process configuration loading.

pub mod config;
pub mod error;
pub mod inbound;
pub mod outbound;

pub mod prelude {
    pub use crate::config::{load_config, ConfigError, SimConfig};
    pub use crate::error::CommandError;
    pub use crate::inbound::{InboundCommand, InboundEnvelope};
    pub use crate::outbound::{OutboundEvent, Reliability};
}
