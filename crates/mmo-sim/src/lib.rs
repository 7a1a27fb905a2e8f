//! Composition root: wires `mmo-ecs`, `mmo-spatial`, `mmo-combat`,
//! `mmo-ai`, `mmo-match`, `mmo-interest` and `mmo-net` into one
//! `SimServer` a host process can drive tick by tick.

pub mod composition;
pub mod metrics;
pub mod server;

pub mod prelude {
    pub use crate::composition::{SimContext, THREAT_IDLE_DECAY_TICKS};
    pub use crate::metrics::SimMetricsSnapshot;
    pub use crate::server::SimServer;
}
