//! Per-observer visibility tracking over the spatial index and the
//! outbound delta feed derived from it.

pub mod feeder;
pub mod interest_set;

pub mod prelude {
    pub use crate::feeder::{build_updates, ObserverUpdate};
    pub use crate::interest_set::{InterestDelta, InterestManager};
}
