//! Poll-only metrics snapshot. `mmo-sim` never opens a scrape endpoint
//! itself; a host process reads this and forwards it wherever it likes.

use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct SimMetricsSnapshot {
    pub tick_count: u64,
    pub last_tick_duration: Duration,
    pub entity_count: usize,
    pub combat_event_count: u64,
    pub match_count: usize,
}
