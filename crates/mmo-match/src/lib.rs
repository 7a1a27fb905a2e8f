//! Matchmaking queue, match lifecycle, instance isolation, objective
//! scoring, ELO rating, and the guild-war specialization built on top.

pub mod error;
pub mod lifecycle;
pub mod objectives;
pub mod queue;
pub mod rating;
pub mod war;

pub mod prelude {
    pub use crate::error::MatchError;
    pub use crate::lifecycle::{same_instance, MatchInstance, MatchPhase, TeamState, VictoryCondition, OBSERVATION_WINDOW_TICKS, STARTING_COUNTDOWN_TICKS};
    pub use crate::objectives::{tick_objective, Objective};
    pub use crate::queue::{rating_spread, FormedMatch, MatchTypeConfig, MatchTypeId, MatchmakingQueue, QueueEntry, QUEUE_TIMEOUT_TICKS, SCAN_INTERVAL_TICKS};
    pub use crate::rating::{compute_delta, distribute_delta, expected_score, k_factor, team_rating, RatingDelta, PLACEMENT_K, PLACEMENT_MATCH_COUNT, STANDARD_K};
    pub use crate::war::{build_war_instance, WarDeclaration, WarPhase, ACTIVE_MAX_TICKS, DECLARATION_TIMEOUT_TICKS, PREP_TICKS, WAR_ROSTER_CAP, WAR_SCORE_LIMIT};
}
