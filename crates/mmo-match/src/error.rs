use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("match {0} is full")]
    MatchFull(u64),
    #[error("player is not eligible to join: {reason}")]
    NotEligible { reason: &'static str },
    #[error("no match found for id {0}")]
    UnknownMatch(u64),
    #[error("action rejected: entity is not a member of this match")]
    CrossInstanceRejected,
}
